// SPDX-License-Identifier: MIT

pub mod diagram;
pub mod engine;
pub mod events;
pub mod jobs;
pub mod ui;
