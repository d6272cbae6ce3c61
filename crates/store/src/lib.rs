// SPDX-License-Identifier: MIT
//! statewire-store: the embedded SQL store (§4.1, C1). One file, opened
//! with a small connection pool; `get_next_job` claims with a single atomic
//! `UPDATE ... RETURNING` statement so two machines racing for the same
//! pending job can never both win it.

pub mod error;
pub mod rows;
pub mod schema;
#[allow(clippy::module_inception)]
pub mod store;

pub use error::StoreError;
pub use store::Store;
