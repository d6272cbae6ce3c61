// SPDX-License-Identifier: MIT
//! The eight built-in actions (§4.3 action table).

mod bash;
mod check_database_queue;
mod check_events;
mod clear_events;
mod complete_job;
mod log;
mod send_event;
mod start_fsm;

pub use bash::Bash;
pub use check_database_queue::CheckDatabaseQueue;
pub use check_events::CheckEvents;
pub use clear_events::ClearEvents;
pub use complete_job::CompleteJob;
pub use log::Log;
pub use send_event::SendEvent;
pub use start_fsm::StartFsm;
