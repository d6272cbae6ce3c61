// SPDX-License-Identifier: MIT
//! Engine-fatal errors: failures that stop this machine's process. Ordinary
//! action failures never reach here — they are folded into the `error`
//! pseudo-event and handled inside the tick loop (§4.4 Failure semantics).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("store error: {0}")]
    Store(#[from] statewire_store::StoreError),
    #[error("bus error: {0}")]
    Bus(#[from] statewire_bus::BusError),
    #[error("initial state {0:?} is not one of the machine's declared states")]
    UnknownInitialState(String),
}
