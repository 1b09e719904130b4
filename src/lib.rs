pub mod config;
pub mod error;
pub mod ipc;
pub mod logging;
pub mod record;
pub mod roster;
pub mod store;

pub use error::{Result, RosterError};
pub use record::{Grade, Record};
pub use roster::{Roster, UpdateField};
pub use store::{LoadOutcome, LoadReport, RosterStore};
