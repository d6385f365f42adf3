//! Porteria core: pure session state machine and view-model helpers.
mod domain;
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use domain::{LookupResult, ScanOutcome, StudentRecord};
pub use effect::Effect;
pub use msg::Msg;
pub use state::{RequestId, SessionState};
pub use update::update;
pub use view_model::{PhotoView, SessionView};
