//! Controller-side graph state: the reducer, reconciliation rules, and the
//! fit-view trigger.

mod reconcile;
mod refresh;
mod state;

pub use refresh::FitTrigger;
pub use state::{GraphState, SearchEvent};
