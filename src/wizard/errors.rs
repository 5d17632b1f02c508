use thiserror::Error;

use super::models::WizardStep;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Cannot {operation} during step {actual}; expected step {expected}")]
    WrongStep {
        operation: &'static str,
        expected: WizardStep,
        actual: WizardStep,
    },

    #[error("{0}")]
    Validation(String),

    #[error("Select both an event type and a player before registering")]
    SelectionIncomplete,

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The end-of-match batch failed. The store may still hold some or all of its rows.
    #[error("Batch of {events} events was not confirmed by the record store: {source}")]
    FlushUnconfirmed { events: usize, source: StoreError },
}
