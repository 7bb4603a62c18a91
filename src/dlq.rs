use crate::domain::{DeadLetterQueue, Error};

/// Reports rejected expenses through `tracing`; processing carries on.
#[derive(Default, Debug)]
pub struct TracingDLQ {}

impl DeadLetterQueue for TracingDLQ {
    fn report(&self, error: &Error) {
        tracing::warn!(%error, "expense rejected");
    }
}
