//! Broker keys derived from a queue name.

/// Suffix appended to the queue name to form the processing list key.
pub const PROCESSING_SUFFIX: &str = "-processing";

/// The pair of list keys a queue owns in the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueKeys {
    /// Pending list, tasks waiting to be claimed.
    pub pending: String,
    /// Processing list, the claimed task not yet retired.
    pub processing: String,
}

impl QueueKeys {
    pub fn new(key: impl Into<String>) -> Self {
        let pending = key.into();
        let processing = format!("{}{}", pending, PROCESSING_SUFFIX);
        Self { pending, processing }
    }
}
