/// Classification for retry policy.
///
/// Used by [`with_retry`](crate::backoff::with_retry) to decide whether a
/// failed upstream call is worth another attempt.
///
/// | Class | Retried? |
/// |-------|----------|
/// | `Never` | No, the error is returned immediately |
/// | `WithBackoff` | Yes, after `base * 2^attempt` |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Never retry - bad request, unknown symbol, malformed payload or missing key.
    /// The request is fundamentally invalid and retrying won't help.
    Never,

    /// Transient failure (timeout, 429, 5xx, connection reset).
    /// Retry with exponential backoff until attempts run out.
    WithBackoff,
}

/// Errors that know how they should be retried.
pub trait Classify {
    fn retry_class(&self) -> RetryClass;
}
