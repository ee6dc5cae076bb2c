use thiserror::Error;

/// Errors surfaced by the collection pipeline.
///
/// Parse and snapshot failures are recoverable: the offending event or sample
/// is dropped and the error is routed to the owning adapter's error callback.
/// `MissingHandler` is a fail-fast configuration error raised at enable time.
/// `UnknownCode` is raised when a provider emits a reason/mode code outside
/// the documented enumeration, so new codes are noticed instead of mislabeled.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TelemetryError {
    #[error("event {event}: missing payload field {index}")]
    PayloadMissing { event: String, index: usize },

    #[error("event {event}: payload field {index} is not {expected}")]
    PayloadType {
        event: String,
        index: usize,
        expected: &'static str,
    },

    #[error("unknown {what} code: {code}")]
    UnknownCode { what: &'static str, code: u32 },

    #[error("custom exporter profile requires a handler")]
    MissingHandler,

    #[error("exporter failure: {0}")]
    Export(String),

    #[error("counter snapshot failed: {0}")]
    Snapshot(String),
}

pub type Result<T> = std::result::Result<T, TelemetryError>;
