use dto_value::BoxError;
use thiserror::Error;

// -----------------------------------------------------------------------------
// Error

/// Failures surfaced by the [`ListenerRegistry`](crate::ListenerRegistry).
///
/// A class without a listener, or a listener that does not intercept a
/// hook, is not an error: the value is passed through.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ListenError {
    #[error("class `{class}` is mapped to listener `{listener}`, which has not been registered")]
    UnknownListener { class: String, listener: String },

    #[error("failed to construct listener `{listener}`: {source}")]
    Construct { listener: String, source: BoxError },

    /// The hook itself failed.
    #[error(transparent)]
    Hook(BoxError),
}
