use dto_value::BoxError;
use thiserror::Error;

// -----------------------------------------------------------------------------
// Error

/// Failures surfaced by the [`ConverterRegistry`](crate::ConverterRegistry).
///
/// A class without any registered converter is not an error; lookups
/// report it as `None`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConvertError {
    #[error("class `{class}` is mapped to converter `{converter}`, which has not been registered")]
    UnknownConverter { class: String, converter: String },

    #[error("failed to construct converter `{converter}`: {source}")]
    Construct { converter: String, source: BoxError },

    /// The converter itself failed while converting a value.
    #[error(transparent)]
    Converter(BoxError),

    #[error("value nesting exceeds the maximum depth of {0}")]
    DepthExceeded(usize),
}
