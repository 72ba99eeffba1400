/// Errors raised while turning a response body into observations.
///
/// # Examples
///
/// ```rust
/// use sbcmon_collector::error::ConvertError;
///
/// let err = ConvertError::Field {
///     field: "speed",
///     value: "fast".to_string(),
///     reason: "not a number".to_string(),
/// };
/// assert!(err.to_string().contains("speed"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// The body was not UTF-8 text.
    #[error("response body is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The body did not deserialize into the expected document.
    #[error("failed to deserialize {document} XML: {source}")]
    Xml {
        document: &'static str,
        #[source]
        source: quick_xml::DeError,
    },

    /// A field decoded but its value could not be converted.
    #[error("failed to convert {field} value {value:?}: {reason}")]
    Field {
        field: &'static str,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, ConvertError>;
