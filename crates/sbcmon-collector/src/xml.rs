use crate::error::{ConvertError, Result};
use serde::de::DeserializeOwned;

/// Deserializes a `<collection>` document. Element namespaces are ignored;
/// fields match on local names.
pub(crate) fn decode<T: DeserializeOwned>(document: &'static str, body: &[u8]) -> Result<T> {
    let text = std::str::from_utf8(body)?;
    quick_xml::de::from_str(text).map_err(|source| ConvertError::Xml { document, source })
}

pub(crate) fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}
