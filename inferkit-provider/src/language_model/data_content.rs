use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use url::Url;

/// Binary data referenced from a prompt or response part.
///
/// Data can be carried as a URL the provider fetches itself, as a base64
/// string, or as raw bytes. Adapters convert between the forms their wire
/// protocol accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataContent {
    /// A URL pointing at the data.
    Url(Url),
    /// Base64-encoded data.
    Base64(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
}

impl DataContent {
    /// The URL, when this is the URL form.
    pub fn as_url(&self) -> Option<&Url> {
        match self {
            Self::Url(url) => Some(url),
            _ => None,
        }
    }

    /// Base64 encoding of inline data. `None` for the URL form, which has
    /// no bytes to encode.
    pub fn to_base64(&self) -> Option<String> {
        match self {
            Self::Url(_) => None,
            Self::Base64(data) => Some(data.clone()),
            Self::Bytes(bytes) => Some(STANDARD.encode(bytes)),
        }
    }

    /// Render as a URL string: the URL itself, or a data URL for inline data.
    pub fn to_url_string(&self, media_type: &str) -> String {
        match self {
            Self::Url(url) => url.to_string(),
            Self::Base64(data) => format!("data:{media_type};base64,{data}"),
            Self::Bytes(bytes) => {
                format!("data:{media_type};base64,{}", STANDARD.encode(bytes))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_to_data_url() {
        let data = DataContent::Bytes(vec![1, 2, 3]);
        assert_eq!(data.to_url_string("image/png"), "data:image/png;base64,AQID");
    }

    #[test]
    fn url_passes_through() {
        let data = DataContent::Url("https://example.com/cat.png".parse().unwrap());
        assert_eq!(data.to_url_string("image/png"), "https://example.com/cat.png");
        assert!(data.to_base64().is_none());
    }
}
