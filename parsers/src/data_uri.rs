//! `data:<mime>;base64,<body>` payloads, the inline transport used for images
//! between the client and the classification service.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use thiserror::Error;

const SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataUriError {
    #[error("data URI must start with 'data:'")]
    MissingScheme,

    #[error("data URI has no ',' separating header and payload")]
    MissingSeparator,

    #[error("data URI must declare a MIME type of the form 'type/subtype'")]
    MissingMimeType,

    #[error("data URI payload must be base64 encoded")]
    NotBase64Encoded,

    #[error("data URI payload is empty")]
    EmptyPayload,

    #[error("data URI payload is not valid base64 at byte {0}")]
    InvalidBase64(usize),
}

/// A parsed data URI. The payload stays base64 encoded so it can be forwarded
/// to a model endpoint without a decode/encode round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    mime_type: String,
    payload: String,
}

impl DataUri {
    pub fn parse(input: &str) -> Result<Self, DataUriError> {
        let input = input.trim();
        let rest = match input.get(..SCHEME.len()) {
            Some(prefix) if prefix.eq_ignore_ascii_case(SCHEME) => &input[SCHEME.len()..],
            _ => return Err(DataUriError::MissingScheme),
        };

        let (header, payload) = rest.split_once(',').ok_or(DataUriError::MissingSeparator)?;

        let lowered = header.to_ascii_lowercase();
        if !lowered.ends_with(BASE64_MARKER) {
            return Err(DataUriError::NotBase64Encoded);
        }

        let mime_type = header.split(';').next().unwrap_or_default().trim();
        match mime_type.split_once('/') {
            Some((kind, subtype)) if !kind.is_empty() && !subtype.is_empty() => {}
            _ => return Err(DataUriError::MissingMimeType),
        }

        validate_base64(payload)?;

        Ok(Self {
            mime_type: mime_type.to_ascii_lowercase(),
            payload: payload.to_string(),
        })
    }

    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.to_ascii_lowercase(),
            payload: BASE64.encode(bytes),
        }
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Base64 body, without the header.
    pub fn payload(&self) -> &str {
        &self.payload
    }

}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.payload)
    }
}

// Syntax check only; the payload is forwarded still encoded.
fn validate_base64(payload: &str) -> Result<(), DataUriError> {
    if payload.is_empty() {
        return Err(DataUriError::EmptyPayload);
    }

    let bytes = payload.as_bytes();
    let body_len = bytes.iter().rposition(|b| *b != b'=').map_or(0, |i| i + 1);
    let padding = bytes.len() - body_len;

    if let Some(offset) = bytes[..body_len]
        .iter()
        .position(|b| !(b.is_ascii_alphanumeric() || *b == b'+' || *b == b'/'))
    {
        return Err(DataUriError::InvalidBase64(offset));
    }

    if padding > 2 || bytes.len() % 4 != 0 {
        return Err(DataUriError::InvalidBase64(body_len));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_png_data_uri() {
        let uri = DataUri::parse("data:image/png;base64,iVBORw0KGgo=").unwrap();
        assert_eq!(uri.mime_type(), "image/png");
        assert_eq!(uri.payload(), "iVBORw0KGgo=");
    }

    #[test]
    fn keeps_mime_type_when_parameters_present() {
        let uri = DataUri::parse("data:image/svg+xml;charset=utf-8;base64,PHN2Zz4=").unwrap();
        assert_eq!(uri.mime_type(), "image/svg+xml");
    }

    #[test]
    fn display_reconstructs_the_uri() {
        let raw = "data:image/gif;base64,R0lGODlh";
        assert_eq!(DataUri::parse(raw).unwrap().to_string(), raw);
    }

    #[test]
    fn from_bytes_lowercases_mime_and_encodes_payload() {
        let uri = DataUri::from_bytes("image/PNG", b"\x89PNG\r\n");
        assert_eq!(uri.mime_type(), "image/png");
        assert_eq!(uri.payload(), "iVBORw0K");
        assert_eq!(DataUri::parse(&uri.to_string()), Ok(uri));
    }

    #[test]
    fn rejects_missing_scheme() {
        assert_eq!(
            DataUri::parse("image/png;base64,AAAA"),
            Err(DataUriError::MissingScheme)
        );
    }

    #[test]
    fn rejects_missing_separator() {
        assert_eq!(
            DataUri::parse("data:image/png;base64"),
            Err(DataUriError::MissingSeparator)
        );
    }

    #[test]
    fn rejects_non_base64_encoding() {
        assert_eq!(
            DataUri::parse("data:text/plain,hello"),
            Err(DataUriError::NotBase64Encoded)
        );
    }

    #[test]
    fn rejects_missing_mime_type() {
        assert_eq!(
            DataUri::parse("data:;base64,AAAA"),
            Err(DataUriError::MissingMimeType)
        );
        assert_eq!(
            DataUri::parse("data:image;base64,AAAA"),
            Err(DataUriError::MissingMimeType)
        );
    }

    #[test]
    fn rejects_bad_payloads() {
        assert_eq!(
            DataUri::parse("data:image/png;base64,"),
            Err(DataUriError::EmptyPayload)
        );
        assert_eq!(
            DataUri::parse("data:image/png;base64,AA!A"),
            Err(DataUriError::InvalidBase64(2))
        );
        assert!(matches!(
            DataUri::parse("data:image/png;base64,AAA"),
            Err(DataUriError::InvalidBase64(_))
        ));
        assert!(matches!(
            DataUri::parse("data:image/png;base64,A==="),
            Err(DataUriError::InvalidBase64(_))
        ));
    }

    #[test]
    fn does_not_require_image_mime_type() {
        let uri = DataUri::parse("data:application/pdf;base64,JVBERi0=").unwrap();
        assert_eq!(uri.mime_type(), "application/pdf");
    }
}
