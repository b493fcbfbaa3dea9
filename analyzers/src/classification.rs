use std::fmt;

use serde::{Deserialize, Serialize};

/// The three verdicts an image can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    Benign,
    #[serde(rename = "Potential Steganography")]
    PotentialSteganography,
    #[serde(rename = "Suspected Malware Artifacts")]
    SuspectedMalwareArtifacts,
}

impl Classification {
    pub const ALL: [Classification; 3] = [
        Classification::Benign,
        Classification::PotentialSteganography,
        Classification::SuspectedMalwareArtifacts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Benign => "Benign",
            Classification::PotentialSteganography => "Potential Steganography",
            Classification::SuspectedMalwareArtifacts => "Suspected Malware Artifacts",
        }
    }

    /// Exact, case-sensitive match against the wire labels.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == label)
    }

    pub fn is_benign(&self) -> bool {
        matches!(self, Classification::Benign)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationRequest {
    /// `data:<mime>;base64,<body>`
    pub image_data: String,
}

impl ClassificationRequest {
    pub fn new(image_data: impl Into<String>) -> Self {
        Self {
            image_data: image_data.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub classification: Classification,
    pub explanation: String,
    pub entropy: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn labels_match_wire_format() {
        let value = serde_json::to_value(Classification::SuspectedMalwareArtifacts).unwrap();
        assert_eq!(value, json!("Suspected Malware Artifacts"));
        for c in Classification::ALL {
            assert_eq!(Classification::from_label(c.as_str()), Some(c));
        }
    }

    #[test]
    fn from_label_is_exact() {
        assert_eq!(Classification::from_label("benign"), None);
        assert_eq!(Classification::from_label(" Benign"), None);
        assert_eq!(Classification::from_label("Potential steganography"), None);
    }

    #[test]
    fn request_uses_camel_case_field() {
        let request: ClassificationRequest =
            serde_json::from_value(json!({ "imageData": "data:image/png;base64,AAAA" })).unwrap();
        assert_eq!(request.image_data, "data:image/png;base64,AAAA");
    }
}
