//! The instruction and output schema sent to the model. Both are plain values
//! handed to the invoker at call time.

use parsers::DataUri;
use serde_json::{Value, json};

/// Placeholder in a template where the image is inserted.
pub const MEDIA_MARKER: &str = "{{media}}";

const CLASSIFY_IMAGE_TEMPLATE: &str = r#"You are an expert security analyst specializing in detecting steganography and visual malware artifacts in images.
Analyze the provided image and determine its classification.

Image to analyze: {{media}}

Based on your analysis of the image's visual patterns, textures, and any unusual data distributions (simulated):
1.  Provide a 'classification': "Benign" if it appears normal, "Potential Steganography" if you detect subtle anomalies indicative of hidden data, or "Suspected Malware Artifacts" if visual patterns resemble those seen in malware-as-image datasets.
2.  Provide a brief 'explanation' detailing the key visual characteristics that led to your classification.
3.  Estimate a plausible Shannon 'entropy' score for the image. Benign images usually have lower to moderate entropy (e.g., 4.0-7.5). Images with highly random data due to encryption or compression, or hidden data, might exhibit higher entropy (e.g., >7.5). Provide a value between 0.0 and 8.0.

Return ONLY the JSON object with the fields: classification, explanation, and entropy.
"#;

#[derive(Debug, Clone, PartialEq)]
pub struct PromptDefinition {
    pub name: String,
    pub template: String,
    /// Response schema in the subset of OpenAPI understood by the model endpoint.
    pub output_schema: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptPart {
    Text(String),
    Media { mime_type: String, data: String },
}

impl PromptDefinition {
    pub fn classify_image() -> Self {
        Self {
            name: "classifyImagePrompt".to_string(),
            template: CLASSIFY_IMAGE_TEMPLATE.to_string(),
            output_schema: json!({
                "type": "OBJECT",
                "properties": {
                    "classification": {
                        "type": "STRING",
                        "description": "The classification of the image (e.g., \"Benign\", \"Potential Steganography\", \"Suspected Malware Artifacts\")."
                    },
                    "explanation": {
                        "type": "STRING",
                        "description": "A brief explanation for the classification decision."
                    },
                    "entropy": {
                        "type": "NUMBER",
                        "description": "A simulated Shannon entropy score for the image data (typically between 0 and 8)."
                    }
                },
                "required": ["classification", "explanation", "entropy"]
            }),
        }
    }

    /// Splits the template around [`MEDIA_MARKER`]. A template without the
    /// marker gets the image appended after its text.
    pub fn render(&self, image: &DataUri) -> Vec<PromptPart> {
        let media = || PromptPart::Media {
            mime_type: image.mime_type().to_string(),
            data: image.payload().to_string(),
        };

        let mut parts = Vec::new();
        let mut segments = self.template.split(MEDIA_MARKER).peekable();
        let has_marker = self.template.contains(MEDIA_MARKER);

        while let Some(segment) = segments.next() {
            if !segment.trim().is_empty() {
                parts.push(PromptPart::Text(segment.to_string()));
            }
            if segments.peek().is_some() {
                parts.push(media());
            }
        }

        if !has_marker {
            parts.push(media());
        }
        parts
    }
}
