//! Repairs model output so every result satisfies the result invariants:
//! a known label and a two-decimal entropy figure.

use std::ops::RangeInclusive;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use serde_json::Value;

use crate::classification::{Classification, ClassificationResult};

pub const FALLBACK_ENTROPY_RANGE: RangeInclusive<f64> = 6.5..=7.9;

pub const INVALID_CLASSIFICATION_EXPLANATION: &str =
    "AI failed to provide a valid classification type. Defaulting to Benign.";

/// Model output before validation. Every field is optional and untyped.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawClassification {
    #[serde(default)]
    pub classification: Option<Value>,
    #[serde(default)]
    pub explanation: Option<Value>,
    #[serde(default)]
    pub entropy: Option<Value>,
}

/// Pulls the JSON object out of a model completion. Tolerates Markdown code
/// fences and prose around the object; anything that is not an object is
/// treated as no output.
pub fn extract_json(text: &str) -> Option<RawClassification> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end < start {
        return None;
    }

    match serde_json::from_str::<Value>(&trimmed[start..=end]).ok()? {
        value @ Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    }
}

/// Rounds the exact binary value to two decimals, halves away from zero.
/// `6.545` is stored just below the half and so becomes `6.54`.
pub fn round_to_hundredths(value: f64) -> f64 {
    // Only odd multiples of 1/8 sit exactly on a hundredths half; the
    // formatter would send those to even.
    let eighths = value * 8.0;
    let text = if eighths.fract() == 0.0 && eighths % 2.0 != 0.0 {
        let whole = value.abs().trunc();
        let cents = ((value.abs() - whole) * 100.0).ceil();
        let sign = if value < 0.0 { "-" } else { "" };
        format!("{sign}{whole:.0}.{cents:02.0}")
    } else {
        format!("{value:.2}")
    };
    text.parse().unwrap_or(value)
}

pub fn fallback_entropy<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    round_to_hundredths(rng.gen_range(FALLBACK_ENTROPY_RANGE))
}

pub fn sanitize<R: Rng + ?Sized>(raw: RawClassification, rng: &mut R) -> ClassificationResult {
    let entropy = match raw.entropy.as_ref().and_then(Value::as_f64) {
        Some(value) if !value.is_nan() => round_to_hundredths(value),
        _ => {
            let substitute = fallback_entropy(rng);
            tracing::warn!(
                returned = ?raw.entropy,
                substitute,
                "model returned no usable entropy, substituting"
            );
            substitute
        }
    };

    let explanation = match raw.explanation {
        Some(Value::String(text)) => text,
        _ => String::new(),
    };

    let label = raw.classification.as_ref().and_then(Value::as_str);
    match label.and_then(Classification::from_label) {
        Some(classification) => ClassificationResult {
            classification,
            explanation,
            entropy,
        },
        None => {
            tracing::warn!(returned = ?raw.classification, "invalid classification label, defaulting to Benign");
            ClassificationResult {
                classification: Classification::Benign,
                explanation: INVALID_CLASSIFICATION_EXPLANATION.to_string(),
                entropy,
            }
        }
    }
}

/// Randomness used for substitute entropy values. Seedable so tests can pin
/// the sequence.
#[derive(Debug)]
pub struct FallbackEntropy {
    rng: Mutex<StdRng>,
}

impl FallbackEntropy {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut *rng)
    }

    pub fn sanitize(&self, raw: RawClassification) -> ClassificationResult {
        self.with_rng(|rng| sanitize(raw, rng))
    }
}

impl Default for FallbackEntropy {
    fn default() -> Self {
        Self::from_entropy()
    }
}
