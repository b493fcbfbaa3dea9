//! Offline stand-in for the model endpoint: a random verdict in the same
//! JSON shape the model is asked to produce.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

use crate::backend::{BackendError, ModelBackend, ModelRequest};
use crate::classification::Classification;
use crate::sanitize::fallback_entropy;

/// Share of mock verdicts that come back as `Potential Steganography`.
const SUSPICIOUS_PROBABILITY: f64 = 0.4;

#[derive(Debug)]
pub struct MockBackend {
    rng: Mutex<StdRng>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn sample(&self) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let classification = if rng.gen_bool(SUSPICIOUS_PROBABILITY) {
            Classification::PotentialSteganography
        } else {
            Classification::Benign
        };
        let explanation = if classification.is_benign() {
            "Mock analysis: no anomalies were simulated for this image."
        } else {
            "Mock analysis: simulated anomalies in pixel noise suggest embedded data."
        };

        json!({
            "classification": classification,
            "explanation": explanation,
            "entropy": fallback_entropy(&mut *rng),
        })
        .to_string()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate(&self, request: &ModelRequest) -> Result<Option<String>, BackendError> {
        tracing::debug!(prompt = %request.prompt_name, "generating mock classification");
        Ok(Some(self.sample()))
    }
}
