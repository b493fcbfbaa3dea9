pub mod backend;
pub mod classification;
pub mod gemini;
pub mod invoker;
pub mod mock;
pub mod prompt;
pub mod sanitize;

pub use backend::{Backend, BackendError, ModelBackend, ModelRequest};
pub use classification::{Classification, ClassificationRequest, ClassificationResult};
pub use gemini::{GeminiBackend, GeminiConfig};
pub use invoker::{ClassificationInvoker, ClassifyError};
pub use mock::MockBackend;
pub use prompt::PromptDefinition;
