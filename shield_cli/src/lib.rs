pub mod intake;
pub mod preview;
pub mod report;
pub mod service;
pub mod session;

pub use intake::{IntakePolicy, Notice, SelectedFile};
pub use session::{AnalysisResult, ClientSession, SessionError, SessionState};
