pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod llm;
pub mod search;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{CapabilityError, ConfigError, RequestError, WorkflowError};
pub use generator::outlet::{EventSink, GenerationReport, WorkflowEvent};
pub use generator::request::GenerationRequest;
pub use generator::workflow::{Termination, generate, launch, run_request};
