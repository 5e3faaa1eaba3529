use thiserror::Error;

#[derive(Error, Debug)]
/// Batch error
pub enum BatchError {
    #[error("XML parse error: {0}")]
    Parse(String),

    #[error("XML serialization error: {0}")]
    Serialize(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Register error: {0}")]
    Register(String),

    #[error("Step failed: {0}")]
    Step(String),
}
