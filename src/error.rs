use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Failures surfaced to the user. Preview and normalization problems never
/// show up here; they degrade instead.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("No portfolio file selected")]
    NoFileSelected,

    #[error("A {0} request is already in flight")]
    Busy(&'static str),

    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Response was not valid JSON: {0}")]
    InvalidBody(String),
}
