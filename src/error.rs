use thiserror::Error;

/// Errors surfaced by the detection pipeline.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Model inference failed on window {window}: {message}")]
    ModelInference { window: usize, message: String },

    #[error("Unable to read wav audio: {0}")]
    Wav(#[from] hound::Error),

    #[error("Unable to resample audio: {0}")]
    Resample(String),
}
