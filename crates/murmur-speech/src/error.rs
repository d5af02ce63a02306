//! User-facing speech errors.
//!
//! The `Display` text of each variant is the message shown to the user.

use thiserror::Error;

use murmur_core::error::MurmurError;

use crate::engine::{EngineFailure, ErrorCode};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpeechError {
    #[error("Speech recognition is not supported in this browser")]
    Unsupported,

    #[error("Speech recognition requires HTTPS. Please use a secure connection.")]
    InsecureContext,

    #[error("Network error: Please use HTTPS or run Chrome with web security disabled for local development.")]
    NetworkLocalDevelopment,

    #[error("Network error in speech recognition (attempt {attempt}/{max})")]
    NetworkRetryFailed { attempt: u32, max: u32 },

    #[error("Network error: Please check your internet connection and try again")]
    NetworkExhausted,

    #[error("No microphone was found or microphone is not working")]
    AudioCapture,

    #[error("Microphone permission was denied")]
    PermissionDenied,

    #[error("Speech recognition error: {0}")]
    Engine(ErrorCode),

    #[error("{}", start_failure_message(.0))]
    StartFailed(EngineFailure),
}

fn start_failure_message(failure: &EngineFailure) -> &'static str {
    match failure {
        EngineFailure::NotAllowed => {
            "Microphone access was denied. Please allow microphone access in your browser settings"
        }
        EngineFailure::NotFound => "No microphone found. Please check your microphone connection",
        EngineFailure::NotReadable => {
            "Cannot access your microphone. Please check if another app is using it"
        }
        EngineFailure::Other(_) => "Failed to start speech recognition",
    }
}

impl From<SpeechError> for MurmurError {
    fn from(err: SpeechError) -> Self {
        MurmurError::Speech(err.to_string())
    }
}
