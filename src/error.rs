use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during editor state transitions
#[derive(Debug, Error, PartialEq)]
pub enum TransitionError {
    /// Attempted to transition between incompatible states
    #[error("Cannot transition from {from}({state}) to {to}")]
    InvalidStateTransition {
        from: &'static str,
        to: &'static str,
        state: String,
    },
    /// The operation needs an image element and the target is something else
    #[error("Element {0} is not an image")]
    NotAnImage(String),
}

/// Errors surfaced to the calling UI.
///
/// Geometry and model problems are recovered locally (clamp or no-op) and
/// never show up here.
#[derive(Debug, Error)]
pub enum CollageError {
    #[error("Failed to decode image {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Unknown sticker: {0}")]
    UnknownSticker(String),

    #[error("Unknown grid template: {0}")]
    UnknownTemplate(String),

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Failed to encode export: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Export could not be saved (tried {tried:?})")]
    SaveUnavailable {
        tried: Vec<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

pub type Result<T> = std::result::Result<T, CollageError>;
