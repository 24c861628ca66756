//! Error types shared by the bridge, the protocol handler and the loader

use serde::{Serialize, Serializer};

/// Errors surfaced by the viewer
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// The glTF asset (or one of its dependencies) failed to load
    #[error("failed to load `{resource}`: {cause}")]
    LoadFailure { resource: String, cause: String },

    /// The frontend asked for a viewport with a zero dimension
    #[error("invalid viewport size {width}x{height}")]
    InvalidViewport { width: u32, height: u32 },

    /// A shared state mutex was poisoned by a panicking thread
    #[error("shared state `{0}` is poisoned")]
    StatePoisoned(&'static str),

    /// No frame has been published yet
    #[error("no frame yet (scene still loading)")]
    FrameNotReady,

    /// The frame's pixel buffer does not match its dimensions
    #[error("corrupt frame: {width}x{height} needs {expected} bytes, got {actual}")]
    CorruptFrame {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// Frame encoding failed
    #[error("failed to encode frame: {0}")]
    Encode(#[from] image::ImageError),

    /// JSON encoding of a protocol payload failed
    #[error("failed to serialize payload: {0}")]
    Json(#[from] serde_json::Error),
}

// Tauri commands need serializable errors; the frontend only sees the message.
impl Serialize for ViewerError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

pub type ViewerResult<T> = Result<T, ViewerError>;
