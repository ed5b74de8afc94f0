//! Editor error type.
//!
//! Nothing here escapes the public event-handling surface: the engine logs
//! these and keeps going. They exist so internal steps can use `?`.

use sb_core::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("unknown node kind `{0}`")]
    UnknownNodeKind(String),

    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("node {0} is not an image editor")]
    NotAnImageEditor(NodeId),

    #[error("no background image to crop")]
    NoBackgroundImage,

    #[error("no active crop box")]
    NoActiveCrop,

    #[error("crop box is too small")]
    CropTooSmall,

    #[error("crop maps to an empty source region")]
    DegenerateCrop,

    #[error("bitmap snapshot failed: {0}")]
    Snapshot(#[source] image::ImageError),

    #[error("image decode failed: {0}")]
    Decode(#[source] image::ImageError),
}

pub type Result<T, E = EditorError> = std::result::Result<T, E>;
