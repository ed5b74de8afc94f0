//! Tool selection.
//!
//! The globally active tool decides how a pointer-down is interpreted:
//!
//! | Tool        | Over empty canvas         | Over an image-editor node   |
//! |-------------|---------------------------|-----------------------------|
//! | `Select`    | box-select                | select / drag               |
//! | `Pan`       | pan (box-select with mod) | select / drag               |
//! | `Pen`       | pan                       | freehand stroke             |
//! | `Eraser`    | pan                       | freehand erase              |
//! | `MoveImage` | pan                       | move background image       |
//! | `Transform` | pan                       | rescale background image    |
//! | `Crop`      | pan                       | crop box                    |
//! | `Text`      | pan                       | stamp text                  |

use crate::raster::RasterTool;

/// The active tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Pan,
    Pen,
    Eraser,
    MoveImage,
    Transform,
    Crop,
    Text,
}

impl ToolKind {
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Select => "select",
            ToolKind::Pan => "pan",
            ToolKind::Pen => "pen",
            ToolKind::Eraser => "eraser",
            ToolKind::MoveImage => "move",
            ToolKind::Transform => "transform",
            ToolKind::Crop => "crop",
            ToolKind::Text => "text",
        }
    }

    /// The raster-editor mode this tool drives, if any.
    pub fn raster(self) -> Option<RasterTool> {
        match self {
            ToolKind::Pen => Some(RasterTool::Pen),
            ToolKind::Eraser => Some(RasterTool::Eraser),
            ToolKind::MoveImage => Some(RasterTool::Move),
            ToolKind::Transform => Some(RasterTool::Transform),
            ToolKind::Crop => Some(RasterTool::Crop),
            ToolKind::Text => Some(RasterTool::Text),
            ToolKind::Select | ToolKind::Pan => None,
        }
    }
}
