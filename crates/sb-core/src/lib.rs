pub mod config;
pub mod id;
pub mod model;
pub mod viewport;

pub use config::{EditorConfig, Rgba8};
pub use id::NodeId;
pub use model::{CanvasNode, NodeKind, NodeRegistry};
pub use viewport::Viewport;

// Re-export kurbo geometry so downstream crates share one set of types
pub use kurbo::{Point, Rect, Size, Vec2};
