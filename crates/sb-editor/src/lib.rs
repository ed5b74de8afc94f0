pub mod announce;
pub mod coalesce;
pub mod commands;
pub mod engine;
pub mod error;
pub mod gesture;
pub mod input;
pub mod raster;
pub mod scene;
pub mod shortcuts;
pub mod tools;

pub use announce::{LogAnnouncer, SelectionAnnouncer};
pub use commands::{History, HistoryAction, ReplayTarget};
pub use engine::Engine;
pub use error::{EditorError, Result};
pub use gesture::{Gesture, GestureController};
pub use input::{InputEvent, Modifiers};
pub use raster::{Placement, RasterEditor, RasterTool};
pub use scene::{NodeContent, Scene, Selection};
pub use shortcuts::{Direction, ShortcutAction, ShortcutMap};
pub use tools::ToolKind;
