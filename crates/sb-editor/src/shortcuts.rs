//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. `key` is the
//! host's `KeyboardEvent.key` value; ⌘ and Ctrl are interchangeable.

use crate::input::Modifiers;
use crate::tools::ToolKind;

/// Arrow-key direction for nudging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Unit step in world axes (y grows downward).
    pub fn unit(self) -> (f64, f64) {
        match self {
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
        }
    }
}

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Tool switching ──
    Tool(ToolKind),

    // ── Edit ──
    Undo,
    Redo,
    Delete,
    SelectAll,
    /// Move the selection one step.
    Nudge(Direction),
    /// Move the selection one large step (Shift held).
    NudgeLarge(Direction),

    // ── Crop ──
    /// Enter: commit an open crop box.
    Confirm,
    /// Escape: cancel an open crop box, otherwise deselect.
    Cancel,

    // ── View ──
    ZoomIn,
    ZoomOut,
    ZoomReset,
}

/// Resolves key events into shortcut actions.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action, or `None` if the combo is unbound.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        let cmd = modifiers.command();

        // ── Modifier combos first (most specific) ──
        if cmd && modifiers.shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "a" | "A" => Some(ShortcutAction::SelectAll),
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                "0" => Some(ShortcutAction::ZoomReset),
                _ => None,
            };
        }

        if let Some(direction) = arrow(key) {
            return Some(if modifiers.shift {
                ShortcutAction::NudgeLarge(direction)
            } else {
                ShortcutAction::Nudge(direction)
            });
        }

        if modifiers.shift || modifiers.alt {
            return None;
        }

        // ── Single keys (no modifiers) ──
        match key {
            "v" | "V" => Some(ShortcutAction::Tool(ToolKind::Select)),
            "h" | "H" => Some(ShortcutAction::Tool(ToolKind::Pan)),
            "p" | "P" => Some(ShortcutAction::Tool(ToolKind::Pen)),
            "e" | "E" => Some(ShortcutAction::Tool(ToolKind::Eraser)),
            "m" | "M" => Some(ShortcutAction::Tool(ToolKind::MoveImage)),
            "s" | "S" => Some(ShortcutAction::Tool(ToolKind::Transform)),
            "c" | "C" => Some(ShortcutAction::Tool(ToolKind::Crop)),
            "t" | "T" => Some(ShortcutAction::Tool(ToolKind::Text)),
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Enter" => Some(ShortcutAction::Confirm),
            "Escape" => Some(ShortcutAction::Cancel),
            _ => None,
        }
    }
}

fn arrow(key: &str) -> Option<Direction> {
    match key {
        "ArrowLeft" => Some(Direction::Left),
        "ArrowRight" => Some(Direction::Right),
        "ArrowUp" => Some(Direction::Up),
        "ArrowDown" => Some(Direction::Down),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CMD: Modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };
    const META: Modifiers = Modifiers {
        meta: true,
        ..Modifiers::NONE
    };
    const CMD_SHIFT: Modifiers = Modifiers {
        ctrl: true,
        shift: true,
        ..Modifiers::NONE
    };

    #[test]
    fn resolve_tool_shortcuts() {
        let none = Modifiers::NONE;
        assert_eq!(ShortcutMap::resolve("v", none), Some(ShortcutAction::Tool(ToolKind::Select)));
        assert_eq!(ShortcutMap::resolve("H", none), Some(ShortcutAction::Tool(ToolKind::Pan)));
        assert_eq!(ShortcutMap::resolve("p", none), Some(ShortcutAction::Tool(ToolKind::Pen)));
        assert_eq!(ShortcutMap::resolve("e", none), Some(ShortcutAction::Tool(ToolKind::Eraser)));
        assert_eq!(
            ShortcutMap::resolve("m", none),
            Some(ShortcutAction::Tool(ToolKind::MoveImage))
        );
        assert_eq!(
            ShortcutMap::resolve("s", none),
            Some(ShortcutAction::Tool(ToolKind::Transform))
        );
        assert_eq!(ShortcutMap::resolve("c", none), Some(ShortcutAction::Tool(ToolKind::Crop)));
        assert_eq!(ShortcutMap::resolve("t", none), Some(ShortcutAction::Tool(ToolKind::Text)));
    }

    #[test]
    fn resolve_undo_redo() {
        assert_eq!(ShortcutMap::resolve("z", CMD), Some(ShortcutAction::Undo));
        assert_eq!(ShortcutMap::resolve("z", META), Some(ShortcutAction::Undo));
        assert_eq!(ShortcutMap::resolve("Z", CMD_SHIFT), Some(ShortcutAction::Redo));
        assert_eq!(ShortcutMap::resolve("y", CMD), Some(ShortcutAction::Redo));
    }

    #[test]
    fn resolve_arrows() {
        assert_eq!(
            ShortcutMap::resolve("ArrowLeft", Modifiers::NONE),
            Some(ShortcutAction::Nudge(Direction::Left))
        );
        assert_eq!(
            ShortcutMap::resolve("ArrowDown", Modifiers::SHIFT),
            Some(ShortcutAction::NudgeLarge(Direction::Down))
        );
        assert_eq!(Direction::Up.unit(), (0.0, -1.0));
    }

    #[test]
    fn resolve_crop_keys() {
        assert_eq!(ShortcutMap::resolve("Enter", Modifiers::NONE), Some(ShortcutAction::Confirm));
        assert_eq!(ShortcutMap::resolve("Escape", Modifiers::NONE), Some(ShortcutAction::Cancel));
    }

    #[test]
    fn resolve_delete_and_select_all() {
        assert_eq!(ShortcutMap::resolve("Delete", Modifiers::NONE), Some(ShortcutAction::Delete));
        assert_eq!(
            ShortcutMap::resolve("Backspace", Modifiers::NONE),
            Some(ShortcutAction::Delete)
        );
        assert_eq!(ShortcutMap::resolve("a", CMD), Some(ShortcutAction::SelectAll));
    }

    #[test]
    fn resolve_zoom() {
        assert_eq!(ShortcutMap::resolve("=", CMD), Some(ShortcutAction::ZoomIn));
        assert_eq!(ShortcutMap::resolve("+", META), Some(ShortcutAction::ZoomIn));
        assert_eq!(ShortcutMap::resolve("-", CMD), Some(ShortcutAction::ZoomOut));
        assert_eq!(ShortcutMap::resolve("0", CMD), Some(ShortcutAction::ZoomReset));
    }

    #[test]
    fn resolve_modifier_precedence() {
        // Cmd+V is not the select tool.
        assert_eq!(ShortcutMap::resolve("v", CMD), None);
        // Shift+P is not the pen tool.
        assert_eq!(ShortcutMap::resolve("p", Modifiers::SHIFT), None);
    }

    #[test]
    fn resolve_unknown_key() {
        assert_eq!(ShortcutMap::resolve("F13", Modifiers::NONE), None);
        assert_eq!(ShortcutMap::resolve("q", CMD_SHIFT), None);
    }
}
