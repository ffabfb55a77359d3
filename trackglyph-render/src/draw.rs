//! Renderer-agnostic drawing commands.
//!
//! The engine's only output surface: pure data the host pipeline rasterizes
//! however it likes. Coordinates are pixels on the pass's viewport surface.

use serde::{Deserialize, Serialize};

/// Semantic class of a drawn primitive; the host maps classes to colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GlyphClass {
    Block,
    Deletion,
    Insertion,
    Mismatch,
    CodonEven,
    CodonOdd,
    CodonStart,
    CodonStop,
    Arm,
    Connector,
    Label,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCmd {
    Rect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        class: GlyphClass,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        dashed: bool,
        class: GlyphClass,
    },
    /// Directional marker drawn at (x, y), pointing right when `forward`.
    Chevron {
        x: f64,
        y: f64,
        forward: bool,
        class: GlyphClass,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        class: GlyphClass,
    },
    /// Small point marker (insertions).
    Point {
        x: f64,
        y: f64,
        class: GlyphClass,
    },
}

impl DrawCmd {
    pub fn class(&self) -> GlyphClass {
        match self {
            DrawCmd::Rect { class, .. }
            | DrawCmd::Line { class, .. }
            | DrawCmd::Chevron { class, .. }
            | DrawCmd::Text { class, .. }
            | DrawCmd::Point { class, .. } => *class,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_serialize() {
        let cmd = DrawCmd::Rect {
            x: 1.0,
            y: 2.0,
            w: 30.0,
            h: 10.0,
            class: GlyphClass::Block,
        };
        let json = serde_json::to_string(&cmd).unwrap();
        let back: DrawCmd = serde_json::from_str(&json).unwrap();
        assert_eq!(cmd, back);
        assert_eq!(back.class(), GlyphClass::Block);
    }
}
