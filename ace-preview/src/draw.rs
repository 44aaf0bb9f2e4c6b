//! Renderer-agnostic drawing instructions

use crate::geometry::{Point, Rect};
use ace_analysis::CopyLabel;
use image::Rgba;

/// Bitmaps a command may reference; the host resolves them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureId {
    /// Decoded image of a scratch copy
    Copy(CopyLabel),
    /// Waveform envelope of a scratch copy
    Waveform(CopyLabel),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorIcon {
    ResizeHorizontal,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect {
        rect: Rect,
        color: Rgba<u8>,
    },
    /// Draw the `uv` sub-rectangle of a texture stretched over `dest`
    Image {
        texture: TextureId,
        dest: Rect,
        uv: Rect,
    },
    /// 1px line
    Line {
        from: Point,
        to: Point,
        color: Rgba<u8>,
    },
    Text {
        at: Point,
        text: String,
        color: Rgba<u8>,
    },
    /// Hover region for a mouse cursor change
    CursorRegion {
        rect: Rect,
        icon: CursorIcon,
    },
}
