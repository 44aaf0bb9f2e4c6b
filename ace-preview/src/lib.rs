//! Preview composition for ACE
//!
//! Everything here produces or consumes `DrawCommand`s. Hosts with their own
//! renderer replay the commands; `Canvas` replays them into a bitmap.

pub mod theme;

mod audio_view;
mod canvas;
mod draw;
mod geometry;
mod split;

pub use audio_view::{audio_preview, AudioPreview};
pub use canvas::Canvas;
pub use draw::{CursorIcon, DrawCommand, TextureId};
pub use geometry::{Point, Rect};
pub use split::{
    compose, DragState, InputEvent, PointerEvent, SideSlot, SplitLayout, SplitViewState,
    DIVIDER_HIT_SLOP, MAX_ZOOM, MIN_ZOOM, WHEEL_ZOOM_STEP,
};
