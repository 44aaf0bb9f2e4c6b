//! Split-view compositor
//!
//! Both copies are laid out as one shared, zoomed, centered image. Copy A is
//! clipped to the left of the divider and copy B to the right, so the halves
//! stay pixel-aligned wherever the divider sits.

use crate::draw::{CursorIcon, DrawCommand, TextureId};
use crate::geometry::{Point, Rect};
use crate::theme;
use ace_analysis::CopyLabel;
use tracing::debug;

pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 5.0;
/// Zoom change per unit of wheel delta
pub const WHEEL_ZOOM_STEP: f32 = 0.1;
/// Half-width of the divider grab region in pixels
pub const DIVIDER_HIT_SLOP: f32 = 6.0;

const DEFAULT_DIVIDER: f32 = 0.5;
const DEFAULT_ZOOM: f32 = 1.0;
const LABEL_INSET: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up(Point),
}

/// Input delivered with a texture preview request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Pointer(PointerEvent),
    Wheel { delta_y: f32 },
}

/// Divider position, zoom, and drag flag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitViewState {
    divider: f32,
    zoom: f32,
    drag: DragState,
}

impl Default for SplitViewState {
    fn default() -> Self {
        Self {
            divider: DEFAULT_DIVIDER,
            zoom: DEFAULT_ZOOM,
            drag: DragState::Idle,
        }
    }
}

impl SplitViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Divider back to the middle, zoom back to 1.0
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn divider(&self) -> f32 {
        self.divider
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn set_divider(&mut self, divider: f32) {
        self.divider = divider.clamp(0.0, 1.0);
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn divider_x(&self, viewport: &Rect) -> f32 {
        viewport.x + viewport.width * self.divider
    }

    /// Grab region around the divider
    pub fn hit_region(&self, viewport: &Rect) -> Rect {
        Rect::new(
            self.divider_x(viewport) - DIVIDER_HIT_SLOP,
            viewport.y,
            DIVIDER_HIT_SLOP * 2.0,
            viewport.height,
        )
    }

    pub fn handle_pointer(&mut self, viewport: &Rect, event: PointerEvent) {
        match (self.drag, event) {
            (DragState::Idle, PointerEvent::Down(p)) => {
                if self.hit_region(viewport).contains(p) {
                    debug!(x = p.x, "divider drag started");
                    self.drag = DragState::Dragging;
                } else if viewport.contains(p) {
                    self.track(viewport, p);
                }
            }
            (DragState::Dragging, PointerEvent::Move(p)) => self.track(viewport, p),
            (DragState::Dragging, PointerEvent::Up(_)) => self.drag = DragState::Idle,
            _ => {}
        }
    }

    /// Wheel down zooms out, wheel up zooms in
    pub fn handle_wheel(&mut self, delta_y: f32) {
        self.set_zoom(self.zoom - delta_y * WHEEL_ZOOM_STEP);
    }

    pub fn handle_input(&mut self, viewport: &Rect, event: InputEvent) {
        match event {
            InputEvent::Pointer(pointer) => self.handle_pointer(viewport, pointer),
            InputEvent::Wheel { delta_y } => self.handle_wheel(delta_y),
        }
    }

    fn track(&mut self, viewport: &Rect, p: Point) {
        if viewport.width > 0.0 {
            self.set_divider((p.x - viewport.x) / viewport.width);
        }
    }
}

/// What to show on one side of the divider
#[derive(Debug, Clone, PartialEq)]
pub enum SideSlot {
    /// Decoded image is available as `TextureId::Copy(label)`
    Texture,
    Pending,
    Unavailable(String),
}

/// Resolved geometry of one split-view frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitLayout {
    pub viewport: Rect,
    pub divider_x: f32,
    /// Shared image rectangle for both copies
    pub fit: Rect,
    pub left: Rect,
    pub right: Rect,
    pub hit_region: Rect,
}

/// Lay out the split view.
///
/// `source_size` sets the aspect ratio of the shared image rectangle; without
/// it the image fills the viewport before zooming.
pub fn compose(
    viewport: Rect,
    source_size: Option<(u32, u32)>,
    divider: f32,
    zoom: f32,
) -> SplitLayout {
    let divider = divider.clamp(0.0, 1.0);
    let zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    let divider_x = viewport.x + viewport.width * divider;

    let base = match source_size {
        Some((w, h)) if w > 0 && h > 0 => viewport.fit_aspect(w as f32 / h as f32),
        _ => viewport,
    };
    let fit = base.scale_about(viewport.center(), zoom);

    let left = Rect::new(viewport.x, viewport.y, divider_x - viewport.x, viewport.height);
    let right = Rect::new(divider_x, viewport.y, viewport.right() - divider_x, viewport.height);
    let hit_region = Rect::new(
        divider_x - DIVIDER_HIT_SLOP,
        viewport.y,
        DIVIDER_HIT_SLOP * 2.0,
        viewport.height,
    );

    SplitLayout {
        viewport,
        divider_x,
        fit,
        left,
        right,
        hit_region,
    }
}

impl SplitLayout {
    pub fn side(&self, label: CopyLabel) -> Rect {
        match label {
            CopyLabel::A => self.left,
            CopyLabel::B => self.right,
        }
    }

    /// Screen rect where a side's image lands and the texture UVs it samples.
    /// `None` when the side shows nothing.
    pub fn image_region(&self, label: CopyLabel) -> Option<(Rect, Rect)> {
        let visible = self.side(label).intersect(&self.fit);
        if visible.is_empty() || self.fit.is_empty() {
            return None;
        }
        let uv = Rect::new(
            (visible.x - self.fit.x) / self.fit.width,
            (visible.y - self.fit.y) / self.fit.height,
            visible.width / self.fit.width,
            visible.height / self.fit.height,
        );
        Some((visible, uv))
    }

    /// Drawing instructions for one frame
    pub fn commands(&self, left: &SideSlot, right: &SideSlot) -> Vec<DrawCommand> {
        let mut commands = vec![DrawCommand::FillRect {
            rect: self.viewport,
            color: theme::BACKGROUND,
        }];

        for (label, slot) in [(CopyLabel::A, left), (CopyLabel::B, right)] {
            let side = self.side(label);
            if side.is_empty() {
                continue;
            }
            match slot {
                SideSlot::Texture => {
                    if let Some((dest, uv)) = self.image_region(label) {
                        commands.push(DrawCommand::Image {
                            texture: TextureId::Copy(label),
                            dest,
                            uv,
                        });
                    }
                }
                SideSlot::Pending => {
                    self.placeholder(&mut commands, side, "importing...".to_string(), theme::TEXT)
                }
                SideSlot::Unavailable(reason) => self.placeholder(
                    &mut commands,
                    side,
                    format!("unavailable: {}", reason),
                    theme::DANGER,
                ),
            }
            commands.push(DrawCommand::Text {
                at: Point::new(side.x + LABEL_INSET, side.y + LABEL_INSET),
                text: label.to_string(),
                color: theme::copy_color(label),
            });
        }

        commands.push(DrawCommand::Line {
            from: Point::new(self.divider_x, self.viewport.y),
            to: Point::new(self.divider_x, self.viewport.bottom()),
            color: theme::DIVIDER,
        });
        commands.push(DrawCommand::CursorRegion {
            rect: self.hit_region,
            icon: CursorIcon::ResizeHorizontal,
        });
        commands
    }

    fn placeholder(&self, commands: &mut Vec<DrawCommand>, side: Rect, text: String, color: image::Rgba<u8>) {
        let area = side.intersect(&self.fit);
        let area = if area.is_empty() { side } else { area };
        commands.push(DrawCommand::FillRect {
            rect: area,
            color: theme::PLACEHOLDER,
        });
        commands.push(DrawCommand::Text {
            at: area.center(),
            text,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Rect {
        Rect::new(0.0, 0.0, 1000.0, 500.0)
    }

    #[test]
    fn test_divider_extremes() {
        let at_zero = compose(viewport(), Some((256, 256)), 0.0, 1.0);
        assert_eq!(at_zero.left.width, 0.0);
        assert_eq!(at_zero.right.width, 1000.0);

        let at_one = compose(viewport(), Some((256, 256)), 1.0, 1.0);
        assert_eq!(at_one.right.width, 0.0);
        assert_eq!(at_one.left.width, 1000.0);
    }

    #[test]
    fn test_divider_half_splits_evenly() {
        let layout = compose(viewport(), Some((256, 256)), 0.5, 1.0);
        assert_eq!(layout.divider_x, 500.0);
        assert_eq!(layout.left.width, 500.0);
        assert_eq!(layout.right.width, 500.0);
    }

    #[test]
    fn test_zero_width_side_draws_nothing() {
        let layout = compose(viewport(), Some((256, 256)), 0.0, 1.0);
        let commands = layout.commands(&SideSlot::Texture, &SideSlot::Texture);
        let images: Vec<_> = commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Image { texture, .. } => Some(*texture),
                _ => None,
            })
            .collect();
        assert_eq!(images, vec![TextureId::Copy(CopyLabel::B)]);
    }

    #[test]
    fn test_halves_share_fit_rect() {
        let layout = compose(viewport(), Some((256, 256)), 0.5, 1.0);
        assert_eq!(layout.fit, Rect::new(250.0, 0.0, 500.0, 500.0));

        let (dest_a, uv_a) = layout.image_region(CopyLabel::A).unwrap();
        let (dest_b, uv_b) = layout.image_region(CopyLabel::B).unwrap();
        assert_eq!(dest_a, Rect::new(250.0, 0.0, 250.0, 500.0));
        assert_eq!(dest_b, Rect::new(500.0, 0.0, 250.0, 500.0));
        assert_eq!(uv_a, Rect::new(0.0, 0.0, 0.5, 1.0));
        assert_eq!(uv_b, Rect::new(0.5, 0.0, 0.5, 1.0));
    }

    #[test]
    fn test_zoom_scales_about_viewport_center() {
        let layout = compose(viewport(), Some((256, 256)), 0.2, 2.0);
        assert_eq!(layout.fit, Rect::new(0.0, -250.0, 1000.0, 1000.0));
        // Divider position does not move the image
        let other = compose(viewport(), Some((256, 256)), 0.8, 2.0);
        assert_eq!(layout.fit, other.fit);
    }

    #[test]
    fn test_divider_line_spans_viewport() {
        let layout = compose(viewport(), None, 0.25, 1.0);
        let line = layout
            .commands(&SideSlot::Texture, &SideSlot::Pending)
            .into_iter()
            .find(|c| matches!(c, DrawCommand::Line { .. }))
            .unwrap();
        assert_eq!(
            line,
            DrawCommand::Line {
                from: Point::new(250.0, 0.0),
                to: Point::new(250.0, 500.0),
                color: theme::DIVIDER,
            }
        );
        assert_eq!(layout.hit_region, Rect::new(244.0, 0.0, 12.0, 500.0));
    }

    #[test]
    fn test_zoom_clamps_exactly() {
        let mut state = SplitViewState::new();
        for _ in 0..200 {
            state.handle_wheel(-3.0);
        }
        assert_eq!(state.zoom(), MAX_ZOOM);
        for _ in 0..200 {
            state.handle_wheel(3.0);
        }
        assert_eq!(state.zoom(), MIN_ZOOM);
    }

    #[test]
    fn test_drag_state_machine() {
        let vp = viewport();
        let mut state = SplitViewState::new();

        // Near the divider starts a drag
        state.handle_pointer(&vp, PointerEvent::Down(Point::new(504.0, 100.0)));
        assert_eq!(state.drag_state(), DragState::Dragging);
        assert_eq!(state.divider(), 0.5);

        state.handle_pointer(&vp, PointerEvent::Move(Point::new(750.0, 100.0)));
        assert_eq!(state.divider(), 0.75);

        // Tracking clamps outside the viewport
        state.handle_pointer(&vp, PointerEvent::Move(Point::new(-40.0, 100.0)));
        assert_eq!(state.divider(), 0.0);

        state.handle_pointer(&vp, PointerEvent::Up(Point::new(2000.0, 2000.0)));
        assert_eq!(state.drag_state(), DragState::Idle);

        // Moves while idle do nothing
        state.handle_pointer(&vp, PointerEvent::Move(Point::new(900.0, 100.0)));
        assert_eq!(state.divider(), 0.0);
    }

    #[test]
    fn test_click_away_snaps_divider() {
        let vp = viewport();
        let mut state = SplitViewState::new();
        state.handle_pointer(&vp, PointerEvent::Down(Point::new(100.0, 100.0)));
        assert_eq!(state.drag_state(), DragState::Idle);
        assert_eq!(state.divider(), 0.1);

        // Outside the viewport is ignored
        state.handle_pointer(&vp, PointerEvent::Down(Point::new(100.0, 900.0)));
        assert_eq!(state.divider(), 0.1);
    }

    #[test]
    fn test_reset() {
        let mut state = SplitViewState::new();
        state.set_divider(0.9);
        state.set_zoom(3.0);
        state.reset();
        assert_eq!(state, SplitViewState::default());
        assert_eq!(state.divider(), 0.5);
        assert_eq!(state.zoom(), 1.0);
    }
}
