//! Software canvas that replays draw commands into a bitmap
//!
//! Images are sampled nearest-neighbor. Text and cursor regions have no
//! pixels of their own and are skipped.

use crate::draw::{DrawCommand, TextureId};
use crate::geometry::{Point, Rect};
use image::{Rgba, RgbaImage};
use std::sync::Arc;

pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Rgba<u8>) -> Self {
        Self {
            image: RgbaImage::from_pixel(width.max(1), height.max(1), background),
        }
    }

    /// Full canvas area
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.image.width() as f32, self.image.height() as f32)
    }

    /// Replay commands. `resolve` maps texture ids to bitmaps; unresolved images are skipped.
    pub fn draw<F>(&mut self, commands: &[DrawCommand], resolve: F)
    where
        F: Fn(TextureId) -> Option<Arc<RgbaImage>>,
    {
        for command in commands {
            match command {
                DrawCommand::FillRect { rect, color } => self.fill(rect, *color),
                DrawCommand::Image { texture, dest, uv } => {
                    if let Some(texture) = resolve(*texture) {
                        self.blit(&texture, dest, uv);
                    }
                }
                DrawCommand::Line { from, to, color } => self.line(*from, *to, *color),
                DrawCommand::Text { .. } | DrawCommand::CursorRegion { .. } => {}
            }
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Pixel column/row span covered by a rect, clipped to the canvas
    fn span(&self, rect: &Rect) -> (u32, u32, u32, u32) {
        let clip = |v: f32, max: u32| v.round().clamp(0.0, max as f32) as u32;
        let (w, h) = self.image.dimensions();
        (
            clip(rect.x, w),
            clip(rect.y, h),
            clip(rect.right(), w),
            clip(rect.bottom(), h),
        )
    }

    fn fill(&mut self, rect: &Rect, color: Rgba<u8>) {
        let (x0, y0, x1, y1) = self.span(rect);
        for y in y0..y1 {
            for x in x0..x1 {
                self.image.put_pixel(x, y, color);
            }
        }
    }

    fn blit(&mut self, texture: &RgbaImage, dest: &Rect, uv: &Rect) {
        if dest.is_empty() || texture.width() == 0 || texture.height() == 0 {
            return;
        }
        let (tw, th) = texture.dimensions();
        let (x0, y0, x1, y1) = self.span(dest);

        for y in y0..y1 {
            let v = uv.y + ((y as f32 + 0.5 - dest.y) / dest.height) * uv.height;
            let ty = ((v * th as f32) as i64).clamp(0, th as i64 - 1) as u32;
            for x in x0..x1 {
                let u = uv.x + ((x as f32 + 0.5 - dest.x) / dest.width) * uv.width;
                let tx = ((u * tw as f32) as i64).clamp(0, tw as i64 - 1) as u32;
                self.image.put_pixel(x, y, *texture.get_pixel(tx, ty));
            }
        }
    }

    fn line(&mut self, from: Point, to: Point, color: Rgba<u8>) {
        let (w, h) = self.image.dimensions();
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as u32;

        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = (from.x + dx * t).floor();
            let y = (from.y + dy * t).floor();
            if x >= 0.0 && y >= 0.0 && (x as u32) < w && (y as u32) < h {
                self.image.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split::{compose, SideSlot};
    use crate::theme;
    use ace_analysis::CopyLabel;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    fn solid(color: Rgba<u8>) -> Arc<RgbaImage> {
        Arc::new(RgbaImage::from_pixel(10, 10, color))
    }

    #[test]
    fn test_split_left_a_right_b() {
        let a = solid(RED);
        let b = solid(BLUE);
        let mut canvas = Canvas::new(100, 50, theme::BACKGROUND);
        let layout = compose(canvas.bounds(), Some((10, 10)), 0.5, 1.0);
        let commands = layout.commands(&SideSlot::Texture, &SideSlot::Texture);
        canvas.draw(&commands, |id| match id {
            TextureId::Copy(CopyLabel::A) => Some(Arc::clone(&a)),
            TextureId::Copy(CopyLabel::B) => Some(Arc::clone(&b)),
            _ => None,
        });

        let img = canvas.image();
        assert_eq!(*img.get_pixel(30, 25), RED);
        assert_eq!(*img.get_pixel(70, 25), BLUE);
        // Outside the fit rect the background shows
        assert_eq!(*img.get_pixel(10, 25), theme::BACKGROUND);
        assert_eq!(*img.get_pixel(90, 25), theme::BACKGROUND);
        assert_eq!(*img.get_pixel(50, 10), theme::DIVIDER);
    }

    #[test]
    fn test_blit_samples_uv_subrect() {
        // Left half red, right half blue
        let mut tex = RgbaImage::from_pixel(4, 1, RED);
        tex.put_pixel(2, 0, BLUE);
        tex.put_pixel(3, 0, BLUE);
        let tex = Arc::new(tex);

        let mut canvas = Canvas::new(8, 1, theme::BACKGROUND);
        canvas.draw(
            &[DrawCommand::Image {
                texture: TextureId::Copy(CopyLabel::A),
                dest: Rect::new(0.0, 0.0, 8.0, 1.0),
                uv: Rect::new(0.5, 0.0, 0.5, 1.0),
            }],
            |_| Some(Arc::clone(&tex)),
        );
        assert!(canvas.image().pixels().all(|p| *p == BLUE));
    }

    #[test]
    fn test_fill_clips_to_canvas() {
        let mut canvas = Canvas::new(4, 4, theme::BACKGROUND);
        canvas.draw(
            &[DrawCommand::FillRect {
                rect: Rect::new(-10.0, 2.0, 100.0, 100.0),
                color: RED,
            }],
            |_| None,
        );
        assert_eq!(*canvas.image().get_pixel(0, 1), theme::BACKGROUND);
        assert_eq!(*canvas.image().get_pixel(3, 3), RED);
    }
}
