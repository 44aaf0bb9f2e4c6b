//! Screen-space geometry in pixels, origin top-left

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle. Width and height are never negative.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Unit rectangle, the full texture in UV space
    pub const fn unit() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Overlap of two rectangles; empty when they are disjoint
    pub fn intersect(&self, other: &Rect) -> Rect {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Largest rectangle of the given aspect ratio centered inside this one
    pub fn fit_aspect(&self, aspect: f32) -> Rect {
        if !(aspect > 0.0) || self.is_empty() {
            return *self;
        }
        let (w, h) = if self.width / self.height > aspect {
            (self.height * aspect, self.height)
        } else {
            (self.width, self.width / aspect)
        };
        let c = self.center();
        Rect::new(c.x - w * 0.5, c.y - h * 0.5, w, h)
    }

    /// Scale around a fixed point
    pub fn scale_about(&self, origin: Point, factor: f32) -> Rect {
        Rect::new(
            origin.x + (self.x - origin.x) * factor,
            origin.y + (self.y - origin.y) * factor,
            self.width * factor,
            self.height * factor,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersect_disjoint_is_empty() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 0.0, 10.0, 10.0);
        assert!(a.intersect(&b).is_empty());
        assert_eq!(a.intersect(&Rect::new(5.0, 5.0, 10.0, 10.0)), Rect::new(5.0, 5.0, 5.0, 5.0));
    }

    #[test]
    fn test_fit_aspect() {
        let viewport = Rect::new(0.0, 0.0, 200.0, 100.0);
        assert_eq!(viewport.fit_aspect(1.0), Rect::new(50.0, 0.0, 100.0, 100.0));
        assert_eq!(viewport.fit_aspect(4.0), Rect::new(0.0, 25.0, 200.0, 50.0));
    }

    #[test]
    fn test_scale_about_center() {
        let r = Rect::new(50.0, 0.0, 100.0, 100.0);
        let scaled = r.scale_about(Point::new(100.0, 50.0), 2.0);
        assert_eq!(scaled, Rect::new(0.0, -50.0, 200.0, 200.0));
    }
}
