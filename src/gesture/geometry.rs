// Geometry shared by the gesture controller: points in client pixels, sizes,
// and the transform applied to the zoomable surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Size of a box `width` wide with the given aspect ratio (width / height).
    pub fn from_width(width: f64, aspect: f64) -> Self {
        let height = if aspect > 0.0 { width / aspect } else { 0.0 };
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Transform {
    pub const fn identity(scale: f64) -> Self {
        Self {
            scale,
            translate_x: 0.0,
            translate_y: 0.0,
        }
    }

    pub fn to_css(&self) -> String {
        format!(
            "translate({}px, {}px) scale({})",
            self.translate_x, self.translate_y, self.scale
        )
    }
}

/// Largest translation on each axis that keeps content of natural size
/// `content`, scaled by `scale`, covering `container`.
pub fn max_translation(scale: f64, content: Size, container: Size) -> (f64, f64) {
    let max_x = ((content.width * scale - container.width) / 2.0).max(0.0);
    let max_y = ((content.height * scale - container.height) / 2.0).max(0.0);
    (max_x, max_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        assert_eq!(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn max_translation_grows_with_scale() {
        let sq = Size::new(300.0, 300.0);
        assert_eq!(max_translation(2.0, sq, sq), (150.0, 150.0));
        assert_eq!(max_translation(1.0, sq, sq), (0.0, 0.0));
        // content smaller than container never pans
        assert_eq!(max_translation(1.5, Size::new(100.0, 50.0), sq), (0.0, 0.0));
    }

    #[test]
    fn css_transform() {
        let t = Transform {
            scale: 2.0,
            translate_x: -10.0,
            translate_y: 5.5,
        };
        assert_eq!(t.to_css(), "translate(-10px, 5.5px) scale(2)");
        assert_eq!(Size::from_width(1920.0, 2.0), Size::new(1920.0, 960.0));
    }
}
