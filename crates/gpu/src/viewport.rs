/// Size of the drawing area in CSS pixels plus the device pixel ratio.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub device_pixel_ratio: f64,
}

impl Viewport {
    /// Non-positive or non-finite inputs fall back to 1.
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        let sane = |v: f64| if v.is_finite() && v > 0.0 { v } else { 1.0 };
        Self {
            width: sane(width),
            height: sane(height),
            device_pixel_ratio: sane(device_pixel_ratio),
        }
    }

    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    /// Distance from the center to the right and bottom edges.
    pub fn half_extents(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }

    /// Backing-store size in physical pixels.
    pub fn physical_size(&self) -> (u32, u32) {
        let px = |v: f64| ((v * self.device_pixel_ratio).round() as u32).max(1);
        (px(self.width), px(self.height))
    }

    /// Same viewport with the pixel ratio capped at `max` (0 disables the cap).
    pub fn with_max_pixel_ratio(self, max: f64) -> Self {
        if max > 0.0 && self.device_pixel_ratio > max {
            Self {
                device_pixel_ratio: max,
                ..self
            }
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Viewport;

    #[test]
    fn aspect_and_physical_size() {
        let vp = Viewport::new(1280.0, 720.0, 2.0);
        assert_eq!(vp.aspect(), 1280.0 / 720.0);
        assert_eq!(vp.physical_size(), (2560, 1440));
        assert_eq!(vp.half_extents(), (640.0, 360.0));
    }

    #[test]
    fn fractional_pixel_ratio_rounds() {
        let vp = Viewport::new(801.0, 601.0, 1.5);
        assert_eq!(vp.physical_size(), (1202, 902));
    }

    #[test]
    fn degenerate_sizes_fall_back() {
        let vp = Viewport::new(0.0, f64::NAN, -2.0);
        assert_eq!(vp.physical_size(), (1, 1));
        assert_eq!(vp.aspect(), 1.0);
    }

    #[test]
    fn pixel_ratio_cap() {
        let vp = Viewport::new(100.0, 100.0, 3.0).with_max_pixel_ratio(2.0);
        assert_eq!(vp.device_pixel_ratio, 2.0);
        let vp = Viewport::new(100.0, 100.0, 3.0).with_max_pixel_ratio(0.0);
        assert_eq!(vp.device_pixel_ratio, 3.0);
    }
}
