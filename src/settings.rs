//! Runtime settings.
//!
//! Everything the scene would otherwise hard-code lives in [`Settings`]: the
//! canvas the renderer attaches to on the web, where assets are served from,
//! camera and control tuning, the pixel-ratio clamp and the spin speed.
//! [`Settings::default`] reproduces the stock demo.

use cgmath::{Deg, Point3};

#[derive(Clone, Debug)]
pub struct Settings {
    /// CSS selector of the canvas used on wasm32.
    pub canvas_selector: String,
    /// Directory (native) or URL path below the page origin (wasm32) holding the textures.
    pub asset_root: String,
    pub fovy: Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub camera_position: Point3<f32>,
    pub camera_target: Point3<f32>,
    /// `None` disables damping and applies control input immediately.
    pub damping_factor: Option<f32>,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    /// Upper bound for the device pixel ratio used to size the surface.
    pub max_pixel_ratio: f64,
    /// Rotation around +Y in radians per second of elapsed time.
    pub spin_speed: f32,
    pub clear_colour: wgpu::Color,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            canvas_selector: "canvas.webgl".to_string(),
            asset_root: "assets".to_string(),
            fovy: Deg(45.0),
            znear: 0.1,
            zfar: 100.0,
            camera_position: Point3::new(0.0, 0.0, 10.0),
            camera_target: Point3::new(0.0, 0.0, 0.0),
            damping_factor: Some(0.05),
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            max_pixel_ratio: 2.0,
            spin_speed: 0.5,
            // the canvas is composited over the page
            clear_colour: wgpu::Color::TRANSPARENT,
        }
    }
}

impl Settings {
    pub fn with_asset_root(mut self, root: impl Into<String>) -> Self {
        self.asset_root = root.into();
        self
    }

    pub fn with_canvas_selector(mut self, selector: impl Into<String>) -> Self {
        self.canvas_selector = selector.into();
        self
    }

    pub fn with_max_pixel_ratio(mut self, ratio: f64) -> Self {
        self.max_pixel_ratio = ratio;
        self
    }

    pub fn with_spin_speed(mut self, speed: f32) -> Self {
        self.spin_speed = speed;
        self
    }

    pub fn with_damping(mut self, factor: Option<f32>) -> Self {
        self.damping_factor = factor;
        self
    }

    pub fn with_clear_colour(mut self, colour: wgpu::Color) -> Self {
        self.clear_colour = colour;
        self
    }

    /// The device pixel ratio actually used for rendering.
    ///
    /// Nonsensical ratios (zero, negative, NaN) count as `1.0`.
    pub fn pixel_ratio(&self, device_ratio: f64) -> f64 {
        let device_ratio = if device_ratio.is_finite() && device_ratio > 0.0 {
            device_ratio
        } else {
            1.0
        };
        device_ratio.min(self.max_pixel_ratio.max(f64::MIN_POSITIVE))
    }

    /// Physical surface size for a logical (CSS) size at the given device ratio.
    pub fn surface_size(&self, logical_width: f64, logical_height: f64, device_ratio: f64) -> (u32, u32) {
        let ratio = self.pixel_ratio(device_ratio);
        let scale = |v: f64| ((v.max(0.0) * ratio).round() as u32).max(1);
        (scale(logical_width), scale(logical_height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_high_density_displays() {
        let settings = Settings::default();
        assert_eq!(settings.pixel_ratio(3.0), 2.0);
        assert_eq!(settings.pixel_ratio(1.5), 1.5);
        assert_eq!(settings.pixel_ratio(f64::NAN), 1.0);
        assert_eq!(settings.pixel_ratio(0.0), 1.0);
    }

    #[test]
    fn surface_size_uses_clamped_ratio() {
        let settings = Settings::default();
        assert_eq!(settings.surface_size(800.0, 600.0, 3.0), (1600, 1200));
        assert_eq!(settings.surface_size(800.0, 600.0, 1.0), (800, 600));
        assert_eq!(settings.surface_size(0.0, 0.0, 2.0), (1, 1));
    }

    #[test]
    fn builder_overrides_defaults() {
        let settings = Settings::default()
            .with_max_pixel_ratio(1.0)
            .with_spin_speed(2.0)
            .with_damping(None)
            .with_asset_root("static");
        assert_eq!(settings.pixel_ratio(2.0), 1.0);
        assert_eq!(settings.spin_speed, 2.0);
        assert!(settings.damping_factor.is_none());
        assert_eq!(settings.asset_root, "static");
        assert_eq!(settings.canvas_selector, "canvas.webgl");
    }
}
