#![allow(dead_code)]

use material_spheres::Settings;

/// Convert a clear colour to the bytes an Rgba8 target stores for it.
pub fn expected_pixel(colour: wgpu::Color) -> image::Rgba<u8> {
    let f_to_u8 = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    image::Rgba([
        f_to_u8(colour.r),
        f_to_u8(colour.g),
        f_to_u8(colour.b),
        f_to_u8(colour.a),
    ])
}

/// Settings pointing at an asset root that does not exist, so every texture
/// load fails and materials fall back to neutral maps.
pub fn settings_without_assets() -> Settings {
    Settings::default().with_asset_root("target/no-such-assets")
}

/// Pixel coordinates of a world point at z = 0 seen by the default camera
/// (eye at z = 10, 45 degree vertical fov) on a square viewport.
pub fn project_default_camera(x: f32, y: f32, size: u32) -> (u32, u32) {
    let half_extent = 10.0 * (22.5f32).to_radians().tan();
    let ndc_x = x / half_extent;
    let ndc_y = y / half_extent;
    let px = ((ndc_x + 1.0) * 0.5 * size as f32) as u32;
    let py = ((1.0 - ndc_y) * 0.5 * size as f32) as u32;
    (px, py)
}

#[cfg(feature = "integration-tests")]
pub fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Runtime::new().expect("tokio runtime")
}
