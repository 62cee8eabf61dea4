#[cfg(feature = "integration-tests")]
mod common;

#[test]
#[cfg(feature = "integration-tests")]
fn should_render_clear_colour() {
    use material_spheres::{context::Context, render::capture_frame, scene::Scene};

    use crate::common::test_utils::{expected_pixel, runtime, settings_without_assets};

    let runtime = runtime();
    runtime.block_on(async {
        let settings = settings_without_assets().with_clear_colour(wgpu::Color::WHITE);
        let ctx = Context::headless(settings, 64, 64).await.expect("headless context");
        let img = capture_frame(&ctx, &Scene::new(), 64, 64).await.expect("capture");
        assert_eq!(img.dimensions(), (64, 64));
        let desired_pixel = expected_pixel(wgpu::Color::WHITE);
        for pixel in img.pixels() {
            assert_eq!(*pixel, desired_pixel);
        }
    });
}

#[test]
#[cfg(feature = "integration-tests")]
fn showcase_renders_with_fallback_maps() {
    use material_spheres::{context::Context, render::capture_frame, showcase};

    use crate::common::test_utils::{expected_pixel, project_default_camera, runtime, settings_without_assets};

    const SIZE: u32 = 128;
    let runtime = runtime();
    runtime.block_on(async {
        let mut ctx = Context::headless(settings_without_assets(), SIZE, SIZE)
            .await
            .expect("headless context");
        let scene = showcase::build(&ctx).await.expect("scene with fallback textures");
        assert_eq!(scene.nodes().len(), 4);
        assert_eq!(scene.materials().len(), 4);
        ctx.update_camera();
        scene.write_to_buffers(&ctx.queue);

        let img = capture_frame(&ctx, &scene, SIZE, SIZE).await.expect("capture");

        // the gap between the spheres shows the transparent clear colour
        let centre = img.get_pixel(SIZE / 2, SIZE / 2);
        assert_eq!(*centre, expected_pixel(wgpu::Color::TRANSPARENT));

        for (x, y) in [(-2.0, 2.0), (-2.0, -2.0), (2.0, 2.0), (2.0, -2.0)] {
            let (px, py) = project_default_camera(x, y, SIZE);
            let pixel = img.get_pixel(px, py);
            assert_eq!(pixel[3], 255, "sphere at ({x}, {y}) missing at ({px}, {py})");
        }
    });
}

#[test]
#[cfg(feature = "integration-tests")]
fn spinning_keeps_spheres_in_place() {
    use material_spheres::{context::Context, showcase};

    use crate::common::test_utils::{runtime, settings_without_assets};

    let runtime = runtime();
    runtime.block_on(async {
        let ctx = Context::headless(settings_without_assets(), 32, 32)
            .await
            .expect("headless context");
        let mut scene = showcase::build(&ctx).await.expect("scene");
        let before: Vec<_> = scene.nodes().iter().map(|n| n.instance.position).collect();
        scene.spin_all(1.5 * ctx.settings.spin_speed);
        let after: Vec<_> = scene.nodes().iter().map(|n| n.instance.position).collect();
        assert_eq!(before, after);
        assert!(scene.nodes().iter().all(|n| n.instance.rotation != cgmath::Quaternion::new(1.0, 0.0, 0.0, 0.0)));
    });
}
