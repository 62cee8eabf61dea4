//! Orbit controls: rotate around, dolly toward and pan across a target point.
//!
//! Input only accumulates deltas; nothing moves until [`OrbitControls::update`]
//! runs once per frame. With damping enabled each update applies a fraction of
//! the pending delta and decays the rest, so motion eases out after the pointer
//! is released.
//!
//! Mouse mapping: left drag rotates, middle drag dollies, right drag pans and
//! the wheel dollies.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Point3, Vector3, Zero};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::{
    camera::{Camera, Projection},
    settings::Settings,
};

const EPS: f32 = 1e-6;

/// Polar coordinates of the eye around the target.
///
/// `phi` is measured from +Y, `theta` around +Y starting at +Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    pub phi: f32,
    pub theta: f32,
}

impl Spherical {
    pub fn from_offset(offset: Vector3<f32>) -> Self {
        let radius = offset.magnitude();
        if radius == 0.0 {
            return Self {
                radius,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_offset(self) -> Vector3<f32> {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vector3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gesture {
    None,
    Rotate,
    Dolly,
    Pan,
}

#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub damping_factor: Option<f32>,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    pan_offset: Vector3<f32>,
    gesture: Gesture,
    cursor: Option<(f64, f64)>,
}

impl OrbitControls {
    pub fn new() -> Self {
        Self {
            damping_factor: None,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            pan_offset: Vector3::zero(),
            gesture: Gesture::None,
            cursor: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            damping_factor: settings.damping_factor,
            rotate_speed: settings.rotate_speed,
            zoom_speed: settings.zoom_speed,
            pan_speed: settings.pan_speed,
            ..Self::new()
        }
    }

    fn zoom_scale(&self) -> f32 {
        0.95f32.powf(self.zoom_speed)
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.delta_theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.delta_phi -= angle;
    }

    pub fn dolly_in(&mut self) {
        self.scale *= self.zoom_scale();
    }

    pub fn dolly_out(&mut self) {
        self.scale /= self.zoom_scale();
    }

    /// Queue a pan of `dx`/`dy` pixels on a viewport `viewport_height` pixels high.
    pub fn pan(&mut self, dx: f32, dy: f32, viewport_height: f32, camera: &Camera, projection: &Projection) {
        let distance = (camera.position - camera.target).magnitude() * (projection.fovy.0 / 2.0).tan();
        let (right, up) = camera.basis();
        let height = viewport_height.max(1.0);
        self.pan_offset += right * (-2.0 * dx * distance / height) * self.pan_speed;
        self.pan_offset += up * (2.0 * dy * distance / height) * self.pan_speed;
    }

    pub fn pointer_down(&mut self, button: MouseButton) {
        self.gesture = match button {
            MouseButton::Left => Gesture::Rotate,
            MouseButton::Middle => Gesture::Dolly,
            MouseButton::Right => Gesture::Pan,
            _ => self.gesture,
        };
    }

    pub fn pointer_up(&mut self, _button: MouseButton) {
        self.gesture = Gesture::None;
    }

    /// Feed pointer motion in pixels. Only has an effect while a button is held.
    pub fn pointer_move(
        &mut self,
        dx: f32,
        dy: f32,
        viewport_height: f32,
        camera: &Camera,
        projection: &Projection,
    ) {
        let height = viewport_height.max(1.0);
        match self.gesture {
            Gesture::Rotate => {
                self.rotate_left(2.0 * PI * dx / height * self.rotate_speed);
                self.rotate_up(2.0 * PI * dy / height * self.rotate_speed);
            }
            Gesture::Dolly => {
                if dy > 0.0 {
                    self.dolly_in();
                } else if dy < 0.0 {
                    self.dolly_out();
                }
            }
            Gesture::Pan => self.pan(dx, dy, height, camera, projection),
            Gesture::None => (),
        }
    }

    /// Wheel input with DOM sign convention: negative scrolls up and moves closer.
    pub fn wheel(&mut self, delta_y: f32) {
        if delta_y < 0.0 {
            self.dolly_in();
        } else if delta_y > 0.0 {
            self.dolly_out();
        }
    }

    pub fn handle_window_event(
        &mut self,
        event: &WindowEvent,
        viewport_height: f32,
        camera: &Camera,
        projection: &Projection,
    ) {
        match event {
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => self.pointer_down(*button),
                ElementState::Released => self.pointer_up(*button),
            },
            WindowEvent::CursorMoved { position, .. } => {
                if let Some((x, y)) = self.cursor {
                    let (dx, dy) = ((position.x - x) as f32, (position.y - y) as f32);
                    self.pointer_move(dx, dy, viewport_height, camera, projection);
                }
                self.cursor = Some((position.x, position.y));
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.gesture = Gesture::None;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                // winit reports scrolling up as positive
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -*y,
                    MouseScrollDelta::PixelDelta(position) => -position.y as f32,
                };
                self.wheel(delta_y);
            }
            _ => (),
        }
    }

    /// Whether applying the pending input would still move the camera noticeably.
    pub fn is_settled(&self) -> bool {
        self.delta_theta.abs() < EPS
            && self.delta_phi.abs() < EPS
            && (self.scale - 1.0).abs() < EPS
            && self.pan_offset.magnitude2() < EPS * EPS
    }

    /// Move `camera` by the pending input.
    pub fn update(&mut self, camera: &mut Camera) {
        let offset = camera.position - camera.target;
        let mut spherical = Spherical::from_offset(offset);

        let factor = self.damping_factor.unwrap_or(1.0);
        spherical.theta += self.delta_theta * factor;
        spherical.phi += self.delta_phi * factor;
        spherical.phi = spherical
            .phi
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(EPS, PI - EPS);
        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        let target: Point3<f32> = camera.target + self.pan_offset * factor;
        camera.target = target;
        camera.position = target + spherical.to_offset();

        match self.damping_factor {
            Some(factor) => {
                self.delta_theta *= 1.0 - factor;
                self.delta_phi *= 1.0 - factor;
                self.pan_offset *= 1.0 - factor;
            }
            None => {
                self.delta_theta = 0.0;
                self.delta_phi = 0.0;
                self.pan_offset = Vector3::zero();
            }
        }
        self.scale = 1.0;
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Deg, EuclideanSpace};

    use super::*;

    fn setup(damping: Option<f32>) -> (OrbitControls, Camera, Projection) {
        let settings = Settings::default().with_damping(damping);
        (
            OrbitControls::from_settings(&settings),
            Camera::new(settings.camera_position, settings.camera_target),
            Projection::new(800, 600, Deg(45.0), 0.1, 100.0),
        )
    }

    fn close(a: Point3<f32>, b: Point3<f32>) -> bool {
        (a - b).magnitude() < 1e-3
    }

    #[test]
    fn spherical_round_trip_of_start_position() {
        let s = Spherical::from_offset(Vector3::new(0.0, 0.0, 10.0));
        assert!((s.phi - PI / 2.0).abs() < 1e-6);
        assert_eq!(s.theta, 0.0);
        assert!((s.to_offset() - Vector3::new(0.0, 0.0, 10.0)).magnitude() < 1e-5);
    }

    #[test]
    fn idle_update_keeps_camera_still() {
        let (mut controls, mut camera, _projection) = setup(Some(0.05));
        let before = camera;
        for _ in 0..10 {
            controls.update(&mut camera);
        }
        assert!(close(camera.position, before.position));
        assert!(controls.is_settled());
    }

    #[test]
    fn undamped_rotation_applies_at_once() {
        let (mut controls, mut camera, _projection) = setup(None);
        controls.rotate_left(PI / 2.0);
        controls.update(&mut camera);
        // theta decreased by a quarter turn: +Z swings to -X
        assert!(close(camera.position, Point3::new(-10.0, 0.0, 0.0)), "{:?}", camera.position);
        assert!(controls.is_settled());
    }

    #[test]
    fn damped_rotation_eases_to_the_same_place() {
        let (mut controls, mut camera, _projection) = setup(Some(0.05));
        controls.rotate_left(PI / 2.0);
        controls.update(&mut camera);
        assert!(!close(camera.position, Point3::new(-10.0, 0.0, 0.0)));
        for _ in 0..1000 {
            controls.update(&mut camera);
        }
        assert!(close(camera.position, Point3::new(-10.0, 0.0, 0.0)), "{:?}", camera.position);
    }

    #[test]
    fn wheel_dollies_by_zoom_scale() {
        let (mut controls, mut camera, _projection) = setup(Some(0.05));
        controls.wheel(-1.0);
        controls.update(&mut camera);
        assert!((camera.position.z - 9.5).abs() < 1e-4);
        controls.wheel(1.0);
        controls.update(&mut camera);
        assert!((camera.position.z - 10.0).abs() < 1e-4);
    }

    #[test]
    fn polar_angle_never_flips_over_the_pole() {
        let (mut controls, mut camera, _projection) = setup(None);
        controls.rotate_up(10.0);
        controls.update(&mut camera);
        assert!(camera.position.y <= 10.0);
        assert!(camera.position.y > 9.99);
        assert!(camera.position.x.abs() < 1e-3 && camera.position.z.abs() < 1e-3);
        assert!(camera.position.to_vec().magnitude() > 9.99);
    }

    #[test]
    fn pan_moves_target_and_eye_together() {
        let (mut controls, mut camera, projection) = setup(None);
        controls.pointer_down(MouseButton::Right);
        controls.pointer_move(100.0, 0.0, 600.0, &camera.clone(), &projection);
        controls.update(&mut camera);
        assert!(camera.target.x < 0.0);
        assert!((camera.position.x - camera.target.x).abs() < 1e-4);
        assert!((camera.position.z - 10.0).abs() < 1e-4);
    }

    #[test]
    fn motion_without_button_is_ignored() {
        let (mut controls, mut camera, projection) = setup(None);
        controls.pointer_move(300.0, 300.0, 600.0, &camera.clone(), &projection);
        controls.update(&mut camera);
        assert!(close(camera.position, Point3::new(0.0, 0.0, 10.0)));

        controls.pointer_down(MouseButton::Left);
        controls.pointer_up(MouseButton::Left);
        controls.pointer_move(300.0, 300.0, 600.0, &camera.clone(), &projection);
        controls.update(&mut camera);
        assert!(close(camera.position, Point3::new(0.0, 0.0, 10.0)));
    }

    #[test]
    fn left_drag_rotates_a_full_turn_per_viewport_height() {
        let (mut controls, mut camera, projection) = setup(None);
        let before = Spherical::from_offset(camera.position - camera.target);
        controls.pointer_down(MouseButton::Left);
        // a quarter of the viewport height is a quarter turn
        controls.pointer_move(150.0, 0.0, 600.0, &camera.clone(), &projection);
        controls.update(&mut camera);
        let after = Spherical::from_offset(camera.position - camera.target);
        assert!((after.theta - before.theta + PI / 2.0).abs() < 1e-5, "{}", after.theta);
        assert!(close(camera.position, Point3::new(-10.0, 0.0, 0.0)), "{:?}", camera.position);
    }

    #[test]
    fn left_drag_scales_with_rotate_speed() {
        let (mut controls, mut camera, projection) = setup(None);
        controls.rotate_speed = 0.5;
        controls.pointer_down(MouseButton::Left);
        controls.pointer_move(300.0, 0.0, 600.0, &camera.clone(), &projection);
        controls.update(&mut camera);
        assert!(close(camera.position, Point3::new(-10.0, 0.0, 0.0)), "{:?}", camera.position);

        controls.rotate_speed = 2.0;
        controls.pointer_move(-75.0, 0.0, 600.0, &camera.clone(), &projection);
        controls.update(&mut camera);
        assert!(close(camera.position, Point3::new(0.0, 0.0, 10.0)), "{:?}", camera.position);
    }

    #[test]
    fn middle_drag_dollies_one_zoom_step() {
        let (mut controls, mut camera, projection) = setup(None);
        controls.zoom_speed = 2.0;
        controls.pointer_down(MouseButton::Middle);
        controls.pointer_move(0.0, 20.0, 600.0, &camera.clone(), &projection);
        controls.update(&mut camera);
        let radius = (camera.position - camera.target).magnitude();
        assert!((radius - 10.0 * 0.95f32.powf(2.0)).abs() < 1e-4, "{radius}");

        controls.pointer_move(0.0, -20.0, 600.0, &camera.clone(), &projection);
        controls.update(&mut camera);
        let radius = (camera.position - camera.target).magnitude();
        assert!((radius - 10.0).abs() < 1e-4, "{radius}");
    }
}
