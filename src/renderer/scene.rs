//! Backend-agnostic frame submission
//!
//! `render_scene` describes a frame as a handful of calls on a `Canvas`. The
//! wgpu renderer implements `Canvas`; tests use a recorder.

use glam::{Mat4, Vec2, Vec3};

use crate::sim::Simulation;

/// The meshes uploaded at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshKind {
    /// Circle of the ball's radius, drawn as a triangle fan
    Circle,
    /// Unit square, drawn as two triangles
    Rectangle,
}

/// Draw-submission surface
pub trait Canvas {
    fn clear(&mut self, color: Vec3);
    fn set_projection(&mut self, projection: Mat4);
    fn draw(&mut self, mesh: MeshKind, model: Mat4, color: Vec3);
}

/// Orthographic projection over `[0, w] x [0, h] x [-1, 1]`, y up
pub fn projection(world_size: Vec2) -> Mat4 {
    Mat4::orthographic_rh(0.0, world_size.x, 0.0, world_size.y, -1.0, 1.0)
}

/// translate(position) * scale(scale.x, scale.y, 1)
pub fn model_matrix(position: Vec2, scale: Vec2) -> Mat4 {
    Mat4::from_translation(position.extend(0.0)) * Mat4::from_scale(scale.extend(1.0))
}

/// Submit one frame: ball first, obstacle on top
pub fn render_scene(sim: &Simulation, canvas: &mut impl Canvas) {
    canvas.clear(sim.settings.background_color);
    canvas.set_projection(projection(sim.bounds()));

    let ball = &sim.ball;
    canvas.draw(
        MeshKind::Circle,
        model_matrix(ball.pos, ball.squash),
        ball.color,
    );

    let obstacle = &sim.obstacle;
    canvas.draw(
        MeshKind::Rectangle,
        model_matrix(obstacle.pos, obstacle.size),
        obstacle.color,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Clear(Vec3),
        Projection(Mat4),
        Draw(MeshKind, Mat4, Vec3),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl Canvas for Recorder {
        fn clear(&mut self, color: Vec3) {
            self.calls.push(Call::Clear(color));
        }

        fn set_projection(&mut self, projection: Mat4) {
            self.calls.push(Call::Projection(projection));
        }

        fn draw(&mut self, mesh: MeshKind, model: Mat4, color: Vec3) {
            self.calls.push(Call::Draw(mesh, model, color));
        }
    }

    fn approx(a: Vec4, b: Vec4) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn test_frame_order_and_contents() {
        let mut sim = Simulation::default();
        sim.ball.squash = Vec2::new(1.3, 0.7);
        let mut canvas = Recorder::default();

        render_scene(&sim, &mut canvas);

        assert_eq!(canvas.calls.len(), 4);
        assert_eq!(canvas.calls[0], Call::Clear(Vec3::new(0.0, 0.8, 0.8)));
        assert_eq!(
            canvas.calls[1],
            Call::Projection(projection(Vec2::new(800.0, 600.0)))
        );
        assert_eq!(
            canvas.calls[2],
            Call::Draw(
                MeshKind::Circle,
                model_matrix(Vec2::new(400.0, 300.0), Vec2::new(1.3, 0.7)),
                Vec3::new(1.0, 0.5, 0.2)
            )
        );
        assert_eq!(
            canvas.calls[3],
            Call::Draw(
                MeshKind::Rectangle,
                model_matrix(Vec2::new(300.0, 300.0), Vec2::new(200.0, 100.0)),
                Vec3::new(0.0, 1.0, 0.0)
            )
        );
    }

    #[test]
    fn test_model_matrix_scales_then_translates() {
        let m = model_matrix(Vec2::new(300.0, 300.0), Vec2::new(200.0, 100.0));
        // Unit square corners land on the obstacle corners
        assert!(approx(m * Vec4::new(0.0, 0.0, 0.0, 1.0), Vec4::new(300.0, 300.0, 0.0, 1.0)));
        assert!(approx(m * Vec4::new(1.0, 1.0, 0.0, 1.0), Vec4::new(500.0, 400.0, 0.0, 1.0)));
    }

    #[test]
    fn test_projection_maps_screen_to_ndc() {
        let p = projection(Vec2::new(800.0, 600.0));
        let bl = p * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let tr = p * Vec4::new(800.0, 600.0, 0.0, 1.0);
        let mid = p * Vec4::new(400.0, 300.0, 0.0, 1.0);
        assert!((bl.x + 1.0).abs() < 1e-5 && (bl.y + 1.0).abs() < 1e-5);
        assert!((tr.x - 1.0).abs() < 1e-5 && (tr.y - 1.0).abs() < 1e-5);
        assert!(mid.x.abs() < 1e-5 && mid.y.abs() < 1e-5);
        // z = 0 sits inside wgpu's [0, 1] depth range
        assert!(mid.z >= 0.0 && mid.z <= 1.0);
    }

    #[test]
    fn test_squashed_ball_extent() {
        let m = model_matrix(Vec2::new(100.0, 100.0), Vec2::new(0.7, 1.3));
        let right = m * Vec4::new(50.0, 0.0, 0.0, 1.0);
        let top = m * Vec4::new(0.0, 50.0, 0.0, 1.0);
        assert!((right.x - 135.0).abs() < 1e-4);
        assert!((top.y - 165.0).abs() < 1e-4);
    }
}
