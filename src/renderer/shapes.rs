//! Mesh generation for the two primitives
//!
//! Both meshes live in local space; placement and squash come from the model
//! matrix at draw time.

use std::f32::consts::PI;

use super::vertex::Vertex;

/// Points around a circle centred on the origin, suitable for a triangle fan
///
/// Returns `segments + 1` vertices spaced `2π / segments` apart. The last
/// vertex repeats the first so the fan closes.
pub fn circle_vertices(radius: f32, segments: u32) -> Vec<Vertex> {
    debug_assert!(segments >= 1, "circle needs at least one segment");
    let step = 2.0 * PI / segments as f32;

    let mut vertices: Vec<Vertex> = (0..segments)
        .map(|i| {
            let theta = i as f32 * step;
            Vertex::new(radius * theta.cos(), radius * theta.sin())
        })
        .collect();
    // Close the loop on the exact first point rather than cos(2π) ≈ 1
    if let Some(&first) = vertices.first() {
        vertices.push(first);
    }
    vertices
}

/// Unit square from (0, 0) to (1, 1) as two triangles
pub fn rectangle_vertices() -> [Vertex; 6] {
    [
        Vertex::new(0.0, 1.0), // top-left
        Vertex::new(1.0, 0.0), // bottom-right
        Vertex::new(0.0, 0.0), // bottom-left
        Vertex::new(0.0, 1.0), // top-left
        Vertex::new(1.0, 1.0), // top-right
        Vertex::new(1.0, 0.0), // bottom-right
    ]
}

/// Triangle-list indices equivalent to drawing `vertex_count` vertices as a fan
///
/// The first vertex is the hub: triangles are (0, i, i + 1).
pub fn fan_indices(vertex_count: u32) -> Vec<u16> {
    if vertex_count < 3 {
        return Vec::new();
    }
    let mut indices = Vec::with_capacity(((vertex_count - 2) * 3) as usize);
    for i in 1..vertex_count - 1 {
        indices.extend_from_slice(&[0, i as u16, (i + 1) as u16]);
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Signed area of a triangle (positive when counter-clockwise)
    fn signed_area(a: &Vertex, b: &Vertex, c: &Vertex) -> f32 {
        let [ax, ay, _] = a.position;
        let [bx, by, _] = b.position;
        let [cx, cy, _] = c.position;
        ((bx - ax) * (cy - ay) - (cx - ax) * (by - ay)) / 2.0
    }

    #[test]
    fn test_circle_default_tessellation() {
        let verts = circle_vertices(50.0, 36);
        assert_eq!(verts.len(), 37);
        assert_eq!(verts[0], Vertex::new(50.0, 0.0));
        assert_eq!(verts[0], verts[36]);
        // Quarter turn lands on the y axis
        assert!(verts[9].position[0].abs() < 1e-4);
        assert!((verts[9].position[1] - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_circle_single_segment() {
        let verts = circle_vertices(3.0, 1);
        assert_eq!(verts.len(), 2);
        assert_eq!(verts[0], verts[1]);
    }

    #[test]
    fn test_rectangle_covers_unit_square_once() {
        let verts = rectangle_vertices();
        assert_eq!(verts.len(), 6);

        for v in &verts {
            let [x, y, z] = v.position;
            assert!(x == 0.0 || x == 1.0);
            assert!(y == 0.0 || y == 1.0);
            assert_eq!(z, 0.0);
        }

        // Two non-degenerate triangles with the same winding whose areas sum
        // to the unit square, sharing only the diagonal
        let a1 = signed_area(&verts[0], &verts[1], &verts[2]);
        let a2 = signed_area(&verts[3], &verts[4], &verts[5]);
        assert_eq!(a1.abs(), 0.5);
        assert_eq!(a2.abs(), 0.5);
        assert_eq!(a1.signum(), a2.signum());

        let corner = |v: &Vertex| (v.position[0] as u8, v.position[1] as u8);
        let t1: Vec<_> = verts[..3].iter().map(corner).collect();
        let t2: Vec<_> = verts[3..].iter().map(corner).collect();
        let shared = t1.iter().filter(|c| t2.contains(c)).count();
        assert_eq!(shared, 2);
        // The unshared corners are opposite each other
        assert!(t1.contains(&(0, 0)) && !t2.contains(&(0, 0)));
        assert!(t2.contains(&(1, 1)) && !t1.contains(&(1, 1)));
    }

    #[test]
    fn test_fan_indices() {
        assert!(fan_indices(0).is_empty());
        assert!(fan_indices(2).is_empty());
        assert_eq!(fan_indices(3), vec![0, 1, 2]);
        assert_eq!(fan_indices(5), vec![0, 1, 2, 0, 2, 3, 0, 3, 4]);
    }

    #[test]
    fn test_fan_over_circle_covers_disc() {
        let verts = circle_vertices(50.0, 36);
        let indices = fan_indices(verts.len() as u32);
        let area: f32 = indices
            .chunks(3)
            .map(|t| {
                signed_area(
                    &verts[t[0] as usize],
                    &verts[t[1] as usize],
                    &verts[t[2] as usize],
                )
            })
            .sum();
        // Inscribed 36-gon: n/2 * r² * sin(2π/n)
        let expected = 18.0 * 2500.0 * (2.0 * PI / 36.0).sin();
        assert!((area - expected).abs() < 1.0, "area {area} vs {expected}");
    }

    proptest! {
        #[test]
        fn prop_circle_points_on_radius(radius in 0.1f32..500.0, segments in 1u32..256) {
            let verts = circle_vertices(radius, segments);
            prop_assert_eq!(verts.len(), segments as usize + 1);
            prop_assert_eq!(verts[0], verts[segments as usize]);
            for v in &verts {
                let [x, y, z] = v.position;
                prop_assert_eq!(z, 0.0);
                prop_assert!(((x * x + y * y).sqrt() - radius).abs() <= radius * 1e-5);
            }
        }
    }
}
