//! Procedural geometry for the built-in entity kinds
//!
//! Each [`EntityKind`] carries its generation parameters; [`generate_vertices`]
//! turns it into a flat, non-indexed vertex list drawn with
//! [`EntityKind::primitive_type`].

use crate::foundation::math::Vec3;
use crate::render::api::PrimitiveType;
use crate::render::resources::Material;
use crate::render::Vertex;

const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
const GREEN: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
const GRAY: [f32; 4] = [0.5, 0.5, 0.5, 1.0];
const TERRAIN_GREEN: [f32; 4] = [0.3, 0.8, 0.3, 1.0];
const UP: [f32; 3] = [0.0, 1.0, 0.0];

/// Half extent of the sky plane
pub const SKY_PLANE_HALF_SIZE: f32 = 100_000.0;

/// Height of the sky plane
pub const SKY_PLANE_HEIGHT: f32 = -1.0;

/// Horizontal frequency of the terrain height field
const TERRAIN_FREQUENCY: f32 = 0.1;

/// Most lines per grid axis and most points per terrain side
///
/// Larger lattices come from bad configuration, not real scenes, and
/// would exhaust memory before reaching the GPU.
pub const MAX_LATTICE_STEPS: u32 = 512;

/// Renderable shape and its generation parameters
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    /// A single RGB triangle in the XY plane
    Triangle,
    /// Square XZ grid of lines centered on the origin
    Grid {
        /// Side length
        size: f32,
        /// Distance between lines
        spacing: f32,
    },
    /// X, Y and Z axis lines from the origin
    Axis {
        /// Length of each line
        length: f32,
    },
    /// Wave height field on a `grid_size × grid_size` lattice with unit spacing
    Terrain {
        /// Points per side
        grid_size: u32,
        /// Peak height
        max_height: f32,
    },
    /// Huge flat quad just below the origin
    SkyPlane {
        /// Vertex color
        color: [f32; 4],
    },
}

impl EntityKind {
    /// Topology the vertices are laid out for
    pub const fn primitive_type(&self) -> PrimitiveType {
        match self {
            Self::Triangle | Self::Terrain { .. } => PrimitiveType::Triangle,
            Self::Grid { .. } | Self::Axis { .. } => PrimitiveType::Line,
            Self::SkyPlane { .. } => PrimitiveType::TriangleStrip,
        }
    }

    /// Material an entity of this kind starts with
    pub fn default_material(&self) -> Material {
        match self {
            Self::Triangle => Material::new(Vec3::new(1.0, 0.5, 0.5), Vec3::new(1.0, 1.0, 1.0), 32.0),
            Self::Terrain { .. } => Material::new(Vec3::new(0.3, 0.8, 0.3), Vec3::new(0.1, 0.1, 0.1), 8.0),
            Self::Grid { .. } | Self::Axis { .. } | Self::SkyPlane { .. } => Material::default(),
        }
    }

    /// Short name for logs and buffer labels
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Triangle => "triangle",
            Self::Grid { .. } => "grid",
            Self::Axis { .. } => "axis",
            Self::Terrain { .. } => "terrain",
            Self::SkyPlane { .. } => "sky-plane",
        }
    }
}

/// Build the vertex list for `kind`
///
/// Degenerate parameters (non-positive or non-finite grid spacing, a
/// non-finite size or height, terrain smaller than 2×2, lattices beyond
/// [`MAX_LATTICE_STEPS`]) produce an empty list.
pub fn generate_vertices(kind: &EntityKind) -> Vec<Vertex> {
    match *kind {
        EntityKind::Triangle => triangle_vertices(),
        EntityKind::Grid { size, spacing } => grid_vertices(size, spacing),
        EntityKind::Axis { length } => axis_vertices(length),
        EntityKind::Terrain { grid_size, max_height } => terrain_vertices(grid_size, max_height),
        EntityKind::SkyPlane { color } => sky_plane_vertices(color),
    }
}

fn triangle_vertices() -> Vec<Vertex> {
    let normal = [0.0, 0.0, 1.0];
    vec![
        Vertex::new([0.0, 0.5, 0.0], RED, normal, [0.5, 1.0]),
        Vertex::new([-0.5, -0.5, 0.0], GREEN, normal, [0.0, 0.0]),
        Vertex::new([0.5, -0.5, 0.0], BLUE, normal, [1.0, 0.0]),
    ]
}

fn grid_vertices(size: f32, spacing: f32) -> Vec<Vertex> {
    if !spacing.is_finite() || spacing <= 0.0 || !size.is_finite() || size < 0.0 {
        log::warn!("Grid needs positive spacing and non-negative size (size {size}, spacing {spacing})");
        return Vec::new();
    }

    let half = size * 0.5;
    // Integer stepping so the last line lands on +half without drift
    let steps = (size / spacing + 1e-4).floor();
    if steps > MAX_LATTICE_STEPS as f32 {
        log::warn!("Grid of size {size} with spacing {spacing} exceeds {MAX_LATTICE_STEPS} lines per axis");
        return Vec::new();
    }
    let steps = steps as u32;
    let line = |position: [f32; 3], color| {
        Vertex::new(position, color, UP, [0.0, 0.0]).with_tangent_frame([1.0, 0.0, 0.0], [0.0, 0.0, 1.0])
    };

    let mut vertices = Vec::with_capacity((steps as usize + 1) * 4);
    for i in 0..=steps {
        let offset = (i as f32).mul_add(spacing, -half);
        let on_axis = offset.abs() < spacing * 1e-3;

        let z_color = if on_axis { BLUE } else { GRAY };
        vertices.push(line([offset, 0.0, -half], z_color));
        vertices.push(line([offset, 0.0, half], z_color));

        let x_color = if on_axis { RED } else { GRAY };
        vertices.push(line([-half, 0.0, offset], x_color));
        vertices.push(line([half, 0.0, offset], x_color));
    }
    vertices
}

fn axis_vertices(length: f32) -> Vec<Vertex> {
    let origin = [0.0, 0.0, 0.0];
    let vertex = |position, color| Vertex::new(position, color, UP, [0.0, 0.0]);
    vec![
        vertex(origin, RED),
        vertex([length, 0.0, 0.0], RED),
        vertex(origin, GREEN),
        vertex([0.0, length, 0.0], GREEN),
        vertex(origin, BLUE),
        vertex([0.0, 0.0, length], BLUE),
    ]
}

/// Height of the terrain surface at lattice coordinates `(x, z)`
pub fn terrain_height(x: f32, z: f32, max_height: f32) -> f32 {
    (x * TERRAIN_FREQUENCY).sin() * (z * TERRAIN_FREQUENCY).cos() * max_height
}

fn terrain_normal(x: f32, z: f32, max_height: f32) -> [f32; 3] {
    let k = TERRAIN_FREQUENCY * max_height;
    let dh_dx = k * (x * TERRAIN_FREQUENCY).cos() * (z * TERRAIN_FREQUENCY).cos();
    let dh_dz = -k * (x * TERRAIN_FREQUENCY).sin() * (z * TERRAIN_FREQUENCY).sin();
    Vec3::new(-dh_dx, 1.0, -dh_dz).normalize().into()
}

fn terrain_vertices(grid_size: u32, max_height: f32) -> Vec<Vertex> {
    if grid_size < 2 {
        return Vec::new();
    }
    if grid_size > MAX_LATTICE_STEPS || !max_height.is_finite() {
        log::warn!("Terrain {grid_size}x{grid_size} with height {max_height} is out of range");
        return Vec::new();
    }

    let extent = grid_size as f32;
    let point = |x: u32, z: u32| {
        let (fx, fz) = (x as f32, z as f32);
        Vertex::new(
            [fx, terrain_height(fx, fz, max_height), fz],
            TERRAIN_GREEN,
            terrain_normal(fx, fz, max_height),
            [fx / extent, fz / extent],
        )
    };

    let cells = (grid_size - 1) as usize;
    let Some(capacity) = cells.checked_mul(cells).and_then(|n| n.checked_mul(6)) else {
        return Vec::new();
    };
    let mut vertices = Vec::with_capacity(capacity);
    for x in 0..grid_size - 1 {
        for z in 0..grid_size - 1 {
            // Counter-clockwise seen from above
            let (a, b, c, d) = (point(x, z), point(x, z + 1), point(x + 1, z + 1), point(x + 1, z));
            vertices.extend_from_slice(&[a, b, c, a, c, d]);
        }
    }
    vertices
}

fn sky_plane_vertices(color: [f32; 4]) -> Vec<Vertex> {
    let s = SKY_PLANE_HALF_SIZE;
    let y = SKY_PLANE_HEIGHT;
    vec![
        Vertex::new([-s, y, -s], color, UP, [0.0, 0.0]),
        Vertex::new([s, y, -s], color, UP, [1.0, 0.0]),
        Vertex::new([-s, y, s], color, UP, [0.0, 1.0]),
        Vertex::new([s, y, s], color, UP, [1.0, 1.0]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn triangle_has_rgb_corners() {
        let vertices = generate_vertices(&EntityKind::Triangle);
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[0].color, RED);
        assert_eq!(vertices[1].color, GREEN);
        assert_eq!(vertices[2].color, BLUE);
        assert_eq!(EntityKind::Triangle.primitive_type(), PrimitiveType::Triangle);
    }

    #[test]
    fn grid_highlights_center_lines() {
        let vertices = generate_vertices(&EntityKind::Grid {
            size: 10.0,
            spacing: 0.5,
        });
        // 21 offsets from -5 to 5, two lines each
        assert_eq!(vertices.len(), 21 * 4);
        assert_eq!(vertices.first().map(Vertex::xyz), Some([-5.0, 0.0, -5.0]));
        assert_relative_eq!(vertices[vertices.len() - 1].position[0], 5.0);

        let blue = vertices.iter().filter(|v| v.color == BLUE).count();
        let red = vertices.iter().filter(|v| v.color == RED).count();
        assert_eq!((blue, red), (2, 2));
        assert!(vertices.iter().all(|v| v.position[1] == 0.0));
    }

    #[test]
    fn grid_rejects_non_positive_spacing() {
        assert!(generate_vertices(&EntityKind::Grid { size: 4.0, spacing: 0.0 }).is_empty());
        assert!(generate_vertices(&EntityKind::Grid { size: 4.0, spacing: f32::NAN }).is_empty());
    }

    #[test]
    fn grid_rejects_unbounded_sizes() {
        assert!(generate_vertices(&EntityKind::Grid { size: f32::INFINITY, spacing: 1.0 }).is_empty());
        assert!(generate_vertices(&EntityKind::Grid { size: 4.0, spacing: f32::INFINITY }).is_empty());
        assert!(generate_vertices(&EntityKind::Grid { size: 1.0e9, spacing: 1.0e-3 }).is_empty());

        let at_cap = generate_vertices(&EntityKind::Grid {
            size: MAX_LATTICE_STEPS as f32,
            spacing: 1.0,
        });
        assert_eq!(at_cap.len(), (MAX_LATTICE_STEPS as usize + 1) * 4);
    }

    #[test]
    fn axis_lines_have_requested_length() {
        let vertices = generate_vertices(&EntityKind::Axis { length: 2.0 });
        assert_eq!(vertices.len(), 6);
        assert_eq!(vertices[1].xyz(), [2.0, 0.0, 0.0]);
        assert_eq!(vertices[3].xyz(), [0.0, 2.0, 0.0]);
        assert_eq!(vertices[5].xyz(), [0.0, 0.0, 2.0]);
        assert_eq!(EntityKind::Axis { length: 2.0 }.primitive_type(), PrimitiveType::Line);
    }

    #[test]
    fn terrain_follows_height_field() {
        let kind = EntityKind::Terrain {
            grid_size: 8,
            max_height: 3.0,
        };
        let vertices = generate_vertices(&kind);
        assert_eq!(vertices.len(), 7 * 7 * 6);

        for v in &vertices {
            let [x, y, z] = v.xyz();
            assert_relative_eq!(y, terrain_height(x, z, 3.0), epsilon = 1e-6);
            assert_relative_eq!(v.tex_coord[0], x / 8.0);
            assert!(v.normal[1] > 0.0);
        }
    }

    #[test]
    fn tiny_terrain_is_empty() {
        assert!(generate_vertices(&EntityKind::Terrain { grid_size: 1, max_height: 1.0 }).is_empty());
    }

    #[test]
    fn oversized_terrain_is_empty() {
        let huge = EntityKind::Terrain {
            grid_size: u32::MAX,
            max_height: 1.0,
        };
        assert!(generate_vertices(&huge).is_empty());
        let over_cap = EntityKind::Terrain {
            grid_size: MAX_LATTICE_STEPS + 1,
            max_height: 1.0,
        };
        assert!(generate_vertices(&over_cap).is_empty());
        let bad_height = EntityKind::Terrain {
            grid_size: 4,
            max_height: f32::NAN,
        };
        assert!(generate_vertices(&bad_height).is_empty());
    }

    #[test]
    fn sky_plane_is_a_strip_below_origin() {
        let kind = EntityKind::SkyPlane { color: [0.6, 0.8, 1.0, 1.0] };
        let vertices = generate_vertices(&kind);
        assert_eq!(vertices.len(), 4);
        assert!(vertices.iter().all(|v| v.position[1] == SKY_PLANE_HEIGHT));
        assert!(vertices.iter().all(|v| v.color == [0.6, 0.8, 1.0, 1.0]));
        assert_eq!(kind.primitive_type(), PrimitiveType::TriangleStrip);
    }
}
