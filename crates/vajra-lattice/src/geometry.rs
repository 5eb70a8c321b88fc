//! Hexagon measurements, steering-vector helpers and toroidal world bounds.

use glam::DVec2;

use crate::{FaceIndex, FACES_PER_VOXEL, FACE_ANGLE_STEP};

/// √3, the ratio between lattice spacing and voxel radius.
pub const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Squared magnitudes at or below this are treated as zero.
pub const EPSILON: f64 = 1.0e-12;

/// Distance from a voxel center to the middle of a face: `r·√3/2`.
#[inline]
pub fn inner_radius(voxel_radius: f64) -> f64 {
    voxel_radius * SQRT_3 / 2.0
}

/// Center-to-center distance of two face-docked voxels: `r·√3`.
#[inline]
pub fn lattice_spacing(voxel_radius: f64) -> f64 {
    voxel_radius * SQRT_3
}

/// Corners of a voxel hexagon.
///
/// Corners sit at `60°·k` so the faces at `30° + 60°·k` are the flat sides.
pub fn hex_vertices(center: DVec2, radius: f64, orientation: f64) -> [DVec2; FACES_PER_VOXEL] {
    std::array::from_fn(|k| center + DVec2::from_angle(orientation + FACE_ANGLE_STEP * k as f64) * radius)
}

/// World positions of the six face centers, in face order.
pub fn face_centers(center: DVec2, voxel_radius: f64, orientation: f64) -> [DVec2; FACES_PER_VOXEL] {
    let inner = inner_radius(voxel_radius);
    FaceIndex::ALL.map(|face| center + face.direction(orientation) * inner)
}

/// Rescale `v` to `magnitude`, leaving (near-)zero vectors at zero.
#[inline]
pub fn normalize_to(v: DVec2, magnitude: f64) -> DVec2 {
    let len_sq = v.length_squared();
    if len_sq <= EPSILON {
        return DVec2::ZERO;
    }
    v * (magnitude / len_sq.sqrt())
}

/// Clamp the length of `v` to at most `max_magnitude`.
#[inline]
pub fn limit_magnitude(v: DVec2, max_magnitude: f64) -> DVec2 {
    if max_magnitude <= 0.0 {
        return DVec2::ZERO;
    }
    if v.length_squared() <= max_magnitude * max_magnitude {
        return v;
    }
    normalize_to(v, max_magnitude)
}

/// Rectangular toroidal world `[0, width] × [0, height]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// Create bounds spanning `[0, width] × [0, height]`.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Wrap a position that left the world through one edge back in at the
    /// opposite edge.
    ///
    /// Crossing the far edge lands on 0; crossing 0 lands on the far edge.
    /// A position exactly on an edge stays put.
    pub fn wrap(&self, p: DVec2) -> DVec2 {
        DVec2::new(wrap_axis(p.x, self.width), wrap_axis(p.y, self.height))
    }

    /// Middle of the world.
    pub fn center(&self) -> DVec2 {
        DVec2::new(self.width * 0.5, self.height * 0.5)
    }
}

fn wrap_axis(value: f64, extent: f64) -> f64 {
    if value > extent {
        0.0
    } else if value < 0.0 {
        extent
    } else {
        value
    }
}
