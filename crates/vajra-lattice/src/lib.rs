//! Vajra Lattice Geometry
//!
//! Hexagonal voxel geometry and the axial lattice that locked voxels snap to.
//!
//! # Voxel Shape
//!
//! A voxel is a hexagon of circumradius `r` (the equatorial slice of a
//! rhombic dodecahedron). It carries six contact faces ("ports") on its flat
//! sides, at angles `30° + 60°·k` for `k in 0..6`:
//!
//! - face centers sit at the inner radius `r·√3/2`
//! - each face looks straight out from the center
//! - opposite faces (`k` and `k + 3`) look in exactly opposite directions
//!
//! # Lattice
//!
//! Two voxels docked face to face have their centers exactly one lattice
//! spacing (`r·√3`) apart. Every locked voxel therefore sits on an axial hex
//! coordinate relative to the anchor of its cluster, and every face is one
//! axial step.

mod face;
mod geometry;
mod hex;

pub use face::FaceIndex;
pub use geometry::{
    face_centers, hex_vertices, inner_radius, lattice_spacing, limit_magnitude, normalize_to,
    Bounds, EPSILON, SQRT_3,
};
pub use hex::HexCoord;

use thiserror::Error;

/// Number of contact faces on every voxel (invariant: always 6)
pub const FACES_PER_VOXEL: usize = 6;

/// Angle of face 0 relative to the voxel frame (30°, a flat side).
pub const FACE_ANGLE_OFFSET: f64 = std::f64::consts::PI / 6.0;

/// Angular step between consecutive faces (60°).
pub const FACE_ANGLE_STEP: f64 = std::f64::consts::PI / 3.0;

/// Errors raised by lattice constructors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LatticeError {
    /// Face index outside `0..6`
    #[error("face index {0} out of range (expected 0..{FACES_PER_VOXEL})")]
    FaceOutOfRange(u8),
}
