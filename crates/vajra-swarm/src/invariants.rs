//! Structural invariants of an assembling swarm.
//!
//! Every face lock is two-sided, locked voxels never move, and docked
//! voxels sit exactly one lattice spacing apart. The tick loop maintains
//! these by construction; [`check`] verifies them on a given state.

use glam::DVec2;
use thiserror::Error;
use vajra_lattice::FaceIndex;

use crate::config::SwarmConfig;
use crate::face::FaceRef;
use crate::voxel::{Voxel, VoxelId};

/// Allowed deviation from the lattice spacing for docked pairs.
pub const SPACING_TOLERANCE: f64 = 1e-4;

/// A broken invariant (impossible if the protocol is followed).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    /// A locked voxel carries motion
    #[error("locked voxel {voxel} still moving (velocity {velocity}, acceleration {acceleration})")]
    MovingLockedVoxel {
        voxel: VoxelId,
        velocity: DVec2,
        acceleration: DVec2,
    },

    /// A face is locked but records no partner
    #[error("{face} is locked without a partner")]
    MissingPartner { face: FaceRef },

    /// A face's partner does not point back or is not locked
    #[error("{face} is latched to {partner}, which is not latched back")]
    AsymmetricLock { face: FaceRef, partner: FaceRef },

    /// A face's partner names a voxel that does not exist
    #[error("{face} is latched to missing voxel {partner}")]
    DanglingPartner { face: FaceRef, partner: VoxelId },

    /// A face locked on a voxel that is still fluid
    #[error("fluid voxel {voxel} has locked {face}")]
    LockedFaceOnFluidVoxel { voxel: VoxelId, face: FaceIndex },

    /// Latched voxels do not occupy adjacent cells of one cluster lattice
    #[error("{face} is latched to {partner} but their lattice sites are not adjacent through those faces")]
    LatticeMismatch { face: FaceRef, partner: FaceRef },

    /// A docked pair drifted off the lattice spacing
    #[error("docked voxels {a} and {b} are {distance} apart, expected {expected}")]
    SpacingDrift {
        a: VoxelId,
        b: VoxelId,
        distance: f64,
        expected: f64,
    },
}

/// Check every invariant over the arena `voxels` (indexed by id).
pub fn check(voxels: &[Voxel], config: &SwarmConfig) -> Result<(), InvariantViolation> {
    let spacing = config.lattice_spacing();

    for voxel in voxels {
        if voxel.is_locked() && (voxel.velocity() != DVec2::ZERO || voxel.acceleration() != DVec2::ZERO) {
            return Err(InvariantViolation::MovingLockedVoxel {
                voxel: voxel.id(),
                velocity: voxel.velocity(),
                acceleration: voxel.acceleration(),
            });
        }

        for face in voxel.faces().iter().filter(|f| f.is_locked()) {
            if !voxel.is_locked() {
                return Err(InvariantViolation::LockedFaceOnFluidVoxel {
                    voxel: voxel.id(),
                    face: face.index(),
                });
            }

            let Some(partner) = face.partner() else {
                return Err(InvariantViolation::MissingPartner { face: face.face_ref() });
            };
            let Some(other) = voxels.get(partner.voxel.index()) else {
                return Err(InvariantViolation::DanglingPartner {
                    face: face.face_ref(),
                    partner: partner.voxel,
                });
            };

            let back = other.face(partner.face);
            if !back.is_locked() || back.partner() != Some(face.face_ref()) {
                return Err(InvariantViolation::AsymmetricLock {
                    face: face.face_ref(),
                    partner,
                });
            }

            let adjacent = match (voxel.lattice(), other.lattice()) {
                (Some(mine), Some(theirs)) if mine.cluster == theirs.cluster => {
                    let toward = mine.coord.face_toward(&theirs.coord);
                    toward == Some(face.index()) || toward == Some(partner.face.opposite())
                }
                _ => false,
            };
            if !adjacent {
                return Err(InvariantViolation::LatticeMismatch {
                    face: face.face_ref(),
                    partner,
                });
            }

            let distance = voxel.position().distance(other.position());
            if (distance - spacing).abs() > SPACING_TOLERANCE {
                return Err(InvariantViolation::SpacingDrift {
                    a: voxel.id(),
                    b: other.id(),
                    distance,
                    expected: spacing,
                });
            }
        }
    }

    Ok(())
}
