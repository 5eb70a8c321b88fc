//! Faces and the docking handshake.
//!
//! # Handshake
//!
//! A face only learns about a neighbor when the two are touching:
//!
//! 1. **Proximity**: face centers closer than `face_range`
//! 2. **Alignment**: look directions nearly opposite,
//!    `dot(look_a, look_b) < -alignment_tolerance`
//!
//! Locked faces never take part on either side, so a face is latched at
//! most once, and both sides of a pair are latched together by the swarm.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use vajra_lattice::FaceIndex;

use crate::config::{DockingTieBreak, SwarmConfig};
use crate::voxel::VoxelId;

/// Non-owning address of one face of one voxel.
///
/// Ordered by voxel id, then face index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FaceRef {
    pub voxel: VoxelId,
    pub face: FaceIndex,
}

impl std::fmt::Display for FaceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.voxel, self.face)
    }
}

/// A contact port on a voxel's flat side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face {
    owner: VoxelId,
    index: FaceIndex,
    locked: bool,
    partner: Option<FaceRef>,
}

impl Face {
    pub(crate) fn new(owner: VoxelId, index: FaceIndex) -> Self {
        Self {
            owner,
            index,
            locked: false,
            partner: None,
        }
    }

    /// Voxel this face belongs to.
    pub fn owner(&self) -> VoxelId {
        self.owner
    }

    pub fn index(&self) -> FaceIndex {
        self.index
    }

    /// Angle in the owner's frame, in radians.
    pub fn angle_offset(&self) -> f64 {
        self.index.angle_offset()
    }

    /// A locked face never takes part in another handshake.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// The face this one is latched to. Present exactly when locked.
    pub fn partner(&self) -> Option<FaceRef> {
        self.partner
    }

    /// Address of this face.
    pub fn face_ref(&self) -> FaceRef {
        FaceRef {
            voxel: self.owner,
            face: self.index,
        }
    }

    /// Outward unit normal for an owner rotated by `owner_orientation`.
    pub fn look_direction(&self, owner_orientation: f64) -> DVec2 {
        self.index.direction(owner_orientation)
    }

    /// Center of the face: the owner's center pushed out by the inner radius.
    pub fn world_position(&self, owner_position: DVec2, owner_orientation: f64, inner_radius: f64) -> DVec2 {
        owner_position + self.look_direction(owner_orientation) * inner_radius
    }

    pub(crate) fn pose(&self, owner_position: DVec2, owner_orientation: f64, inner_radius: f64) -> FacePose {
        let look = self.look_direction(owner_orientation);
        FacePose {
            face: self.face_ref(),
            position: owner_position + look * inner_radius,
            look,
            locked: self.locked,
        }
    }

    pub(crate) fn latch(&mut self, partner: FaceRef) {
        debug_assert!(!self.locked, "{} latched twice", self.face_ref());
        self.locked = true;
        self.partner = Some(partner);
    }
}

/// World-space view of a face, computed once per scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FacePose {
    pub face: FaceRef,
    pub position: DVec2,
    pub look: DVec2,
    pub locked: bool,
}

/// Matching rules for the docking handshake.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Handshake {
    face_range: f64,
    alignment_tolerance: f64,
    tie_break: DockingTieBreak,
}

impl Handshake {
    pub fn from_config(config: &SwarmConfig) -> Self {
        Self {
            face_range: config.face_range,
            alignment_tolerance: config.alignment_tolerance,
            tie_break: config.tie_break,
        }
    }

    /// Face-center distance if `other` passes both handshake tests.
    pub fn accepts(&self, me: &FacePose, other: &FacePose) -> Option<f64> {
        let distance = me.position.distance(other.position);
        if distance >= self.face_range {
            return None;
        }
        if me.look.dot(other.look) >= -self.alignment_tolerance {
            return None;
        }
        Some(distance)
    }

    /// Find a docking partner for `face` among `candidates`.
    ///
    /// Candidate faces on the same voxel and locked candidate faces are
    /// skipped. A locked `face` never scans.
    pub fn scan<I>(&self, face: &Face, me: &FacePose, candidates: I) -> Option<FaceRef>
    where
        I: IntoIterator<Item = FacePose>,
    {
        if face.is_locked() {
            return None;
        }

        let mut best: Option<(FaceRef, f64)> = None;
        for other in candidates {
            if other.locked || other.face.voxel == face.owner() {
                continue;
            }
            let Some(distance) = self.accepts(me, &other) else {
                continue;
            };
            let better = match (self.tie_break, best) {
                (DockingTieBreak::FirstFound, _) => return Some(other.face),
                (_, None) => true,
                (DockingTieBreak::Nearest, Some((_, d))) => distance < d,
                (DockingTieBreak::LowestId, Some((r, _))) => other.face < r,
            };
            if better {
                best = Some((other.face, distance));
            }
        }
        best.map(|(face, _)| face)
    }
}
