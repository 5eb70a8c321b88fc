//! Lock events and the render-side snapshot.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use vajra_lattice::FaceIndex;

use crate::face::FaceRef;
use crate::voxel::{LatticeSite, VoxelId, VoxelState};

/// Why a voxel locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LockCause {
    /// Inside the external stimulus radius
    Stimulus,
    /// Seeded directly by the caller
    Anchor,
    /// Handshake with an already locked voxel
    Docked { partner: VoxelId },
}

/// Events recorded while the swarm assembles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SwarmEvent {
    /// A voxel turned solid
    VoxelLocked {
        voxel: VoxelId,
        cause: LockCause,
        position: DVec2,
        tick: u64,
    },

    /// Two faces latched onto each other (`a` belongs to the voxel that moved)
    FacesDocked { a: FaceRef, b: FaceRef, tick: u64 },
}

impl SwarmEvent {
    /// Get the tick this event happened in.
    pub fn tick(&self) -> u64 {
        match self {
            SwarmEvent::VoxelLocked { tick, .. } => *tick,
            SwarmEvent::FacesDocked { tick, .. } => *tick,
        }
    }
}

/// Render-side view of one face.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceView {
    pub index: FaceIndex,
    pub world_position: DVec2,
    pub locked: bool,
}

/// Render-side view of one voxel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoxelView {
    pub id: VoxelId,
    pub position: DVec2,
    pub orientation: f64,
    pub state: VoxelState,
    pub lattice: Option<LatticeSite>,
    /// Hexagon corners, for drawing the outline
    pub vertices: [DVec2; 6],
    pub faces: [FaceView; 6],
}

/// A read-only projection of the swarm at one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwarmSnapshot {
    pub tick: u64,
    pub voxels: Vec<VoxelView>,
    pub locked_count: usize,
    pub fluid_count: usize,
    pub cluster_count: usize,
    /// Largest lattice ring occupied in any cluster
    pub lattice_radius: u64,
}
