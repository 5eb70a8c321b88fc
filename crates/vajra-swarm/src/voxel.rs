//! Voxels: the mobile agents that flock while fluid and freeze once locked.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use vajra_lattice::{face_centers, limit_magnitude, normalize_to, FaceIndex, HexCoord, EPSILON};

use crate::config::SwarmConfig;
use crate::face::{Face, FacePose};

/// Stable voxel identifier; doubles as the voxel's index in the swarm arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoxelId(pub u32);

impl VoxelId {
    /// Id of the voxel stored at `index`.
    ///
    /// Population sizes are capped at `u32::MAX` by config validation.
    #[inline]
    pub const fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    /// Arena index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for VoxelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Phase of a voxel. Transitions only from `Fluid` to `Locked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoxelState {
    #[default]
    Fluid,
    Locked,
}

/// Where a locked voxel sits on its cluster's lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LatticeSite {
    /// The stimulus- or anchor-locked voxel the cluster grew from
    pub cluster: VoxelId,
    /// Axial cell relative to that voxel
    pub coord: HexCoord,
}

/// One agent of the swarm.
#[derive(Debug, Clone, PartialEq)]
pub struct Voxel {
    id: VoxelId,
    position: DVec2,
    velocity: DVec2,
    acceleration: DVec2,
    orientation: f64,
    state: VoxelState,
    faces: [Face; 6],
    lattice: Option<LatticeSite>,
    locked_tick: Option<u64>,
}

impl Voxel {
    /// A fluid voxel at rest.
    pub fn new(id: VoxelId, position: DVec2) -> Self {
        Self {
            id,
            position,
            velocity: DVec2::ZERO,
            acceleration: DVec2::ZERO,
            orientation: 0.0,
            state: VoxelState::Fluid,
            faces: FaceIndex::ALL.map(|index| Face::new(id, index)),
            lattice: None,
            locked_tick: None,
        }
    }

    pub fn with_velocity(mut self, velocity: DVec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Fixed body angle added to every face angle. Voxels never rotate after
    /// construction.
    pub fn with_orientation(mut self, orientation: f64) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn id(&self) -> VoxelId {
        self.id
    }

    /// Center in world coordinates.
    pub fn position(&self) -> DVec2 {
        self.position
    }

    pub fn velocity(&self) -> DVec2 {
        self.velocity
    }

    /// Force accumulated since the last integration step (zero while locked).
    pub fn acceleration(&self) -> DVec2 {
        self.acceleration
    }

    /// Rotation in radians. Fixed for the voxel's lifetime.
    pub fn orientation(&self) -> f64 {
        self.orientation
    }

    pub fn state(&self) -> VoxelState {
        self.state
    }

    /// Whether the voxel has frozen into a cluster.
    pub fn is_locked(&self) -> bool {
        self.state == VoxelState::Locked
    }

    /// All six faces in index order.
    pub fn faces(&self) -> &[Face; 6] {
        &self.faces
    }

    pub fn face(&self, index: FaceIndex) -> &Face {
        &self.faces[index.as_usize()]
    }

    /// Lattice address, present once locked.
    pub fn lattice(&self) -> Option<LatticeSite> {
        self.lattice
    }

    /// Tick at which the voxel locked.
    pub fn locked_tick(&self) -> Option<u64> {
        self.locked_tick
    }

    /// World positions of all six face centers.
    pub fn face_positions(&self, voxel_radius: f64) -> [DVec2; 6] {
        face_centers(self.position, voxel_radius, self.orientation)
    }

    pub(crate) fn pose(&self, index: FaceIndex, inner_radius: f64) -> FacePose {
        self.face(index).pose(self.position, self.orientation, inner_radius)
    }

    pub(crate) fn poses(&self, inner_radius: f64) -> [FacePose; 6] {
        FaceIndex::ALL.map(|index| self.pose(index, inner_radius))
    }

    pub(crate) fn face_mut(&mut self, index: FaceIndex) -> &mut Face {
        &mut self.faces[index.as_usize()]
    }

    /// Separation plus cohesion from the given neighbors.
    ///
    /// Neighbors sharing this voxel's exact position contribute nothing.
    pub(crate) fn flocking_force<'a, I>(&self, neighbors: I, config: &SwarmConfig) -> DVec2
    where
        I: IntoIterator<Item = &'a Voxel>,
    {
        let mut separation = DVec2::ZERO;
        let mut centroid = DVec2::ZERO;
        let mut total = 0usize;

        for other in neighbors {
            if other.id == self.id {
                continue;
            }
            let offset = self.position - other.position;
            let dist_sq = offset.length_squared();
            if dist_sq <= EPSILON {
                continue;
            }
            separation += offset / dist_sq;
            centroid += other.position;
            total += 1;
        }

        if total == 0 {
            return DVec2::ZERO;
        }

        let cohesion = centroid / total as f64 - self.position;
        normalize_to(separation, config.max_speed) * config.force_separation
            + normalize_to(cohesion, config.max_speed) * config.force_cohesion
    }

    pub(crate) fn apply_force(&mut self, force: DVec2) {
        self.acceleration += force;
    }

    /// One Euler step with speed clamp, friction and toroidal wrap.
    pub(crate) fn integrate(&mut self, config: &SwarmConfig) {
        self.velocity = limit_magnitude(self.velocity + self.acceleration, config.max_speed);
        self.position = config.bounds.wrap(self.position + self.velocity);
        self.velocity *= config.friction;
        self.acceleration = DVec2::ZERO;
    }

    /// Hold a locked voxel still.
    pub(crate) fn settle(&mut self) {
        self.velocity = DVec2::ZERO;
        self.acceleration = DVec2::ZERO;
    }

    pub(crate) fn snap_to(&mut self, position: DVec2) {
        debug_assert!(!self.is_locked(), "locked voxels never move");
        self.position = position;
    }

    pub(crate) fn lock(&mut self, site: LatticeSite, tick: u64) {
        debug_assert!(!self.is_locked(), "voxel {} locked twice", self.id);
        self.state = VoxelState::Locked;
        self.lattice = Some(site);
        self.locked_tick = Some(tick);
        self.settle();
    }
}
