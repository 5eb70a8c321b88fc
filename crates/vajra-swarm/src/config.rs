//! Simulation configuration.
//!
//! All values are fixed for the lifetime of a [`Swarm`](crate::Swarm).
//! Defaults reproduce the reference tuning: radius-15 voxels, 120 agents in
//! a 1000 × 800 world.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use vajra_lattice::{inner_radius, lattice_spacing, Bounds};

use crate::error::{Error, Result};
use crate::voxel::VoxelId;

/// Order in which the orchestrator visits voxels each tick.
///
/// A lock applied earlier in the traversal is visible to every voxel visited
/// later in the same tick, so the order decides how far a cascade travels
/// within one tick. It never changes which voxels a static arrangement
/// eventually locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalOrder {
    /// Stable id order, 0 first
    #[default]
    Ascending,
    /// Reverse id order
    Descending,
    /// A fixed permutation drawn once from `seed`
    Shuffled { seed: u64 },
}

impl TraversalOrder {
    /// The visiting sequence for a population of `count` voxels.
    pub fn sequence(&self, count: usize) -> Vec<VoxelId> {
        let mut ids: Vec<VoxelId> = (0..count).map(VoxelId::from_index).collect();
        match self {
            TraversalOrder::Ascending => {}
            TraversalOrder::Descending => ids.reverse(),
            TraversalOrder::Shuffled { seed } => {
                let mut rng = StdRng::seed_from_u64(*seed);
                ids.shuffle(&mut rng);
            }
        }
        ids
    }
}

/// How a face picks among several simultaneously valid docking partners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DockingTieBreak {
    /// First match in traversal order, faces in index order
    #[default]
    FirstFound,
    /// Closest face center; exact ties keep traversal order
    Nearest,
    /// Smallest (voxel id, face index)
    LowestId,
}

/// Backing structure for neighbor queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpatialBackend {
    /// Test every voxel, O(N) per query
    BruteForce,
    /// Uniform grid bucketed by the largest query radius
    #[default]
    Grid,
}

/// Configuration for the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    /// Hexagon circumradius
    pub voxel_radius: f64,
    /// Population size for spawned swarms
    pub num_agents: usize,
    /// Speed clamp for fluid voxels
    pub max_speed: f64,
    /// Velocity multiplier applied after each move
    pub friction: f64,
    /// Flocking neighborhood radius
    pub perception_radius: f64,
    /// Radius within which other voxels are docking candidates
    pub docking_radius: f64,
    /// Maximum face-center distance for a handshake
    pub face_range: f64,
    /// Faces must satisfy `dot(look_a, look_b) < -alignment_tolerance`
    pub alignment_tolerance: f64,
    /// Separation weight
    pub force_separation: f64,
    /// Cohesion weight
    pub force_cohesion: f64,
    /// Radius of the external stimulus
    pub stimulus_radius: f64,
    /// Toroidal world extent
    pub bounds: Bounds,
    /// Keep-out band along every edge when spawning
    pub spawn_margin: f64,
    /// Seed for spawn positions and headings
    pub seed: u64,
    pub traversal: TraversalOrder,
    pub tie_break: DockingTieBreak,
    pub spatial: SpatialBackend,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        let voxel_radius = 15.0;
        Self {
            voxel_radius,
            num_agents: 120,
            max_speed: 2.0,
            friction: 0.96,
            perception_radius: voxel_radius * 4.0,
            docking_radius: voxel_radius * 3.0,
            face_range: 5.0,
            alignment_tolerance: 0.9,
            force_separation: 1.2,
            force_cohesion: 0.05,
            stimulus_radius: 60.0,
            bounds: Bounds::new(1000.0, 800.0),
            spawn_margin: 50.0,
            seed: 42,
            traversal: TraversalOrder::default(),
            tie_break: DockingTieBreak::default(),
            spatial: SpatialBackend::default(),
        }
    }
}

impl SwarmConfig {
    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<()> {
        positive("voxel_radius", self.voxel_radius)?;
        positive("max_speed", self.max_speed)?;
        positive("perception_radius", self.perception_radius)?;
        positive("docking_radius", self.docking_radius)?;
        positive("face_range", self.face_range)?;
        positive("stimulus_radius", self.stimulus_radius)?;
        positive("bounds.width", self.bounds.width)?;
        positive("bounds.height", self.bounds.height)?;
        non_negative("force_separation", self.force_separation)?;
        non_negative("force_cohesion", self.force_cohesion)?;
        non_negative("spawn_margin", self.spawn_margin)?;

        if self.num_agents == 0 {
            return Err(invalid("num_agents", "must be at least 1"));
        }
        if u32::try_from(self.num_agents).is_err() {
            return Err(invalid("num_agents", format!("must fit in u32, got {}", self.num_agents)));
        }
        if !(self.friction > 0.0 && self.friction <= 1.0) {
            return Err(invalid("friction", format!("must be in (0, 1], got {}", self.friction)));
        }
        if !(0.0..=1.0).contains(&self.alignment_tolerance) {
            return Err(invalid(
                "alignment_tolerance",
                format!("must be in [0, 1], got {}", self.alignment_tolerance),
            ));
        }
        let margin = 2.0 * self.spawn_margin;
        if margin >= self.bounds.width || margin >= self.bounds.height {
            return Err(invalid(
                "spawn_margin",
                format!(
                    "{} leaves no room in a {} x {} world",
                    self.spawn_margin, self.bounds.width, self.bounds.height
                ),
            ));
        }
        Ok(())
    }

    /// Center-to-face distance.
    pub fn inner_radius(&self) -> f64 {
        inner_radius(self.voxel_radius)
    }

    /// Center-to-center distance of docked voxels.
    pub fn lattice_spacing(&self) -> f64 {
        lattice_spacing(self.voxel_radius)
    }

    /// Cell edge for the grid backend: one cell covers the widest query.
    pub fn grid_cell_size(&self) -> f64 {
        self.perception_radius.max(self.docking_radius)
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> Error {
    Error::InvalidConfig {
        field,
        reason: reason.into(),
    }
}

fn positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be positive and finite, got {value}")))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be non-negative and finite, got {value}")))
    }
}
