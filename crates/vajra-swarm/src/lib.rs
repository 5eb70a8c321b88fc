//! Vajra Swarm
//!
//! Decentralized self-assembly of hexagonal voxels through local face
//! handshakes.
//!
//! # Phases
//!
//! Every voxel starts **fluid**: it flocks (separation plus cohesion) and
//! wraps around a toroidal world. It turns **locked** for good when either
//!
//! 1. an external stimulus covers it, starting a new cluster in place, or
//! 2. one of its faces shakes hands with a free face of an already locked
//!    voxel, in which case it snaps exactly one lattice spacing out from
//!    that face and both faces latch onto each other.
//!
//! No voxel knows about the whole structure. A stimulus applied to one voxel
//! spreads through the population one handshake at a time.
//!
//! # Usage
//!
//! ```
//! use vajra_swarm::{Stimulus, Swarm, SwarmConfig};
//!
//! let mut swarm = Swarm::new(SwarmConfig::default()).unwrap();
//! let center = swarm.config().bounds.center();
//! for _ in 0..100 {
//!     swarm.tick(Stimulus::at(center));
//! }
//! assert!(swarm.check_invariants().is_ok());
//! ```

mod config;
mod error;
mod events;
mod face;
mod invariants;
mod spatial;
mod swarm;
mod voxel;

pub use config::{DockingTieBreak, SpatialBackend, SwarmConfig, TraversalOrder};
pub use error::{Error, Result};
pub use events::{FaceView, LockCause, SwarmEvent, SwarmSnapshot, VoxelView};
pub use face::{Face, FaceRef};
pub use invariants::{check as check_invariants, InvariantViolation, SPACING_TOLERANCE};
pub use spatial::{build_index, BruteForce, SpatialIndex, UniformGrid};
pub use swarm::{Stimulus, Swarm, TickSummary};
pub use voxel::{LatticeSite, Voxel, VoxelId, VoxelState};

pub use vajra_lattice::{Bounds, FaceIndex, HexCoord};
