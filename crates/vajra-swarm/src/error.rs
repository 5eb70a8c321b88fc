//! Error types for vajra-swarm.

use thiserror::Error;

use crate::voxel::VoxelId;

/// Result type for swarm operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when building or querying a swarm.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A configuration value cannot be used
    #[error("invalid config: `{field}` {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },

    /// No voxel with this id exists
    #[error("unknown voxel {0}")]
    UnknownVoxel(VoxelId),

    /// A hand-built population does not number its voxels 0..n in order
    #[error("voxel at index {index} has id {found}; ids must run 0..n in order")]
    NonContiguousIds { index: usize, found: VoxelId },

    /// A hand-built population has no voxels
    #[error("population is empty")]
    EmptyPopulation,
}
