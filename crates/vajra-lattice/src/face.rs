//! Face indices and orientation math.

use glam::DVec2;

use crate::{LatticeError, FACES_PER_VOXEL, FACE_ANGLE_OFFSET, FACE_ANGLE_STEP};

/// Index of one of the six faces of a voxel.
///
/// Face `k` sits at angle `30° + 60°·k` in the voxel frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct FaceIndex(u8);

impl FaceIndex {
    /// All six faces in index order.
    pub const ALL: [Self; FACES_PER_VOXEL] = [Self(0), Self(1), Self(2), Self(3), Self(4), Self(5)];

    /// Create a face index, rejecting values outside `0..6`.
    pub const fn new(index: u8) -> Result<Self, LatticeError> {
        if (index as usize) < FACES_PER_VOXEL {
            Ok(Self(index))
        } else {
            Err(LatticeError::FaceOutOfRange(index))
        }
    }

    /// Index usable for array access.
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// The face on the far side of the hexagon.
    #[inline]
    pub const fn opposite(self) -> Self {
        Self((self.0 + 3) % FACES_PER_VOXEL as u8)
    }

    /// Angle of this face in the voxel frame, in radians.
    #[inline]
    pub fn angle_offset(self) -> f64 {
        FACE_ANGLE_OFFSET + FACE_ANGLE_STEP * f64::from(self.0)
    }

    /// Unit look direction of this face for a voxel with the given body orientation.
    #[inline]
    pub fn direction(self, orientation: f64) -> DVec2 {
        DVec2::from_angle(orientation + self.angle_offset())
    }
}

impl TryFrom<u8> for FaceIndex {
    type Error = LatticeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FaceIndex> for u8 {
    fn from(value: FaceIndex) -> Self {
        value.0
    }
}

impl std::fmt::Display for FaceIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "face {}", self.0)
    }
}
