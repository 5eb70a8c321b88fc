//! Axial hexagonal lattice coordinates.
//!
//! Axial coordinates use two axes (q, r) at 60 degrees, with an implicit
//! third axis s = -q - r. The q axis runs through face 0 (30°) and the r axis
//! through face 1 (90°), so stepping through any face is a unit axial move.

use std::ops::{Add, Sub};

use crate::FaceIndex;

/// A cell on the voxel lattice, relative to a cluster anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HexCoord {
    /// Steps along face 0
    pub q: i64,
    /// Steps along face 1
    pub r: i64,
}

impl HexCoord {
    /// Origin of the coordinate system (the cluster anchor).
    pub const ORIGIN: Self = Self { q: 0, r: 0 };

    /// The axial step taken through each face, in face order.
    pub const FACE_DIRECTIONS: [Self; 6] = [
        Self { q: 1, r: 0 },  // 30°
        Self { q: 0, r: 1 },  // 90°
        Self { q: -1, r: 1 }, // 150°
        Self { q: -1, r: 0 }, // 210°
        Self { q: 0, r: -1 }, // 270°
        Self { q: 1, r: -1 }, // 330°
    ];

    /// Create a coordinate from its axial components.
    pub const fn new(q: i64, r: i64) -> Self {
        Self { q, r }
    }

    /// Implicit third axis: s = -q - r.
    pub const fn s(&self) -> i64 {
        -self.q - self.r
    }

    /// Hexagonal distance: max(|dq|, |dr|, |ds|).
    pub fn hex_distance(&self, other: &Self) -> u64 {
        let dq = (self.q - other.q).unsigned_abs();
        let dr = (self.r - other.r).unsigned_abs();
        let ds = (self.s() - other.s()).unsigned_abs();
        dq.max(dr).max(ds)
    }

    /// Ring around the anchor (0 = anchor, 1 = first ring, ...).
    pub fn ring(&self) -> u64 {
        self.hex_distance(&Self::ORIGIN)
    }

    /// The cell across the given face.
    pub fn neighbor(&self, face: FaceIndex) -> Self {
        *self + Self::FACE_DIRECTIONS[face.as_usize()]
    }

    /// The face of this cell that touches `other`, if they are adjacent.
    pub fn face_toward(&self, other: &Self) -> Option<FaceIndex> {
        let diff = *other - *self;
        Self::FACE_DIRECTIONS
            .iter()
            .position(|d| *d == diff)
            .map(|k| FaceIndex::ALL[k])
    }
}

impl Add for HexCoord {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            q: self.q + other.q,
            r: self.r + other.r,
        }
    }
}

impl Sub for HexCoord {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            q: self.q - other.q,
            r: self.r - other.r,
        }
    }
}

impl std::fmt::Display for HexCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}
