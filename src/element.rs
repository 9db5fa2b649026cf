use crate::error::Error;
use std::fmt::{Debug, Display};

/**
 * All elements tracked by the registry implement this trait. They are
 * identified by their index.
 */
pub trait Handle {
    /**
     * The index of the element.
     */
    fn index(&self) -> u32;
}

/**
 * Corner handle. Corner indices start at 1.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CornerH {
    idx: u32,
}

/**
 * Curve segment handle. Curve indices start at 1.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CurveH {
    idx: u32,
}

/**
 * Surface patch handle. These are chosen by the caller.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PatchH {
    idx: u32,
}

impl Handle for CornerH {
    fn index(&self) -> u32 {
        self.idx
    }
}

impl From<u32> for CornerH {
    fn from(idx: u32) -> Self {
        CornerH { idx }
    }
}

impl From<&u32> for CornerH {
    fn from(idx: &u32) -> Self {
        CornerH { idx: *idx }
    }
}

impl Handle for CurveH {
    fn index(&self) -> u32 {
        self.idx
    }
}

impl From<u32> for CurveH {
    fn from(idx: u32) -> Self {
        CurveH { idx }
    }
}

impl From<&u32> for CurveH {
    fn from(idx: &u32) -> Self {
        CurveH { idx: *idx }
    }
}

impl Handle for PatchH {
    fn index(&self) -> u32 {
        self.idx
    }
}

impl From<u32> for PatchH {
    fn from(idx: u32) -> Self {
        PatchH { idx }
    }
}

impl From<&u32> for PatchH {
    fn from(idx: &u32) -> Self {
        PatchH { idx: *idx }
    }
}

impl Display for CornerH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CornerH({})", self.index())
    }
}

impl Display for CurveH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CurveH({})", self.index())
    }
}

impl Display for PatchH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PatchH({})", self.index())
    }
}

impl Debug for CornerH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CornerH({})", self.index())
    }
}

impl Debug for CurveH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CurveH({})", self.index())
    }
}

impl Debug for PatchH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PatchH({})", self.index())
    }
}

/// Index of a feature element of the mesh domain.
///
/// Refinement code that walks along features deals with both corners and
/// curve segments through this type. A cycle has no corner, so its end points
/// are reported as the curve itself.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Index {
    Corner(CornerH),
    Curve(CurveH),
}

impl Index {
    fn kind(&self) -> &'static str {
        match self {
            Index::Corner(_) => "corner",
            Index::Curve(_) => "curve segment",
        }
    }

    /// The corner this index refers to, or an error if it refers to a curve
    /// segment.
    pub fn corner(self) -> Result<CornerH, Error> {
        match self {
            Index::Corner(c) => Ok(c),
            Index::Curve(_) => Err(Error::IndexMismatch {
                expected: "corner",
                found: self.kind(),
            }),
        }
    }

    /// The curve segment this index refers to, or an error if it refers to a
    /// corner.
    pub fn curve(self) -> Result<CurveH, Error> {
        match self {
            Index::Curve(c) => Ok(c),
            Index::Corner(_) => Err(Error::IndexMismatch {
                expected: "curve segment",
                found: self.kind(),
            }),
        }
    }
}

impl Display for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Index::Corner(c) => write!(f, "Index::{c}"),
            Index::Curve(c) => write!(f, "Index::{c}"),
        }
    }
}

impl From<CornerH> for Index {
    fn from(c: CornerH) -> Self {
        Index::Corner(c)
    }
}

impl From<CurveH> for Index {
    fn from(c: CurveH) -> Self {
        Index::Curve(c)
    }
}

impl TryFrom<Index> for CornerH {
    type Error = Error;

    fn try_from(index: Index) -> Result<Self, Self::Error> {
        index.corner()
    }
}

impl TryFrom<Index> for CurveH {
    type Error = Error;

    fn try_from(index: Index) -> Result<Self, Self::Error> {
        index.curve()
    }
}
