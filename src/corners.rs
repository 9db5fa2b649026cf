use crate::{
    element::{CornerH, CurveH},
    math,
};
use log::trace;
use ordered_float::OrderedFloat;
use std::collections::{BTreeMap, BTreeSet};

/// Default squared distance below which two points are the same corner.
pub const DEFAULT_SQUARED_TOLERANCE: f64 = 1e-7;

/// Decides when two end points of curve segments are the same corner.
///
/// A point is always compared against the canonical point of a corner,
/// i.e. the first point registered for it. Points that match several corners
/// are merged into the nearest one, and ties go to the oldest corner.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Equivalence {
    /// All coordinates are identical.
    Exact,
    /// All coordinates differ by at most the given value.
    Box(f64),
    /// The squared distance is strictly less than the given value.
    SquaredDistance(f64),
}

impl Default for Equivalence {
    fn default() -> Self {
        Equivalence::SquaredDistance(DEFAULT_SQUARED_TOLERANCE)
    }
}

impl Equivalence {
    pub fn matches<const DIM: usize>(&self, a: &[f64; DIM], b: &[f64; DIM]) -> bool {
        match self {
            Equivalence::Exact => a == b,
            Equivalence::Box(eps) => a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() <= *eps),
            Equivalence::SquaredDistance(eps2) => math::squared_distance(a, b) < *eps2,
        }
    }

    /// Largest difference along any single coordinate between two matching
    /// points.
    fn radius(&self) -> f64 {
        match self {
            Equivalence::Exact => 0.0,
            Equivalence::Box(eps) => *eps,
            Equivalence::SquaredDistance(eps2) => eps2.sqrt(),
        }
    }
}

type PointKey<const DIM: usize> = [OrderedFloat<f64>; DIM];

fn point_key<const DIM: usize>(p: &[f64; DIM]) -> PointKey<DIM> {
    p.map(OrderedFloat)
}

/// Canonical points of the corners, indexed for lookup by position.
pub(crate) struct CornerStore<const DIM: usize> {
    index: BTreeMap<PointKey<DIM>, CornerH>,
    points: BTreeMap<CornerH, [f64; DIM]>,
    incident: BTreeMap<CornerH, BTreeSet<CurveH>>,
    next: u32,
    equivalence: Equivalence,
}

impl<const DIM: usize> CornerStore<DIM> {
    pub fn new(equivalence: Equivalence) -> Self {
        CornerStore {
            index: BTreeMap::new(),
            points: BTreeMap::new(),
            incident: BTreeMap::new(),
            next: 1,
            equivalence,
        }
    }

    pub fn equivalence(&self) -> Equivalence {
        self.equivalence
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Live corners in the order of their indices.
    pub fn iter(&self) -> impl Iterator<Item = (CornerH, &[f64; DIM])> {
        self.points.iter().map(|(c, p)| (*c, p))
    }

    pub fn point(&self, c: CornerH) -> Option<&[f64; DIM]> {
        self.points.get(&c)
    }

    /// Curves whose end points were registered at this corner. This is kept
    /// for pruned corners too.
    pub fn incident_curves(&self, c: CornerH) -> Option<&BTreeSet<CurveH>> {
        self.incident.get(&c)
    }

    /// Find the live corner matching `p`.
    pub fn find(&self, p: &[f64; DIM]) -> Option<CornerH> {
        // Identical points always match, whatever the tolerance.
        if let Some(c) = self.index.get(&point_key(p)) {
            return Some(*c);
        }
        if let Equivalence::Exact = self.equivalence {
            return None;
        }
        let r = self.equivalence.radius();
        let (mut lo, mut hi) = (
            [OrderedFloat(f64::NEG_INFINITY); DIM],
            [OrderedFloat(f64::INFINITY); DIM],
        );
        match (lo.first_mut(), hi.first_mut(), p.first()) {
            (Some(lo), Some(hi), Some(x)) => {
                // Rounding of the bounds must not exclude a point that matches.
                let slack = (x.abs() + r) * f64::EPSILON;
                *lo = OrderedFloat(x - r - slack);
                *hi = OrderedFloat(x + r + slack);
            }
            // Zero dimensional points are all the same.
            _ => return self.index.values().next().copied(),
        }
        if lo > hi {
            return None;
        }
        self.index
            .range(lo..=hi)
            .filter_map(|(key, c)| {
                let q = key.map(|x| x.0);
                self.equivalence
                    .matches(p, &q)
                    .then(|| (math::squared_distance(p, &q), *c))
            })
            .min_by(|(da, ca), (db, cb)| da.total_cmp(db).then(ca.cmp(cb)))
            .map(|(_, c)| c)
    }

    /// Register the end point `p` of `curve` as a corner. Returns the corner
    /// `p` was merged into, and whether that corner was newly created.
    pub fn register(&mut self, p: &[f64; DIM], curve: CurveH) -> (CornerH, bool) {
        if let Some(c) = self.find(p) {
            trace!("End point of {curve} merged into {c}");
            self.incident.entry(c).or_default().insert(curve);
            return (c, false);
        }
        let c: CornerH = self.next.into();
        self.next += 1;
        self.index.insert(point_key(p), c);
        self.points.insert(c, *p);
        self.incident.entry(c).or_default().insert(curve);
        trace!("Created {c} at {p:?} for {curve}");
        (c, true)
    }

    /// Remove the corner from the store. Its index is never reused, and a
    /// point registered at the same location later becomes a new corner.
    pub fn prune(&mut self, c: CornerH) -> bool {
        match self.points.remove(&c) {
            Some(p) => {
                self.index.remove(&point_key(&p));
                true
            }
            None => false,
        }
    }
}

impl<const DIM: usize> Default for CornerStore<DIM> {
    fn default() -> Self {
        Self::new(Equivalence::default())
    }
}
