use crate::{
    adaptor::{FloatScalarAdaptor, coords, from_coords},
    corners::{CornerStore, Equivalence},
    curve::CurveSegment,
    element::{CornerH, CurveH, Index, PatchH},
    error::Error,
};
use log::{debug, trace};
use std::{
    collections::{BTreeMap, BTreeSet},
    marker::PhantomData,
};

/// A curve segment added as a feature, along with the corners its end points
/// were merged into.
///
/// The corners recorded here are the resolved positions of the end points. The
/// curve itself is never moved to match them.
pub(crate) struct CurveRecord<'a, C> {
    pub curve: &'a C,
    pub first: CornerH,
    pub last: CornerH,
    pub cycle: bool,
}

/// End point of a curve segment as reported by
/// [`FeatureRegistry::get_curve_segments`]: the curve parameter, and the corner
/// at that parameter. End points of cycles are reported as the curve itself.
pub type CurveEnd = (f64, Index);

/// Registry of the sharp features of a mesh domain.
///
/// Features are curve segments owned by the caller. Their end points are
/// merged into corners, with the [`Equivalence`] chosen at construction.
/// After every batch of curves is added, the registry derives which surface
/// patches are incident on every corner, and prunes the corners that only
/// exist because a closed curve has end points.
///
/// ```text
///         c1 ---------- k1 ----------- c2
///          \                          /
///           \                        /
///            k3                    k2
///              \                  /
///               \                /
///                ------ c3 ------
/// ```
///
/// Corners and curves are numbered from 1, in the order they are added, and
/// indices are never reused. The registry is a plain value: adding features
/// needs exclusive access, and queries only need shared access.
pub struct FeatureRegistry<'a, const DIM: usize, A, C>
where
    A: FloatScalarAdaptor<DIM>,
    C: CurveSegment<DIM, A>,
{
    corners: CornerStore<DIM>,
    curves: BTreeMap<CurveH, CurveRecord<'a, C>>,
    next_curve: u32,
    curve_incidences: BTreeMap<CurveH, BTreeSet<PatchH>>,
    corner_incidences: BTreeMap<CornerH, BTreeSet<PatchH>>,
    corner_params: BTreeMap<(CornerH, CurveH), f64>,
    context_incidences: BTreeMap<CornerH, BTreeSet<PatchH>>,
    _phantom: PhantomData<A>,
}

impl<'a, const DIM: usize, A, C> Default for FeatureRegistry<'a, DIM, A, C>
where
    A: FloatScalarAdaptor<DIM>,
    C: CurveSegment<DIM, A>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const DIM: usize, A, C> FeatureRegistry<'a, DIM, A, C>
where
    A: FloatScalarAdaptor<DIM>,
    C: CurveSegment<DIM, A>,
{
    /// Create an empty registry that merges end points closer than the default
    /// tolerance.
    pub fn new() -> Self {
        Self::with_equivalence(Equivalence::default())
    }

    pub fn with_equivalence(equivalence: Equivalence) -> Self {
        FeatureRegistry {
            corners: CornerStore::new(equivalence),
            curves: BTreeMap::new(),
            next_curve: 1,
            curve_incidences: BTreeMap::new(),
            corner_incidences: BTreeMap::new(),
            corner_params: BTreeMap::new(),
            context_incidences: BTreeMap::new(),
            _phantom: PhantomData,
        }
    }

    pub fn equivalence(&self) -> Equivalence {
        self.corners.equivalence()
    }

    pub fn num_corners(&self) -> usize {
        self.corners.len()
    }

    pub fn num_curves(&self) -> usize {
        self.curves.len()
    }

    /// Iterator over the indices of all curve segments.
    pub fn curves(&self) -> impl Iterator<Item = CurveH> {
        self.curves.keys().copied()
    }

    /// Iterator over the indices of all live corners.
    pub fn corners(&self) -> impl Iterator<Item = CornerH> {
        self.corners.iter().map(|(c, _)| c)
    }

    pub(crate) fn record(&self, curve: CurveH) -> Result<&CurveRecord<'a, C>, Error> {
        self.curves.get(&curve).ok_or(Error::InvalidCurve(curve))
    }

    /// Register a single curve segment, without updating the incidences of
    /// the corners.
    fn insert_curve(&mut self, curve: &'a C) -> Result<CurveH, Error> {
        let id: CurveH = self.next_curve.into();
        if curve.num_control_points() == 0 {
            return Err(Error::DegenerateCurve(id));
        }
        self.next_curve += 1;
        let first = coords::<DIM, A>(&curve.control_point(0));
        let last = coords::<DIM, A>(&curve.control_point(curve.degree()));
        let cycle = first == last;
        let (t0, t1) = curve.domain();
        let (c0, _) = self.corners.register(&first, id);
        let (c1, _) = self.corners.register(&last, id);
        // The first parameter wins when both end points are the same corner.
        self.corner_params.entry((c0, id)).or_insert(t0);
        self.corner_params.entry((c1, id)).or_insert(t1);
        self.curves.insert(
            id,
            CurveRecord {
                curve,
                first: c0,
                last: c1,
                cycle,
            },
        );
        self.curve_incidences.entry(id).or_default();
        trace!("Added {id} from {c0} to {c1}, cycle: {cycle}");
        Ok(id)
    }

    /// Add curve segments that are not associated with any surface patches.
    ///
    /// Returns the indices of the new curves, in the order of `curves`. If a
    /// curve cannot be added, the curves before it stay in the registry and
    /// the error is returned.
    ///
    /// ```rust
    /// use crease::{Index, use_glam::{PolylineF64, PolylineRegistryF64}};
    ///
    /// let a = PolylineF64::new(vec![glam::dvec3(0.0, 0.0, 0.0), glam::dvec3(1.0, 0.0, 0.0)]);
    /// // Starts close enough to the end of `a` to share its corner.
    /// let b = PolylineF64::new(vec![glam::dvec3(1.0, 1e-5, 0.0), glam::dvec3(1.0, 1.0, 0.0)]);
    /// let mut reg = PolylineRegistryF64::new();
    /// let ids = reg.add_features([&a, &b]).expect("Cannot add features");
    /// assert_eq!(reg.num_corners(), 3);
    /// let segments = reg.get_curve_segments();
    /// assert_eq!(segments[0].2, (1.0, Index::Corner(2.into())));
    /// assert_eq!(segments[1].1, (0.0, Index::Corner(2.into())));
    /// assert_eq!(
    ///     reg.get_corner_incident_curves(2.into())
    ///         .expect("Cannot get incident curves")
    ///         .len(),
    ///     ids.len()
    /// );
    /// ```
    pub fn add_features<I>(&mut self, curves: I) -> Result<Vec<CurveH>, Error>
    where
        I: IntoIterator<Item = &'a C>,
    {
        let added = curves
            .into_iter()
            .map(|curve| self.insert_curve(curve))
            .collect::<Result<Vec<_>, Error>>();
        self.compute_corner_incidences();
        let added = added?;
        debug!(
            "Added {} curves, {} corners, {} curves total",
            added.len(),
            self.num_corners(),
            self.num_curves()
        );
        Ok(added)
    }

    /// Add curve segments along with the surface patches adjacent to each of
    /// them.
    pub fn add_features_with_context<I, P>(&mut self, features: I) -> Result<Vec<CurveH>, Error>
    where
        I: IntoIterator<Item = (&'a C, P)>,
        P: IntoIterator<Item = PatchH>,
    {
        let added = features
            .into_iter()
            .map(|(curve, patches)| self.insert_curve_with_context(curve, patches))
            .collect::<Result<Vec<_>, Error>>();
        self.compute_corner_incidences();
        let added = added?;
        debug!(
            "Added {} curves with context, {} corners, {} curves total",
            added.len(),
            self.num_corners(),
            self.num_curves()
        );
        Ok(added)
    }

    fn insert_curve_with_context<P>(&mut self, curve: &'a C, patches: P) -> Result<CurveH, Error>
    where
        P: IntoIterator<Item = PatchH>,
    {
        let id = self.insert_curve(curve)?;
        let patches: BTreeSet<PatchH> = patches.into_iter().collect();
        let (first, last) = {
            let rec = self.record(id)?;
            (rec.first, rec.last)
        };
        for c in [first, last] {
            self.context_incidences
                .entry(c)
                .or_default()
                .extend(patches.iter().copied());
        }
        self.curve_incidences.insert(id, patches);
        Ok(id)
    }

    /// Prune the corners of isolated cycles, and derive the surface patches
    /// incident on the remaining corners from the curves incident on them.
    fn compute_corner_incidences(&mut self) {
        self.corner_incidences.clear();
        let mut pruned = Vec::new();
        for (c, _) in self.corners.iter() {
            let Some(curves) = self.corners.incident_curves(c) else {
                continue;
            };
            let lone_cycle = curves.len() == 1
                && curves
                    .first()
                    .and_then(|k| self.curves.get(k))
                    .is_some_and(|rec| rec.cycle);
            if lone_cycle {
                pruned.push(c);
                continue;
            }
            let incidences: BTreeSet<PatchH> = curves
                .iter()
                .filter_map(|k| self.curve_incidences.get(k))
                .flatten()
                .copied()
                .collect();
            self.corner_incidences.insert(c, incidences);
        }
        for c in pruned {
            debug!("Pruned {c}, the only curve incident on it is a cycle");
            self.corners.prune(c);
            self.context_incidences.remove(&c);
        }
    }

    /// All live corners with their positions, in the order of their indices.
    pub fn get_corners(&self) -> Vec<(CornerH, A::Vector)> {
        self.corners
            .iter()
            .map(|(c, p)| (c, from_coords::<DIM, A>(*p)))
            .collect()
    }

    /// All curve segments with their end points, in the order of their
    /// indices.
    pub fn get_curve_segments(&self) -> Vec<(CurveH, CurveEnd, CurveEnd)> {
        self.curves
            .iter()
            .map(|(k, rec)| {
                let (t0, t1) = rec.curve.domain();
                if rec.cycle {
                    (*k, (t0, Index::Curve(*k)), (t1, Index::Curve(*k)))
                } else {
                    (
                        *k,
                        (t0, Index::Corner(rec.first)),
                        (t1, Index::Corner(rec.last)),
                    )
                }
            })
            .collect()
    }

    /// The surface patches adjacent to the curve.
    pub fn get_incidences(&self, curve: CurveH) -> Result<&BTreeSet<PatchH>, Error> {
        self.curve_incidences
            .get(&curve)
            .ok_or(Error::InvalidCurve(curve))
    }

    /// The surface patches incident on the corner, i.e. the union of the
    /// patches of all curves incident on it.
    pub fn get_corner_incidences(&self, corner: CornerH) -> Result<&BTreeSet<PatchH>, Error> {
        self.corner_incidences
            .get(&corner)
            .ok_or(Error::InvalidCorner(corner))
    }

    /// The curve segments whose end points were merged into the corner.
    pub fn get_corner_incident_curves(&self, corner: CornerH) -> Result<&BTreeSet<CurveH>, Error> {
        match self.corners.point(corner) {
            Some(_) => self
                .corners
                .incident_curves(corner)
                .ok_or(Error::InvalidCorner(corner)),
            None => Err(Error::InvalidCorner(corner)),
        }
    }

    /// Surface patches passed along with the curves incident on each corner,
    /// when the curves were added with context.
    pub fn corners_incidence_map(&self) -> &BTreeMap<CornerH, BTreeSet<PatchH>> {
        &self.context_incidences
    }

    pub fn corner_point_from_index(&self, corner: CornerH) -> Result<A::Vector, Error> {
        self.corners
            .point(corner)
            .map(|p| from_coords::<DIM, A>(*p))
            .ok_or(Error::InvalidCorner(corner))
    }

    /// Index of the corner at the point `p`.
    pub fn point_corner_index(&self, p: &A::Vector) -> Result<Index, Error> {
        self.corners
            .find(&coords::<DIM, A>(p))
            .map(Index::Corner)
            .ok_or(Error::CornerNotFound)
    }

    /// Parameter of the corner on the curve.
    pub fn corner_parameter_on_curve(&self, corner: CornerH, curve: CurveH) -> Result<f64, Error> {
        self.record(curve)?;
        self.corner_params
            .get(&(corner, curve))
            .copied()
            .ok_or(Error::InvalidCorner(corner))
    }

    /// Largest curve index, or `None` if the registry is empty.
    pub fn maximal_curve_segment_index(&self) -> Option<CurveH> {
        self.curves.keys().next_back().copied()
    }

    pub fn index_from_corner_index(&self, corner: CornerH) -> Index {
        Index::Corner(corner)
    }

    pub fn index_from_curve_segment_index(&self, curve: CurveH) -> Index {
        Index::Curve(curve)
    }

    pub fn corner_index(&self, index: Index) -> Result<CornerH, Error> {
        index.corner()
    }

    pub fn curve_segment_index(&self, index: Index) -> Result<CurveH, Error> {
        index.curve()
    }
}

#[cfg(test)]
pub(crate) mod test {
    use crate::{
        CornerH, CurveH, Equivalence, Error, Handle, Index, PatchH,
        polyline::test::unit_square,
        use_glam::{PolylineF64, PolylineRegistryF64},
    };
    use std::collections::BTreeSet;

    fn segment(a: glam::DVec3, b: glam::DVec3) -> PolylineF64 {
        PolylineF64::new(vec![a, (a + b) * 0.5, b])
    }

    /// Three open curves forming a triangle. The end points of consecutive
    /// curves are slightly apart, but within the default tolerance.
    pub(crate) fn triangle() -> Vec<PolylineF64> {
        let a = glam::dvec3(0.0, 0.0, 0.0);
        let b = glam::dvec3(1.0, 0.0, 0.0);
        let c = glam::dvec3(0.0, 1.0, 0.0);
        let jitter = glam::dvec3(1e-5, -1e-5, 0.0);
        vec![
            segment(a, b),
            segment(b + jitter, c),
            segment(c - jitter, a + jitter),
        ]
    }

    fn patches(ids: &[u32]) -> BTreeSet<PatchH> {
        ids.iter().map(PatchH::from).collect()
    }

    #[test]
    fn t_triangle() {
        let curves = triangle();
        let mut reg = PolylineRegistryF64::new();
        let ids = reg.add_features(&curves).expect("Cannot add features");
        assert_eq!(
            ids.iter().map(|k| k.index()).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(reg.num_corners(), 3);
        assert_eq!(reg.num_curves(), 3);
        let corners = reg.get_corners();
        assert_eq!(
            corners.iter().map(|(c, _)| c.index()).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        // Canonical points are the first registered end points.
        assert_eq!(corners[1].1, glam::dvec3(1.0, 0.0, 0.0));
        for (c, _) in &corners {
            assert_eq!(
                reg.get_corner_incident_curves(*c)
                    .expect("Cannot get incident curves")
                    .len(),
                2
            );
            assert!(
                reg.get_corner_incidences(*c)
                    .expect("Cannot get corner incidences")
                    .is_empty()
            );
        }
        let corner = |i: u32| Index::Corner(i.into());
        assert_eq!(
            reg.get_curve_segments(),
            vec![
                (CurveH::from(1), (0.0, corner(1)), (1.0, corner(2))),
                (CurveH::from(2), (0.0, corner(2)), (1.0, corner(3))),
                (CurveH::from(3), (0.0, corner(3)), (1.0, corner(1))),
            ]
        );
        assert_eq!(reg.maximal_curve_segment_index(), Some(CurveH::from(3)));
    }

    #[test]
    fn t_lone_cycle_is_pruned() {
        let square = unit_square();
        let mut reg = PolylineRegistryF64::new();
        let ids = reg
            .add_features([&square])
            .expect("Cannot add a closed curve");
        let k = ids[0];
        assert!(reg.is_cycle(k).expect("Cannot check cycle"));
        assert!(reg.get_corners().is_empty());
        assert_eq!(
            reg.get_curve_segments(),
            vec![(k, (0.0, Index::Curve(k)), (1.0, Index::Curve(k)))]
        );
        // The pruned corner cannot be queried.
        let pruned = CornerH::from(1);
        assert!(matches!(
            reg.get_corner_incidences(pruned),
            Err(Error::InvalidCorner(_))
        ));
        assert!(matches!(
            reg.get_corner_incident_curves(pruned),
            Err(Error::InvalidCorner(_))
        ));
        assert!(matches!(
            reg.corner_point_from_index(pruned),
            Err(Error::InvalidCorner(_))
        ));
        assert!(matches!(
            reg.point_corner_index(&glam::DVec3::ZERO),
            Err(Error::CornerNotFound)
        ));
    }

    #[test]
    fn t_cycle_with_open_curve_keeps_corner() {
        let square = unit_square();
        let spoke = segment(glam::dvec3(0.0, 0.0, 0.0), glam::dvec3(0.0, 0.0, 1.0));
        let mut reg = PolylineRegistryF64::new();
        reg.add_features([&square, &spoke])
            .expect("Cannot add features");
        assert_eq!(
            reg.get_corners(),
            vec![
                (CornerH::from(1), glam::dvec3(0.0, 0.0, 0.0)),
                (CornerH::from(2), glam::dvec3(0.0, 0.0, 1.0)),
            ]
        );
        assert_eq!(
            reg.get_corner_incident_curves(1.into())
                .expect("Cannot get incident curves")
                .iter()
                .map(|k| k.index())
                .collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[test]
    fn t_incidence_closure() {
        let curves = triangle();
        let mut reg = PolylineRegistryF64::new();
        reg.add_features_with_context([
            (&curves[0], vec![PatchH::from(1), PatchH::from(2)]),
            (&curves[1], vec![PatchH::from(2), PatchH::from(3)]),
            (&curves[2], vec![PatchH::from(4)]),
        ])
        .expect("Cannot add features with context");
        for (c, _) in reg.get_corners() {
            let expected: BTreeSet<PatchH> = reg
                .get_corner_incident_curves(c)
                .expect("Cannot get incident curves")
                .iter()
                .flat_map(|k| {
                    reg.get_incidences(*k)
                        .expect("Cannot get curve incidences")
                        .iter()
                        .copied()
                })
                .collect();
            assert_eq!(
                reg.get_corner_incidences(c)
                    .expect("Cannot get corner incidences"),
                &expected
            );
        }
        assert_eq!(
            reg.get_corner_incidences(1.into())
                .expect("Cannot get corner incidences"),
            &patches(&[1, 2, 4])
        );
        assert_eq!(
            reg.get_corner_incidences(2.into())
                .expect("Cannot get corner incidences"),
            &patches(&[1, 2, 3])
        );
        assert_eq!(
            reg.corners_incidence_map().get(&CornerH::from(3)),
            Some(&patches(&[2, 3, 4]))
        );
    }

    #[test]
    fn t_indices_across_batches() {
        let curves = triangle();
        let far = segment(glam::dvec3(5.0, 5.0, 5.0), glam::dvec3(6.0, 5.0, 5.0));
        let mut reg = PolylineRegistryF64::new();
        let first = reg
            .add_features(&curves[..2])
            .expect("Cannot add features");
        let second = reg
            .add_features([&far, &curves[2]])
            .expect("Cannot add features");
        assert_eq!(
            first
                .iter()
                .chain(second.iter())
                .map(|k| k.index())
                .collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        // Corners 1, 2, 3 come from the first batch, 4 and 5 from the far curve.
        assert_eq!(
            reg.corners().map(|c| c.index()).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5]
        );
        assert_eq!(
            reg.get_corner_incident_curves(1.into())
                .expect("Cannot get incident curves")
                .iter()
                .map(|k| k.index())
                .collect::<Vec<_>>(),
            vec![1, 4]
        );
    }

    #[test]
    fn t_degenerate_curve() {
        let curves = triangle();
        let empty = PolylineF64::new(Vec::new());
        let mut reg = PolylineRegistryF64::new();
        let result = reg.add_features([&curves[0], &empty, &curves[1]]);
        assert!(matches!(result, Err(Error::DegenerateCurve(k)) if k.index() == 2));
        // The curve before the failure stays, and its corners are finalized.
        assert_eq!(reg.num_curves(), 1);
        assert_eq!(reg.num_corners(), 2);
        assert!(reg.get_corner_incidences(1.into()).is_ok());
        // The index of the rejected curve is not consumed.
        let ids = reg
            .add_features([&curves[1]])
            .expect("Cannot add features");
        assert_eq!(ids, vec![CurveH::from(2)]);
    }

    #[test]
    fn t_corner_lookup() {
        let curves = triangle();
        let mut reg = PolylineRegistryF64::new();
        reg.add_features(&curves).expect("Cannot add features");
        assert_eq!(
            reg.point_corner_index(&glam::dvec3(1.0, 1e-4, 0.0))
                .expect("Cannot find corner"),
            Index::Corner(2.into())
        );
        assert_eq!(
            reg.corner_point_from_index(3.into())
                .expect("Cannot find corner point"),
            glam::dvec3(0.0, 1.0, 0.0)
        );
        assert_eq!(
            reg.corner_parameter_on_curve(2.into(), 1.into())
                .expect("Cannot find parameter"),
            1.0
        );
        assert_eq!(
            reg.corner_parameter_on_curve(2.into(), 2.into())
                .expect("Cannot find parameter"),
            0.0
        );
        assert!(matches!(
            reg.corner_parameter_on_curve(3.into(), 1.into()),
            Err(Error::InvalidCorner(_))
        ));
        assert!(matches!(
            reg.corner_parameter_on_curve(1.into(), 9.into()),
            Err(Error::InvalidCurve(_))
        ));
        assert!(matches!(
            reg.get_incidences(9.into()),
            Err(Error::InvalidCurve(_))
        ));
    }

    #[test]
    fn t_exact_registry_splits_jittered_corners() {
        let curves = triangle();
        let mut reg = PolylineRegistryF64::with_equivalence(Equivalence::Exact);
        reg.add_features(&curves).expect("Cannot add features");
        assert_eq!(reg.equivalence(), Equivalence::Exact);
        assert_eq!(reg.num_corners(), 6);
        for c in reg.corners() {
            assert_eq!(
                reg.get_corner_incident_curves(c)
                    .expect("Cannot get incident curves")
                    .len(),
                1
            );
        }
    }

    #[test]
    fn t_index_translation() {
        let reg = PolylineRegistryF64::new();
        let c = CornerH::from(4);
        let k = CurveH::from(2);
        assert_eq!(
            reg.corner_index(reg.index_from_corner_index(c))
                .expect("Cannot translate index"),
            c
        );
        assert_eq!(
            reg.curve_segment_index(reg.index_from_curve_segment_index(k))
                .expect("Cannot translate index"),
            k
        );
        assert!(matches!(
            reg.corner_index(Index::Curve(k)),
            Err(Error::IndexMismatch { .. })
        ));
    }
}
