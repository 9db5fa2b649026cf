use crate::{
    adaptor::{FloatScalarAdaptor, coords},
    curve::CurveSegment,
    element::CurveH,
    error::Error,
    math::{self, Sign},
    registry::FeatureRegistry,
};
use log::debug;

impl<'a, const DIM: usize, A, C> FeatureRegistry<'a, DIM, A, C>
where
    A: FloatScalarAdaptor<DIM>,
    C: CurveSegment<DIM, A>,
{
    /// Check if the curve is closed.
    ///
    /// A curve is a cycle when its first and last control points are exactly
    /// the same. This does not use the tolerance of the corners: a curve whose
    /// end points were merged into one corner is not a cycle unless they are
    /// identical.
    pub fn is_cycle(&self, curve: CurveH) -> Result<bool, Error> {
        Ok(self.record(curve)?.cycle)
    }

    /// Same as [`Self::is_cycle`]. The point is not used.
    pub fn is_cycle_at(&self, _p: &A::Vector, curve: CurveH) -> Result<bool, Error> {
        self.is_cycle(curve)
    }

    /// Order of the parameters `p` and `q` along an open curve.
    ///
    /// This is `Positive` if `p < q`, `Zero` if they are equal, and `Negative`
    /// otherwise.
    pub fn distance_sign(&self, p: f64, q: f64, curve: CurveH) -> Result<Sign, Error> {
        if self.is_cycle(curve)? {
            return Err(Error::UnexpectedCycle(curve));
        }
        Ok(match p.partial_cmp(&q) {
            Some(ord) => ord.reverse().into(),
            None => Sign::Negative,
        })
    }

    /// Orientation of the walk from `p` to `r` through `q` along the curve.
    ///
    /// On an open curve this is the sign of the distance from `p` to `r`. On a
    /// cycle, the walk is `Positive` if moving forward from `p` reaches `q`
    /// no later than `r`, and `Negative` otherwise. When `p == r` the walk is
    /// a complete loop, which is `Positive`.
    ///
    /// When `p == q` there is nothing to tell the direction of the walk, and
    /// this returns `Negative`. Picking the shorter of the two ways around the
    /// cycle is not implemented.
    ///
    /// ```rust
    /// use crease::{Sign, use_glam::{PolylineF64, PolylineRegistryF64}};
    ///
    /// let square = PolylineF64::new(vec![
    ///     glam::dvec3(0.0, 0.0, 0.0),
    ///     glam::dvec3(1.0, 0.0, 0.0),
    ///     glam::dvec3(1.0, 1.0, 0.0),
    ///     glam::dvec3(0.0, 1.0, 0.0),
    ///     glam::dvec3(0.0, 0.0, 0.0),
    /// ]);
    /// let mut reg = PolylineRegistryF64::new();
    /// let k = reg.add_features([&square]).expect("Cannot add features")[0];
    /// // Walking forward from 0.5 reaches 0.75 before wrapping around to 0.25.
    /// let sign = reg
    ///     .distance_sign_along_cycle(0.5, 0.75, 0.25, k)
    ///     .expect("Cannot compute sign");
    /// assert_eq!(sign, Sign::Positive);
    /// ```
    pub fn distance_sign_along_cycle(
        &self,
        p: f64,
        q: f64,
        r: f64,
        curve: CurveH,
    ) -> Result<Sign, Error> {
        let rec = self.record(curve)?;
        if !rec.cycle {
            return self.distance_sign(p, r, curve);
        }
        if p == r {
            return Ok(Sign::Positive);
        }
        if p == q {
            debug!("No direction to walk along {curve} from {p}, assuming negative");
            return Ok(Sign::Negative);
        }
        let pq = rec.curve.geodesic_distance(p, q);
        let pr = rec.curve.geodesic_distance(p, r);
        if !(pq > 0.0 && pr > 0.0) {
            return Err(Error::NonPositiveGeodesic(curve));
        }
        Ok(if pq <= pr {
            Sign::Positive
        } else {
            Sign::Negative
        })
    }

    /// Bound on the distance between the curve and the chord joining the
    /// points at parameters `p` and `q`.
    ///
    /// The curve is split at `p` and `q`, and the bound is computed from the
    /// control points of the middle piece.
    pub fn error_bound_cord_to_curve(&self, p: f64, q: f64, curve: CurveH) -> Result<f64, Error> {
        if !(p <= q) {
            return Err(Error::InvalidParameterRange(p, q));
        }
        let rec = self.record(curve)?;
        let pieces = rec.curve.split(&[p, q]);
        let middle = match pieces.as_slice() {
            [_, middle, _] => middle,
            _ => return Err(Error::SplitFailed(curve)),
        };
        let control: Vec<[f64; DIM]> = (0..middle.num_control_points())
            .map(|i| coords::<DIM, A>(&middle.control_point(i)))
            .collect();
        Ok(math::chord_error_bound(&control))
    }

    pub fn construct_point_on_curve_segment(
        &self,
        t: f64,
        curve: CurveH,
    ) -> Result<A::Vector, Error> {
        Ok(self.record(curve)?.curve.evaluate(t))
    }

    /// Evaluate the curve at `n` evenly spaced parameters across its domain,
    /// including both ends. Useful to inspect the curves that were added as
    /// features.
    pub fn sample_curve_segment(&self, curve: CurveH, n: usize) -> Result<Vec<A::Vector>, Error> {
        let rec = self.record(curve)?;
        let (t0, t1) = rec.curve.domain();
        Ok(match n {
            0 => Vec::new(),
            1 => vec![rec.curve.evaluate(t0)],
            _ => (0..n)
                .map(|i| {
                    let f = i as f64 / (n - 1) as f64;
                    rec.curve.evaluate(t0 + (t1 - t0) * f)
                })
                .collect(),
        })
    }
}
