use crate::{
    adaptor::{FloatScalarAdaptor, coords, from_coords},
    curve::CurveSegment,
    math,
};
use std::{iter::once, marker::PhantomData};

/// Piecewise linear curve, parameterized uniformly over its segments in
/// `[0, 1]`.
///
/// A polyline whose first and last points are identical is closed, and
/// geodesic distances measured along it wrap around.
pub struct Polyline<const DIM: usize, A>
where
    A: FloatScalarAdaptor<DIM>,
{
    points: Vec<A::Vector>,
    _phantom: PhantomData<A>,
}

impl<const DIM: usize, A> Clone for Polyline<DIM, A>
where
    A: FloatScalarAdaptor<DIM>,
{
    fn clone(&self) -> Self {
        Polyline {
            points: self.points.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<const DIM: usize, A> Polyline<DIM, A>
where
    A: FloatScalarAdaptor<DIM>,
{
    pub fn new(points: Vec<A::Vector>) -> Self {
        Polyline {
            points,
            _phantom: PhantomData,
        }
    }

    pub fn points(&self) -> &[A::Vector] {
        &self.points
    }

    pub fn num_segments(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    pub fn is_closed(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(a), Some(b)) if self.points.len() > 1 => {
                coords::<DIM, A>(a) == coords::<DIM, A>(b)
            }
            _ => false,
        }
    }

    fn segment_length(&self, i: usize) -> f64 {
        math::distance(
            &coords::<DIM, A>(&self.points[i]),
            &coords::<DIM, A>(&self.points[i + 1]),
        )
    }

    /// Total length of all segments.
    pub fn length(&self) -> f64 {
        (0..self.num_segments()).map(|i| self.segment_length(i)).sum()
    }

    /// Segment containing the parameter `t`, and the local parameter within
    /// that segment.
    fn locate(&self, t: f64) -> (usize, f64) {
        let m = self.num_segments();
        if m == 0 {
            return (0, 0.0);
        }
        let s = t.clamp(0.0, 1.0) * m as f64;
        let i = (s.floor() as usize).min(m - 1);
        (i, s - i as f64)
    }

    /// Length of the polyline from the start to the parameter `t`.
    pub fn arc_length(&self, t: f64) -> f64 {
        if self.num_segments() == 0 {
            return 0.0;
        }
        let (i, f) = self.locate(t);
        (0..i).map(|j| self.segment_length(j)).sum::<f64>() + f * self.segment_length(i)
    }

    fn vertex_parameter(&self, k: usize) -> f64 {
        k as f64 / self.num_segments() as f64
    }
}

impl<const DIM: usize, A> CurveSegment<DIM, A> for Polyline<DIM, A>
where
    A: FloatScalarAdaptor<DIM>,
{
    fn num_control_points(&self) -> usize {
        self.points.len()
    }

    fn control_point(&self, i: usize) -> A::Vector {
        self.points[i]
    }

    fn evaluate(&self, t: f64) -> A::Vector {
        match self.points.len() {
            0 => A::zero_vector(),
            1 => self.points[0],
            _ => {
                let (i, f) = self.locate(t);
                from_coords::<DIM, A>(math::lerp(
                    &coords::<DIM, A>(&self.points[i]),
                    &coords::<DIM, A>(&self.points[i + 1]),
                    f,
                ))
            }
        }
    }

    fn split(&self, params: &[f64]) -> Vec<Self> {
        if self.points.is_empty() || params.windows(2).any(|w| !(w[0] <= w[1])) {
            return Vec::new();
        }
        let cuts: Vec<f64> = once(0.0)
            .chain(params.iter().map(|t| t.clamp(0.0, 1.0)))
            .chain(once(1.0))
            .collect();
        if cuts.iter().any(|t| t.is_nan()) {
            return Vec::new();
        }
        let m = self.num_segments();
        cuts.windows(2)
            .map(|w| {
                let (a, b) = (w[0], w[1]);
                let mut points = Vec::with_capacity(m + 1);
                points.push(self.evaluate(a));
                points.extend((1..m).filter_map(|k| {
                    let tk = self.vertex_parameter(k);
                    (tk > a && tk < b).then_some(self.points[k])
                }));
                points.push(self.evaluate(b));
                Polyline::new(points)
            })
            .collect()
    }

    fn geodesic_distance(&self, p: f64, q: f64) -> f64 {
        let d = self.arc_length(q) - self.arc_length(p);
        if d < 0.0 && self.is_closed() {
            d + self.length()
        } else {
            d
        }
    }
}
