use crate::adaptor::Adaptor;

/// Parametric curve segment owned by the caller.
///
/// The registry only borrows curves. It reads their end points when they are
/// added as features, and evaluates them when answering parameterization
/// queries. It never modifies them.
pub trait CurveSegment<const DIM: usize, A>: Sized
where
    A: Adaptor<DIM>,
{
    fn num_control_points(&self) -> usize;

    fn control_point(&self, i: usize) -> A::Vector;

    /// Index of the last control point.
    fn degree(&self) -> usize {
        self.num_control_points().saturating_sub(1)
    }

    /// Parameters of the first and last end points of the curve.
    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn evaluate(&self, t: f64) -> A::Vector;

    /// Split the curve at the given non decreasing parameters. A successful
    /// split returns `params.len() + 1` pieces, in order.
    fn split(&self, params: &[f64]) -> Vec<Self>;

    /// Length of the curve from parameter `p` to parameter `q`, walking
    /// forward. On a closed curve this wraps around the end.
    fn geodesic_distance(&self, p: f64, q: f64) -> f64;
}
