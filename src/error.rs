use crate::element::{CornerH, CurveH};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Handles.
    #[error("{0} is not a registered curve segment")]
    InvalidCurve(CurveH),
    #[error("{0} is not a live corner")]
    InvalidCorner(CornerH),
    #[error("no corner matches the given point")]
    CornerNotFound,
    #[error("expected a {expected} index, found a {found} index")]
    IndexMismatch {
        expected: &'static str,
        found: &'static str,
    },
    // Curve parameterization.
    /// The query is only defined for open curves.
    #[error("{0} is a cycle")]
    UnexpectedCycle(CurveH),
    /// Forward geodesic distances along a cycle must be strictly positive.
    #[error("non positive geodesic distance along {0}")]
    NonPositiveGeodesic(CurveH),
    #[error("invalid parameter range [{0}, {1}]")]
    InvalidParameterRange(f64, f64),
    #[error("splitting {0} did not produce the expected pieces")]
    SplitFailed(CurveH),
    // Ingestion.
    #[error("{0} has no control points")]
    DegenerateCurve(CurveH),
}
