/*!
This crate keeps track of the sharp features of a mesh domain: the curve
segments a mesh generator must preserve, and the corners where those curves
meet.

# Overview

+ Curve segments are owned by the caller, and only borrowed by the
  [`FeatureRegistry`]. Any parametric curve can be used by implementing
  [`CurveSegment`] for it. A piecewise linear [`Polyline`] is provided.

+ The end points of the curves are merged into corners. When two end points
  are considered the same corner is decided by an [`Equivalence`], which
  defaults to a squared distance tolerance of
  [`DEFAULT_SQUARED_TOLERANCE`].

+ Curves can be added along with the surface patches adjacent to them. The
  registry then derives the patches incident on every corner.

+ A curve whose first and last points are identical is a cycle. A cycle that
  does not touch any other curve has no corner.

+ Refinement code can query the order of parameters along a curve, including
  along cycles, and bound the error of approximating a piece of a curve with
  a straight chord. See [`FeatureRegistry::distance_sign_along_cycle`] and
  [`FeatureRegistry::error_bound_cord_to_curve`].

+ The generic [`FeatureRegistry<DIM, A, C>`] works with custom geometric
  types through an [`Adaptor`]. Built-in adaptors that use the
  [`glam`](https://crates.io/crates/glam) crate can be found in the
  [`use_glam`] module, which requires the `use_glam` feature.

Diagnostics are written through the [`log`](https://crates.io/crates/log)
facade. Nothing is logged unless the application installs a logger.
*/

mod adaptor;
mod corners;
mod curve;
mod element;
mod error;
mod math;
mod oracle;
mod polyline;
mod registry;

#[cfg(feature = "use_glam")]
pub mod use_glam;

pub use adaptor::{Adaptor, FloatScalarAdaptor};
pub use corners::{DEFAULT_SQUARED_TOLERANCE, Equivalence};
pub use curve::CurveSegment;
pub use element::{CornerH, CurveH, Handle, Index, PatchH};
pub use error::Error;
pub use math::Sign;
pub use polyline::Polyline;
pub use registry::{CurveEnd, FeatureRegistry};
