/// Tells the registry how to work with the geometric types of the caller.
///
/// `DIM` is the number of coordinates of a point, usually 3.
pub trait Adaptor<const DIM: usize> {
    type Vector: Clone + Copy;
    type Scalar: Clone + Copy;

    fn vector(coords: [Self::Scalar; DIM]) -> Self::Vector;

    fn zero_vector() -> Self::Vector;

    fn vector_coord(v: &Self::Vector, i: usize) -> Self::Scalar;
}

/// Conversions between the scalar type and `f64`.
///
/// Tolerances, curve parameters and distances are computed in `f64`.
pub trait FloatScalarAdaptor<const DIM: usize>: Adaptor<DIM> {
    fn scalarf64(val: f64) -> Self::Scalar;

    fn to_f64(val: Self::Scalar) -> f64;
}

/// Coordinates of `v` as `f64`.
pub(crate) fn coords<const DIM: usize, A>(v: &A::Vector) -> [f64; DIM]
where
    A: FloatScalarAdaptor<DIM>,
{
    std::array::from_fn(|i| A::to_f64(A::vector_coord(v, i)))
}

/// Vector with the given `f64` coordinates.
pub(crate) fn from_coords<const DIM: usize, A>(c: [f64; DIM]) -> A::Vector
where
    A: FloatScalarAdaptor<DIM>,
{
    A::vector(c.map(A::scalarf64))
}
