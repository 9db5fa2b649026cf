use std::cmp::Ordering;

/// Sign of an oriented quantity, such as the distance between two parameters
/// along a curve.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Sign {
    Negative,
    Zero,
    Positive,
}

impl From<Ordering> for Sign {
    fn from(ord: Ordering) -> Self {
        match ord {
            Ordering::Less => Sign::Negative,
            Ordering::Equal => Sign::Zero,
            Ordering::Greater => Sign::Positive,
        }
    }
}

pub(crate) fn squared_distance<const DIM: usize>(a: &[f64; DIM], b: &[f64; DIM]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

pub(crate) fn distance<const DIM: usize>(a: &[f64; DIM], b: &[f64; DIM]) -> f64 {
    squared_distance(a, b).sqrt()
}

pub(crate) fn lerp<const DIM: usize>(a: &[f64; DIM], b: &[f64; DIM], t: f64) -> [f64; DIM] {
    std::array::from_fn(|i| a[i] + (b[i] - a[i]) * t)
}

/// Distance from `p` to the segment from `a` to `b`.
pub(crate) fn segment_distance<const DIM: usize>(
    p: &[f64; DIM],
    a: &[f64; DIM],
    b: &[f64; DIM],
) -> f64 {
    let (num, den) = (0..DIM).fold((0.0, 0.0), |(num, den), i| {
        let ab = b[i] - a[i];
        (num + (p[i] - a[i]) * ab, den + ab * ab)
    });
    // Degenerate segment.
    let t = if den > 0.0 {
        (num / den).clamp(0.0, 1.0)
    } else {
        0.0
    };
    distance(p, &lerp(a, b, t))
}

/// Upper bound on the distance between a curve and the chord joining its end
/// points, computed from the control polygon of the curve.
///
/// The curve lies inside the convex hull of its control points, so the
/// farthest control point from the chord bounds the error of replacing the
/// curve with that chord.
pub(crate) fn chord_error_bound<const DIM: usize>(control: &[[f64; DIM]]) -> f64 {
    match (control.first(), control.last()) {
        (Some(a), Some(b)) => control
            .iter()
            .map(|p| segment_distance(p, a, b))
            .fold(0.0, f64::max),
        _ => 0.0,
    }
}

#[cfg(test)]
mod test {
    use super::{Sign, chord_error_bound, segment_distance};
    use std::cmp::Ordering;

    #[test]
    fn t_sign_from_ordering() {
        assert_eq!(Sign::from(1.0f64.total_cmp(&2.0)), Sign::Negative);
        assert_eq!(Sign::from(Ordering::Equal), Sign::Zero);
        assert_eq!(Sign::from(Ordering::Greater), Sign::Positive);
    }

    #[test]
    fn t_segment_distance() {
        let a = [0.0, 0.0, 0.0];
        let b = [2.0, 0.0, 0.0];
        assert!((segment_distance(&[1.0, 1.0, 0.0], &a, &b) - 1.0).abs() < 1e-12);
        // Beyond the end of the segment.
        assert!((segment_distance(&[3.0, 0.0, 0.0], &a, &b) - 1.0).abs() < 1e-12);
        // Degenerate segment.
        assert!((segment_distance(&[0.0, 3.0, 4.0], &a, &a) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn t_chord_error_bound() {
        assert_eq!(chord_error_bound::<3>(&[]), 0.0);
        assert_eq!(
            chord_error_bound(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]),
            0.0
        );
        let bound = chord_error_bound(&[
            [0.0, 0.0, 0.0],
            [0.5, 0.25, 0.0],
            [1.0, 1.0, 0.0],
            [2.0, 0.0, 0.0],
        ]);
        assert!((bound - 1.0).abs() < 1e-12);
    }
}
