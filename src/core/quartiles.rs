use crate::models::RentRangeEstimate;

/// Derive a robust rent range from a sample of observed rents
///
/// An empty sample yields the all-zero estimate and a single observation
/// yields a flat range; neither is an error. With two or more observations
/// the quartiles use the exclusive linear-interpolation method (positions
/// scaled by n+1, clamped at the extremes), which extrapolates beyond the
/// observed values for small samples instead of only interpolating between
/// them. The recommended bounds are Q1 and Q3 directly.
pub fn estimate_range(rents: &[f64]) -> RentRangeEstimate {
    if rents.is_empty() {
        return RentRangeEstimate::zero();
    }

    let mut sorted = rents.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    if sorted.len() == 1 {
        let value = sorted[0];
        return RentRangeEstimate {
            q1: value,
            median: value,
            q3: value,
            iqr: 0.0,
            recommended_min: value,
            recommended_max: value,
        };
    }

    let median = median_sorted(&sorted);
    let q1 = quartile_exclusive(&sorted, 1);
    let q3 = quartile_exclusive(&sorted, 3);
    let iqr = q3 - q1;

    RentRangeEstimate {
        q1,
        median,
        q3,
        iqr,
        recommended_min: q1,
        recommended_max: q3,
    }
}

/// Median of an already sorted sample, averaging the two middle elements
/// for even counts
#[inline]
fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    let mid = n / 2;
    if n % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// The i-th quartile (i in 1..=3) of a sorted sample with at least two
/// elements, exclusive method
///
/// The cut position is i*(n+1)/4; its integer part indexes the sample and
/// is clamped to the interior so the first and last gaps extrapolate. The
/// fractional remainder is kept in integer arithmetic and may be negative
/// after clamping, which is what produces values below the minimum or
/// above the maximum for very small samples.
#[inline]
fn quartile_exclusive(sorted: &[f64], i: i64) -> f64 {
    const N: i64 = 4;
    let ld = sorted.len() as i64;
    let m = ld + 1;

    let mut j = i * m / N;
    if j < 1 {
        j = 1;
    } else if j > ld - 1 {
        j = ld - 1;
    }
    let delta = (i * m - j * N) as f64;

    (sorted[(j - 1) as usize] * (N as f64 - delta) + sorted[j as usize] * delta) / N as f64
}
