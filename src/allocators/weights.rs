//! Weighting helpers shared by the allocators.

/// Numerically stable softmax.
///
/// Subtracts the maximum score before exponentiating so large scores
/// cannot overflow. Returns an empty vector for empty input.
pub fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return vec![0.0; scores.len()];
    }

    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.iter().map(|e| e / sum).collect()
}

/// Min-max scaling into `[0, 1]`.
///
/// Missing values map to 0 and do not take part in the range. When every
/// present value is equal the scaled value is 0 for all.
pub fn min_max_normalize(values: &[Option<f64>]) -> Vec<f64> {
    let present = values.iter().flatten().copied();
    let (lo, hi) = present.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let range = hi - lo;

    values
        .iter()
        .map(|v| match v {
            Some(v) if range > 0.0 => (v - lo) / range,
            _ => 0.0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_softmax_sums_to_one() {
        let w = softmax(&[1.0, 2.0, 3.0]);
        let sum: f64 = w.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!(w[0] < w[1] && w[1] < w[2]);
    }

    #[test]
    fn test_softmax_uniform() {
        let w = softmax(&[4.0, 4.0, 4.0, 4.0]);
        for x in w {
            assert!((x - 0.25).abs() < 1e-12);
        }
    }

    #[test]
    fn test_softmax_large_scores_stable() {
        let w = softmax(&[1000.0, 999.0]);
        assert!(w.iter().all(|x| x.is_finite()));
        let expected = 1.0 / (1.0 + (-1.0f64).exp());
        assert!((w[0] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_softmax_empty() {
        assert!(softmax(&[]).is_empty());
    }

    #[test]
    fn test_min_max_basic() {
        let n = min_max_normalize(&[Some(1.0), Some(3.0), Some(5.0)]);
        assert_eq!(n, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_min_max_constant_is_zero() {
        let n = min_max_normalize(&[Some(2.0), Some(2.0)]);
        assert_eq!(n, vec![0.0, 0.0]);
    }

    #[test]
    fn test_min_max_missing_is_zero() {
        let n = min_max_normalize(&[Some(1.0), None, Some(3.0)]);
        assert_eq!(n, vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_min_max_all_missing() {
        let n = min_max_normalize(&[None, None]);
        assert_eq!(n, vec![0.0, 0.0]);
    }
}
