//! Differencing and integration for the I(d) part of ARIMA.

/// Difference `series` `d` times.
///
/// Stops early if the series runs out of points.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut out = series.to_vec();
    for _ in 0..d {
        if out.len() <= 1 {
            break;
        }
        out = out.windows(2).map(|w| w[1] - w[0]).collect();
    }
    out
}

/// Undo `d` rounds of differencing for values that continue `original`.
///
/// Each level is rebuilt by a cumulative sum starting from the last value of
/// `original` differenced to that level.
pub fn integrate(differenced: &[f64], original: &[f64], d: usize) -> Vec<f64> {
    let mut out = differenced.to_vec();
    for level in (0..d).rev() {
        let anchor = difference(original, level).last().copied().unwrap_or(0.0);
        out = out
            .iter()
            .scan(anchor, |acc, step| {
                *acc += step;
                Some(*acc)
            })
            .collect();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn difference_order_0_is_identity() {
        let series = vec![1.0, 2.0, 3.0];
        assert_eq!(difference(&series, 0), series);
    }

    #[test]
    fn difference_order_1_and_2() {
        let series = vec![1.0, 3.0, 6.0, 10.0, 15.0];
        assert_eq!(difference(&series, 1), vec![2.0, 3.0, 4.0, 5.0]);
        assert_eq!(difference(&series, 2), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn difference_constant_and_empty() {
        assert_eq!(difference(&[5.0, 5.0, 5.0], 1), vec![0.0, 0.0]);
        assert!(difference(&[], 1).is_empty());
    }

    #[test]
    fn integrate_continues_from_last_value() {
        let original = vec![10.0, 12.0, 15.0, 19.0, 24.0];
        let integrated = integrate(&[6.0, 7.0], &original, 1);

        assert_relative_eq!(integrated[0], 30.0, epsilon = 1e-10);
        assert_relative_eq!(integrated[1], 37.0, epsilon = 1e-10);
    }

    #[test]
    fn integrate_order_2_continues_quadratic() {
        // Second differences of 1, 3, 6, 10, 15 are all 1.
        let original = vec![1.0, 3.0, 6.0, 10.0, 15.0];
        let integrated = integrate(&[1.0, 1.0], &original, 2);

        assert_relative_eq!(integrated[0], 21.0, epsilon = 1e-10);
        assert_relative_eq!(integrated[1], 28.0, epsilon = 1e-10);
    }
}
