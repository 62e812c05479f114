//! Time-weighted linear interpolation of gaps in a single numeric column.

/// Outcome of interpolating one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FillStats {
    /// Absences filled between two known values.
    pub filled: usize,
    /// Absences before the first known value.
    pub leading_unresolved: usize,
    /// Absences after the last known value.
    pub trailing_unresolved: usize,
}

impl FillStats {
    pub fn unresolved(&self) -> usize {
        self.leading_unresolved + self.trailing_unresolved
    }
}

/// Fills absences in `values` by linear interpolation over `times`.
///
/// `times` must be strictly increasing and the same length as `values`. A missing
/// value at time `t` between known points `(t0, v0)` and `(t1, v1)` becomes
/// `v0 + (v1 - v0) * (t - t0) / (t1 - t0)`, so irregular spacing is weighted by
/// elapsed time rather than by row count. Absences with no known value on one side
/// are left in place and counted in the returned [`FillStats`]. Non-finite inputs
/// count as absences.
pub fn interpolate_time(times: &[i64], values: &[Option<f64>]) -> (Vec<Option<f64>>, FillStats) {
    debug_assert_eq!(times.len(), values.len());

    let mut out: Vec<Option<f64>> = values
        .iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect();
    let anchors: Vec<usize> = out
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|_| i))
        .collect();

    let mut stats = FillStats::default();
    let (Some(&first), Some(&last)) = (anchors.first(), anchors.last()) else {
        stats.leading_unresolved = out.len();
        return (out, stats);
    };
    stats.leading_unresolved = first;
    stats.trailing_unresolved = out.len() - 1 - last;

    for pair in anchors.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if b == a + 1 {
            continue;
        }
        let (Some(va), Some(vb)) = (out[a], out[b]) else {
            continue;
        };
        let (ta, tb) = (times[a] as f64, times[b] as f64);
        let span = tb - ta;
        for i in (a + 1)..b {
            let weight = (times[i] as f64 - ta) / span;
            out[i] = Some(va + (vb - va) * weight);
            stats.filled += 1;
        }
    }

    (out, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DAY: i64 = 86_400_000;

    #[test]
    fn fills_interior_gap_proportionally_to_elapsed_time() {
        // Known at day 0 and day 4, missing at day 1 (gap in the index at 2 and 3).
        let times = [0, DAY, 4 * DAY];
        let values = [Some(10.0), None, Some(18.0)];
        let (filled, stats) = interpolate_time(&times, &values);

        assert_relative_eq!(filled[1].unwrap(), 12.0);
        assert_eq!(stats.filled, 1);
        assert_eq!(stats.unresolved(), 0);
    }

    #[test]
    fn differs_from_positional_interpolation_on_irregular_index() {
        let times = [0, 9 * DAY, 10 * DAY];
        let values = [Some(0.0), None, Some(10.0)];
        let (filled, _) = interpolate_time(&times, &values);

        // Positional fill would give 5.0.
        assert_relative_eq!(filled[1].unwrap(), 9.0);
    }

    #[test]
    fn boundary_gaps_stay_unresolved() {
        let times = [0, DAY, 2 * DAY, 3 * DAY, 4 * DAY];
        let values = [None, Some(1.0), None, Some(3.0), None];
        let (filled, stats) = interpolate_time(&times, &values);

        assert_eq!(filled[0], None);
        assert_eq!(filled[4], None);
        assert_relative_eq!(filled[2].unwrap(), 2.0);
        assert_eq!(stats.leading_unresolved, 1);
        assert_eq!(stats.trailing_unresolved, 1);
        assert_eq!(stats.filled, 1);
    }

    #[test]
    fn all_missing_column_is_entirely_unresolved() {
        let times = [0, DAY, 2 * DAY];
        let values = [None, Some(f64::NAN), None];
        let (filled, stats) = interpolate_time(&times, &values);

        assert!(filled.iter().all(Option::is_none));
        assert_eq!(stats.leading_unresolved, 3);
        assert_eq!(stats.trailing_unresolved, 0);
    }

    #[test]
    fn complete_column_is_untouched() {
        let times = [0, DAY, 2 * DAY];
        let values = [Some(1.5), Some(-2.0), Some(4.25)];
        let (filled, stats) = interpolate_time(&times, &values);

        assert_eq!(filled, values.to_vec());
        assert_eq!(stats, FillStats::default());
    }
}
