use crate::model::{AnalysisError, CountSeries};

/// Number of entries shown in a zoomed chart.
pub const ZOOM_WIDTH: usize = 15;
const BEFORE: usize = 7;
const AFTER: usize = 8;

/// Picks the 15-entry slice of a sorted series to show around `highlighted`.
///
/// Series of 15 or fewer entries are returned whole. Otherwise the window is
/// `[i - 7, i + 8)` around the highlighted rank `i`, pinned to the first or
/// last 15 entries when it would run off either end.
pub fn select_window(series: &CountSeries, highlighted: &str) -> Result<CountSeries, AnalysisError> {
    let rank = series
        .position(highlighted)
        .ok_or_else(|| AnalysisError::KeyNotFound(highlighted.to_string()))?;
    let len = series.len();
    if len <= ZOOM_WIDTH {
        return Ok(series.clone());
    }

    let range = if rank < BEFORE {
        0..ZOOM_WIDTH
    } else if rank + AFTER > len {
        len - ZOOM_WIDTH..len
    } else {
        rank - BEFORE..rank + AFTER
    };
    Ok(CountSeries::from_sorted(series.entries()[range].to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `n` keys "k00".."k{n-1}" with strictly increasing counts.
    fn ranked(n: usize) -> CountSeries {
        CountSeries::from_sorted((0..n).map(|i| (format!("k{:02}", i), i + 1)).collect())
    }

    fn ranks(window: &CountSeries) -> (usize, usize) {
        let first = window.entries()[0].1 - 1;
        (first, first + window.len())
    }

    #[test]
    fn test_small_series_returned_unchanged() {
        for n in 1..=ZOOM_WIDTH {
            let series = ranked(n);
            let window = select_window(&series, "k00").unwrap();
            assert_eq!(window, series);
        }
    }

    #[test]
    fn test_edge_cases_on_twenty_entries() {
        let series = ranked(20);
        assert_eq!(ranks(&select_window(&series, "k00").unwrap()), (0, 15));
        assert_eq!(ranks(&select_window(&series, "k19").unwrap()), (5, 20));
        assert_eq!(ranks(&select_window(&series, "k10").unwrap()), (3, 18));
        assert_eq!(ranks(&select_window(&series, "k07").unwrap()), (0, 15));
        assert_eq!(ranks(&select_window(&series, "k12").unwrap()), (5, 20));
        assert_eq!(ranks(&select_window(&series, "k13").unwrap()), (5, 20));
    }

    #[test]
    fn test_window_always_full_and_contains_highlight() {
        for n in 16..40 {
            let series = ranked(n);
            for i in 0..n {
                let key = format!("k{:02}", i);
                let window = select_window(&series, &key).unwrap();
                assert_eq!(window.len(), ZOOM_WIDTH);
                assert!(window.position(&key).is_some(), "n={} i={}", n, i);
            }
        }
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let series = ranked(20);
        assert_eq!(
            select_window(&series, "absent"),
            Err(AnalysisError::KeyNotFound("absent".into()))
        );
        assert!(select_window(&ranked(3), "absent").is_err());
    }
}
