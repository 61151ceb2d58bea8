use crate::model::AnnualCountSeries;
use chrono::{Datelike, NaiveDate};

/// Counts dates per year, keeping only years in `[start_year, end_year)`.
pub fn annual_counts(dates: &[NaiveDate], start_year: i32, end_year: i32) -> AnnualCountSeries {
    let mut counts = AnnualCountSeries::new();
    for year in dates.iter().map(|d| d.year()) {
        if (start_year..end_year).contains(&year) {
            *counts.entry(year).or_default() += 1;
        }
    }
    counts
}
