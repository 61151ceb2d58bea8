use crate::model::{AnalysisError, DailyCountSeries, EnrichedObservation};
use chrono::NaiveDate;

/// Daily observation counts of one species across a whole calendar year.
///
/// Every date of the year is present; observations outside the year are ignored.
pub fn daily_counts(
    records: &[EnrichedObservation],
    scientific_name: &str,
    year: i32,
) -> Result<DailyCountSeries, AnalysisError> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1).ok_or(AnalysisError::InvalidYear(year))?;
    let end = NaiveDate::from_ymd_opt(year, 12, 31).ok_or(AnalysisError::InvalidYear(year))?;
    let days = (end - start).num_days() as usize + 1;

    let mut counts = vec![0u32; days];
    for record in records.iter().filter(|r| r.scientific_name == scientific_name) {
        let offset = (record.observation_date - start).num_days();
        if (0..days as i64).contains(&offset) {
            counts[offset as usize] += 1;
        }
    }

    Ok(DailyCountSeries { start, counts })
}

/// Trailing mean over up to `window` values ending at each position.
///
/// Early positions average over however many values exist, so the output
/// has the same length as the input.
pub fn rolling_mean(values: &[u32], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0u64;
    for (i, value) in values.iter().enumerate() {
        sum += u64::from(*value);
        if i >= window {
            sum -= u64::from(values[i - window]);
        }
        let periods = (i + 1).min(window);
        let mean = sum as f64 / periods as f64;
        out.push(if mean.is_finite() { mean } else { 0.0 });
    }
    out
}

/// Earliest and latest observation date across all records.
pub fn observation_span(records: &[EnrichedObservation]) -> Option<(NaiveDate, NaiveDate)> {
    let min = records.iter().map(|r| r.observation_date).min()?;
    let max = records.iter().map(|r| r.observation_date).max()?;
    Some((min, max))
}
