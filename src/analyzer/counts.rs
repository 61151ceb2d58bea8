use crate::model::{CountSeries, EnrichedObservation};
use std::collections::BTreeMap;

fn count_by<'a, I, F>(records: I, key: F) -> CountSeries
where
    I: IntoIterator<Item = &'a EnrichedObservation>,
    F: Fn(&'a EnrichedObservation) -> &'a str,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for record in records {
        *counts.entry(key(record).to_string()).or_default() += 1;
    }
    CountSeries::from_counts(counts)
}

/// Observation count per species group, ascending.
pub fn group_counts(records: &[EnrichedObservation]) -> CountSeries {
    count_by(records, |r| r.species_group.as_str())
}

/// Observation count per common name within one species group, ascending.
pub fn species_counts(records: &[EnrichedObservation], species_group: &str) -> CountSeries {
    count_by(
        records.iter().filter(|r| r.species_group == species_group),
        |r| r.common_name.as_str(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(common: &str, group: &str) -> EnrichedObservation {
        EnrichedObservation {
            common_name: common.into(),
            scientific_name: format!("{} sci", common),
            observation_date: NaiveDate::from_ymd_opt(2022, 6, 1).unwrap(),
            latitude: 53.0,
            longitude: -114.0,
            species_group: group.into(),
        }
    }

    fn sample() -> Vec<EnrichedObservation> {
        let mut records = Vec::new();
        records.extend((0..5).map(|_| record("Red-winged Blackbird", "Blackbirds")));
        records.extend((0..2).map(|_| record("Rusty Blackbird", "Blackbirds")));
        records.extend((0..3).map(|_| record("Common Raven", "Corvids")));
        records.push(record("Snowy Owl", "Owls"));
        records.push(record("Great Horned Owl", "Owls"));
        records.push(record("Great Horned Owl", "Owls"));
        records
    }

    #[test]
    fn test_group_counts_sorted_ascending_and_sum_matches() {
        let records = sample();
        let counts = group_counts(&records);
        assert_eq!(
            counts.entries(),
            &[
                ("Corvids".to_string(), 3),
                ("Owls".to_string(), 3),
                ("Blackbirds".to_string(), 7),
            ]
        );
        assert_eq!(counts.total(), records.len());
        assert!(counts.entries().windows(2).all(|w| w[0].1 <= w[1].1));
    }

    #[test]
    fn test_species_counts_restricted_to_group() {
        let counts = species_counts(&sample(), "Blackbirds");
        assert_eq!(counts.len(), 2);
        assert_eq!(counts.position("Rusty Blackbird"), Some(0));
        assert_eq!(counts.get("Red-winged Blackbird"), Some(5));
        assert_eq!(counts.get("Snowy Owl"), None);
        assert_eq!(counts.total(), 7);
    }

    #[test]
    fn test_empty_input() {
        assert!(group_counts(&[]).is_empty());
        assert!(species_counts(&sample(), "Loons").is_empty());
    }
}
