use crate::model::{AnalysisError, EnrichedObservation, HighlightTarget, MergeOutcome, Observation, TaxonomyEntry};
use std::collections::HashMap;
use tracing::warn;

/// Scientific name → taxonomy entry. Entries without a species group are not
/// join targets; for duplicated names the first row wins.
fn index_taxonomy(taxonomy: &[TaxonomyEntry]) -> (HashMap<&str, &TaxonomyEntry>, Vec<&str>) {
    let mut index = HashMap::with_capacity(taxonomy.len());
    let mut duplicates = Vec::new();
    for entry in taxonomy.iter().filter(|e| !e.species_group.is_empty()) {
        if index.contains_key(entry.scientific_name.as_str()) {
            duplicates.push(entry.scientific_name.as_str());
            continue;
        }
        index.insert(entry.scientific_name.as_str(), entry);
    }
    (index, duplicates)
}

/// Inner-joins observations to the taxonomy on scientific name.
pub fn merge(observations: Vec<Observation>, taxonomy: &[TaxonomyEntry]) -> MergeOutcome {
    let (index, duplicates) = index_taxonomy(taxonomy);
    for name in duplicates {
        warn!("Duplicate taxonomy entry ignored: {}", name);
    }
    let mut records = Vec::with_capacity(observations.len());
    let mut dropped = 0;

    for obs in observations {
        let Some(entry) = index.get(obs.scientific_name.as_str()) else {
            dropped += 1;
            continue;
        };
        records.push(EnrichedObservation {
            common_name: obs.common_name,
            scientific_name: obs.scientific_name,
            observation_date: obs.observation_date,
            latitude: obs.latitude,
            longitude: obs.longitude,
            species_group: entry.species_group.clone(),
        });
    }

    MergeOutcome { records, dropped }
}

/// Looks up the highlighted species' common name and group.
pub fn resolve_highlight(
    taxonomy: &[TaxonomyEntry],
    scientific_name: &str,
) -> Result<HighlightTarget, AnalysisError> {
    let (index, _) = index_taxonomy(taxonomy);
    let entry = index
        .get(scientific_name)
        .ok_or_else(|| AnalysisError::HighlightNotFound(scientific_name.to_string()))?;
    Ok(HighlightTarget {
        scientific_name: entry.scientific_name.clone(),
        common_name: entry.primary_common_name.clone(),
        species_group: entry.species_group.clone(),
    })
}
