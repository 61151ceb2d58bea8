use crate::model::{LoadError, Observation, TaxonomyEntry};
use crate::utils::parse_date;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
struct ObservationRow {
    #[serde(rename = "COMMON NAME")]
    common_name: String,
    #[serde(rename = "SCIENTIFIC NAME")]
    scientific_name: String,
    #[serde(rename = "OBSERVATION DATE")]
    observation_date: String,
    #[serde(rename = "LATITUDE")]
    latitude: f64,
    #[serde(rename = "LONGITUDE")]
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct TaxonomyRow {
    #[serde(rename = "PRIMARY_COM_NAME")]
    primary_common_name: String,
    #[serde(rename = "SCI_NAME")]
    scientific_name: String,
    #[serde(rename = "SPECIES_GROUP")]
    species_group: Option<String>,
}

/// Opens a delimited file with a header row.
pub(crate) fn open_table(path: &Path, delimiter: u8) -> Result<csv::Reader<File>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(file))
}

/// Reads the annual observation log. Any row with an unparseable date aborts the load.
pub fn load_observations(path: &Path) -> Result<Vec<Observation>, LoadError> {
    let mut reader = open_table(path, b',')?;
    let mut observations = Vec::new();

    for (i, row) in reader.deserialize::<ObservationRow>().enumerate() {
        let row = row.map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let observation_date =
            parse_date(&row.observation_date).ok_or_else(|| LoadError::InvalidDate {
                path: path.to_path_buf(),
                row: i + 1,
                value: row.observation_date.clone(),
            })?;
        observations.push(Observation {
            common_name: row.common_name,
            scientific_name: row.scientific_name,
            observation_date,
            latitude: row.latitude,
            longitude: row.longitude,
        });
    }

    info!("Loaded {} observations from {}", observations.len(), path.display());
    Ok(observations)
}

/// Reads the taxonomy reference table. A blank species group is kept as an empty string.
pub fn load_taxonomy(path: &Path) -> Result<Vec<TaxonomyEntry>, LoadError> {
    let mut reader = open_table(path, b',')?;
    let mut entries = Vec::new();

    for row in reader.deserialize::<TaxonomyRow>() {
        let row = row.map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        entries.push(TaxonomyEntry {
            primary_common_name: row.primary_common_name,
            scientific_name: row.scientific_name,
            species_group: row.species_group.unwrap_or_default().trim().to_string(),
        });
    }

    info!("Loaded {} taxonomy entries from {}", entries.len(), path.display());
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_observations_ignores_extra_columns() {
        let file = write_temp(
            "GLOBAL UNIQUE IDENTIFIER,COMMON NAME,SCIENTIFIC NAME,OBSERVATION COUNT,OBSERVATION DATE,LATITUDE,LONGITUDE\n\
             URN:1,Rusty Blackbird,Euphagus carolinus,3,2022-04-12,53.5,-113.5\n\
             URN:2,Black-capped Chickadee,Poecile atricapillus,X,2022-01-02,51.0,-114.1\n",
        );
        let obs = load_observations(file.path()).unwrap();
        assert_eq!(obs.len(), 2);
        assert_eq!(obs[0].scientific_name, "Euphagus carolinus");
        assert_eq!(obs[0].observation_date, NaiveDate::from_ymd_opt(2022, 4, 12).unwrap());
        assert_eq!(obs[1].longitude, -114.1);
    }

    #[test]
    fn test_bad_date_is_fatal_with_row_number() {
        let file = write_temp(
            "COMMON NAME,SCIENTIFIC NAME,OBSERVATION DATE,LATITUDE,LONGITUDE\n\
             Rusty Blackbird,Euphagus carolinus,2022-04-12,53.5,-113.5\n\
             Rusty Blackbird,Euphagus carolinus,not-a-date,53.5,-113.5\n",
        );
        match load_observations(file.path()) {
            Err(LoadError::InvalidDate { row, value, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(value, "not-a-date");
            }
            other => panic!("expected InvalidDate, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_observations(Path::new("/nonexistent/ebird.csv"));
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }

    #[test]
    fn test_load_taxonomy_blank_group() {
        let file = write_temp(
            "TAXON_ORDER,PRIMARY_COM_NAME,SCI_NAME,SPECIES_GROUP\n\
             1,Rusty Blackbird,Euphagus carolinus,\"Blackbirds\"\n\
             2,duck sp.,Anatinae sp.,\n",
        );
        let taxonomy = load_taxonomy(file.path()).unwrap();
        assert_eq!(taxonomy.len(), 2);
        assert_eq!(taxonomy[0].species_group, "Blackbirds");
        assert_eq!(taxonomy[1].species_group, "");
    }
}
