//! One data row of the census file.
//!
//! Columns, in order: region code, region name, department code,
//! arrondissement code, canton code, commune code, commune name, municipal
//! population, population counted apart, total population.

use recensement_core::model::NewCity;
use thiserror::Error;

/// Why a row could not be turned into a [`CensusRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
  #[error("expected {expected} fields, found {found}", expected = CensusRecord::FIELDS)]
  TooFewFields { found: usize },

  #[error("{field} is not a population count: {value:?}")]
  InvalidCount { field: &'static str, value: String },

  #[error("unreadable row: {0}")]
  Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CensusRecord {
  pub code_region:               String,
  pub nom_region:                String,
  pub code_departement:          String,
  pub code_arrondissement:       String,
  pub code_canton:               String,
  pub code_commune:              String,
  pub nom_commune:               String,
  pub population_municipale:     u64,
  pub population_comptee_a_part: u64,
  pub population_totale:         u64,
}

impl CensusRecord {
  pub const FIELDS: usize = 10;

  /// Build a record from the raw fields of one row. Extra trailing fields
  /// are ignored.
  pub fn from_fields<'a, I>(fields: I) -> Result<Self, RowError>
  where
    I: IntoIterator<Item = &'a str>,
  {
    let fields: Vec<&str> = fields.into_iter().collect();
    if fields.len() < Self::FIELDS {
      return Err(RowError::TooFewFields { found: fields.len() });
    }

    Ok(Self {
      code_region:               fields[0].to_owned(),
      nom_region:                fields[1].to_owned(),
      code_departement:          fields[2].to_owned(),
      code_arrondissement:       fields[3].to_owned(),
      code_canton:               fields[4].to_owned(),
      code_commune:              fields[5].to_owned(),
      nom_commune:               fields[6].to_owned(),
      population_municipale:     count("populationMunicipale", fields[7])?,
      population_comptee_a_part: count("populationCompteeAPart", fields[8])?,
      population_totale:         count("populationTotale", fields[9])?,
    })
  }

  /// The city this row describes. `nb_habitants` is the total population.
  pub fn to_city(&self, department_id: i64) -> NewCity {
    NewCity {
      nom: self.nom_commune.clone(),
      nb_habitants: self.population_totale,
      code_arrondissement: self.code_arrondissement.clone(),
      code_canton: self.code_canton.clone(),
      code_commune: self.code_commune.clone(),
      population_municipale: self.population_municipale,
      population_comptee_a_part: self.population_comptee_a_part,
      population_totale: self.population_totale,
      department_id,
    }
  }
}

/// Parse a count written with digit grouping, e.g. `2 165 423` or with
/// non-breaking spaces.
pub fn parse_count(raw: &str) -> Option<u64> {
  let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
  digits.parse().ok()
}

fn count(field: &'static str, raw: &str) -> Result<u64, RowError> {
  parse_count(raw).ok_or_else(|| RowError::InvalidCount { field, value: raw.to_owned() })
}

#[cfg(test)]
mod tests {
  use super::*;

  const PARIS: &str =
    "11;Île-de-France;75;1;99;056;Paris;2 133 111;32 312;2 165 423";

  #[test]
  fn parses_a_full_row() {
    let record = CensusRecord::from_fields(PARIS.split(';')).unwrap();
    assert_eq!(record.code_region, "11");
    assert_eq!(record.nom_commune, "Paris");
    assert_eq!(record.population_municipale, 2_133_111);
    assert_eq!(record.population_totale, 2_165_423);

    let city = record.to_city(7);
    assert_eq!(city.nb_habitants, city.population_totale);
    assert_eq!(city.department_id, 7);
  }

  #[test]
  fn counts_ignore_all_whitespace() {
    assert_eq!(parse_count("2 165 423"), Some(2_165_423));
    assert_eq!(parse_count("2\u{a0}165\u{202f}423"), Some(2_165_423));
    assert_eq!(parse_count(" 12\t"), Some(12));
    assert_eq!(parse_count(""), None);
    assert_eq!(parse_count("12a"), None);
    assert_eq!(parse_count("-3"), None);
  }

  #[test]
  fn short_rows_are_rejected() {
    let err = CensusRecord::from_fields("11;Île-de-France;75".split(';')).unwrap_err();
    assert_eq!(err, RowError::TooFewFields { found: 3 });
  }

  #[test]
  fn bad_count_names_the_field() {
    let row = "11;Île-de-France;75;1;99;056;Paris;x;0;1";
    let err = CensusRecord::from_fields(row.split(';')).unwrap_err();
    assert!(matches!(
      err,
      RowError::InvalidCount { field: "populationMunicipale", .. }
    ));
  }
}
