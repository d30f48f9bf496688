//! Conversions between domain types and SQLite rows.
//!
//! SQLite integers are signed 64-bit, so population counts pass through
//! [`encode_count`] / [`decode_count`] on the way in and out.

use recensement_core::model::{City, Department, NewCity, Region};

use crate::{Error, Result};

pub const REGION_COLUMNS: &str = "id, code, nom";

pub const DEPARTMENT_COLUMNS: &str = "id, code, region_id";

pub const CITY_COLUMNS: &str = "id, nom, nb_habitants, code_arrondissement, \
   code_canton, code_commune, population_municipale, \
   population_comptee_a_part, population_totale, department_id";

// ─── Counts ──────────────────────────────────────────────────────────────────

pub fn encode_count(n: u64) -> Result<i64> {
  i64::try_from(n).map_err(|_| Error::OutOfRange(n.to_string()))
}

/// Population bound for a query. Stored counts never exceed `i64::MAX`, so
/// larger bounds saturate without changing the result set.
pub fn clamp_bound(n: u64) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }

pub fn decode_count(n: i64) -> Result<u64> {
  u64::try_from(n).map_err(|_| Error::OutOfRange(n.to_string()))
}

// ─── Regions and departments ─────────────────────────────────────────────────

pub fn region_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Region> {
  Ok(Region { id: row.get(0)?, code: row.get(1)?, nom: row.get(2)? })
}

pub fn department_from_row(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<Department> {
  Ok(Department { id: row.get(0)?, code: row.get(1)?, region_id: row.get(2)? })
}

// ─── Cities ──────────────────────────────────────────────────────────────────

/// A `cities` row exactly as SQLite hands it back.
pub struct RawCity {
  pub id:                        i64,
  pub nom:                       String,
  pub nb_habitants:              i64,
  pub code_arrondissement:       String,
  pub code_canton:               String,
  pub code_commune:              String,
  pub population_municipale:     i64,
  pub population_comptee_a_part: i64,
  pub population_totale:         i64,
  pub department_id:             i64,
}

impl RawCity {
  /// Map a row selected with [`CITY_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                        row.get(0)?,
      nom:                       row.get(1)?,
      nb_habitants:              row.get(2)?,
      code_arrondissement:       row.get(3)?,
      code_canton:               row.get(4)?,
      code_commune:              row.get(5)?,
      population_municipale:     row.get(6)?,
      population_comptee_a_part: row.get(7)?,
      population_totale:         row.get(8)?,
      department_id:             row.get(9)?,
    })
  }

  pub fn into_city(self) -> Result<City> {
    Ok(City {
      id:                        self.id,
      nom:                       self.nom,
      nb_habitants:              decode_count(self.nb_habitants)?,
      code_arrondissement:       self.code_arrondissement,
      code_canton:               self.code_canton,
      code_commune:              self.code_commune,
      population_municipale:     decode_count(self.population_municipale)?,
      population_comptee_a_part: decode_count(self.population_comptee_a_part)?,
      population_totale:         decode_count(self.population_totale)?,
      department_id:             self.department_id,
    })
  }

  /// Encode a new city for insertion; `id` is left at zero and ignored.
  pub fn encode(input: &NewCity) -> Result<Self> {
    Ok(Self {
      id:                        0,
      nom:                       input.nom.clone(),
      nb_habitants:              encode_count(input.nb_habitants)?,
      code_arrondissement:       input.code_arrondissement.clone(),
      code_canton:               input.code_canton.clone(),
      code_commune:              input.code_commune.clone(),
      population_municipale:     encode_count(input.population_municipale)?,
      population_comptee_a_part: encode_count(input.population_comptee_a_part)?,
      population_totale:         encode_count(input.population_totale)?,
      department_id:             input.department_id,
    })
  }
}

pub fn decode_cities(raws: Vec<RawCity>) -> Result<Vec<City>> {
  raws.into_iter().map(RawCity::into_city).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn counts_above_i64_are_rejected() {
    assert_eq!(encode_count(42).unwrap(), 42);
    assert!(matches!(encode_count(u64::MAX), Err(Error::OutOfRange(_))));
    assert!(matches!(decode_count(-1), Err(Error::OutOfRange(_))));
  }

  #[test]
  fn query_bounds_saturate() {
    assert_eq!(clamp_bound(7), 7);
    assert_eq!(clamp_bound(u64::MAX), i64::MAX);
  }
}
