//! Entity types: the three levels of French administrative geography.
//!
//! Parents are referenced by surrogate id, never embedded. Codes are the
//! business identity; ids are assigned by the store and never reused.

use serde::{Deserialize, Serialize};

// ─── Region ──────────────────────────────────────────────────────────────────

/// A region (e.g. `11` / Île-de-France). The root of the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
  pub id:   i64,
  /// Unique, 1–10 characters.
  pub code: String,
  /// 1–100 characters; unique by convention only.
  pub nom:  String,
}

/// Input to [`crate::store::GeoStore::insert_region`] and
/// [`crate::store::GeoStore::update_region`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRegion {
  pub code: String,
  pub nom:  String,
}

// ─── Department ──────────────────────────────────────────────────────────────

/// A department. Its name is not persisted; see
/// [`crate::directory::DepartmentDirectory`] for enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
  pub id:        i64,
  /// Unique, 1–10 characters (`"75"`, `"2A"`, `"971"`).
  pub code:      String,
  /// Always set for ingested rows; may be absent for API-created ones.
  pub region_id: Option<i64>,
}

/// Input to [`crate::store::GeoStore::insert_department`] and
/// [`crate::store::GeoStore::update_department`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDepartment {
  pub code:      String,
  pub region_id: Option<i64>,
}

// ─── City ────────────────────────────────────────────────────────────────────

/// A commune, as recorded by the census.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
  pub id:                        i64,
  pub nom:                       String,
  /// Equal to `population_totale` for ingested rows.
  pub nb_habitants:              u64,
  pub code_arrondissement:       String,
  pub code_canton:               String,
  pub code_commune:              String,
  pub population_municipale:     u64,
  pub population_comptee_a_part: u64,
  pub population_totale:         u64,
  pub department_id:             i64,
}

/// A city ready to be persisted; the department has already been resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCity {
  pub nom:                       String,
  pub nb_habitants:              u64,
  pub code_arrondissement:       String,
  pub code_canton:               String,
  pub code_commune:              String,
  pub population_municipale:     u64,
  pub population_comptee_a_part: u64,
  pub population_totale:         u64,
  pub department_id:             i64,
}

/// A city as submitted by an API caller. The department reference is
/// unresolved and may be missing entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityDraft {
  pub nom:                       String,
  pub nb_habitants:              u64,
  pub code_arrondissement:       String,
  pub code_canton:               String,
  pub code_commune:              String,
  pub population_municipale:     u64,
  pub population_comptee_a_part: u64,
  pub population_totale:         u64,
  pub department_id:             Option<i64>,
}

impl CityDraft {
  /// Bind the draft to a department that is known to exist.
  pub fn resolve(self, department_id: i64) -> NewCity {
    NewCity {
      nom: self.nom,
      nb_habitants: self.nb_habitants,
      code_arrondissement: self.code_arrondissement,
      code_canton: self.code_canton,
      code_commune: self.code_commune,
      population_municipale: self.population_municipale,
      population_comptee_a_part: self.population_comptee_a_part,
      population_totale: self.population_totale,
      department_id,
    }
  }
}

/// The only city fields that may change after ingest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityUpdate {
  pub nom:          String,
  pub nb_habitants: u64,
}
