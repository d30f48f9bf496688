//! Report rows: the flattened city view consumed by the CSV and PDF
//! renderers and by the city details endpoint.

use serde::{Deserialize, Serialize};

use crate::model::{City, Department};

/// A city joined with its department code and, when known, the department
/// name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityRow {
  pub nom_ville:        String,
  pub nombre_habitants: u64,
  pub code_departement: String,
  pub nom_departement:  Option<String>,
}

impl CityRow {
  pub fn new(
    city: &City,
    department: &Department,
    nom_departement: Option<String>,
  ) -> Self {
    Self {
      nom_ville: city.nom.clone(),
      nombre_habitants: city.nb_habitants,
      code_departement: department.code.clone(),
      nom_departement,
    }
  }
}
