//! Attribute-level constraints applied by the service before any store call.

use crate::{
  Error, Result,
  model::{CityDraft, CityUpdate, NewDepartment, NewRegion},
};

pub const MAX_PAGE_SIZE: u32 = 1000;

fn length(field: &str, value: &str, min: usize, max: usize) -> Result<()> {
  let len = value.chars().count();
  if value.trim().is_empty() || len < min || len > max {
    return Err(Error::Validation(format!(
      "{field} must be between {min} and {max} characters, got {len}"
    )));
  }
  Ok(())
}

pub fn region(input: &NewRegion) -> Result<()> {
  length("code", &input.code, 1, 10)?;
  length("nom", &input.nom, 1, 100)
}

pub fn department(input: &NewDepartment) -> Result<()> {
  length("code", &input.code, 1, 10)
}

fn city_fields(nom: &str, nb_habitants: u64) -> Result<()> {
  length("nom", nom, 2, 100)?;
  if nb_habitants < 1 {
    return Err(Error::Validation("nbHabitants must be at least 1".into()));
  }
  Ok(())
}

pub fn city_draft(draft: &CityDraft) -> Result<()> {
  city_fields(&draft.nom, draft.nb_habitants)
}

pub fn city_update(update: &CityUpdate) -> Result<()> {
  city_fields(&update.nom, update.nb_habitants)
}

pub fn range(min: u64, max: u64) -> Result<()> {
  if min > max {
    return Err(Error::Validation(format!(
      "minPopulation ({min}) must not exceed maxPopulation ({max})"
    )));
  }
  Ok(())
}

pub fn page_size(size: u32) -> Result<()> {
  if size == 0 || size > MAX_PAGE_SIZE {
    return Err(Error::Validation(format!(
      "size must be between 1 and {MAX_PAGE_SIZE}, got {size}"
    )));
  }
  Ok(())
}

pub fn top_n(n: u32) -> Result<()> {
  if n == 0 {
    return Err(Error::Validation("the number of results must be at least 1".into()));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn region_code_length_bounds() {
    let ok = NewRegion { code: "11".into(), nom: "Île-de-France".into() };
    assert!(region(&ok).is_ok());

    let empty = NewRegion { code: String::new(), nom: "X".into() };
    assert!(matches!(region(&empty), Err(Error::Validation(_))));

    let long = NewRegion { code: "12345678901".into(), nom: "X".into() };
    assert!(matches!(region(&long), Err(Error::Validation(_))));
  }

  #[test]
  fn lengths_count_characters_not_bytes() {
    // 100 two-byte characters is still within bounds.
    let nom = "é".repeat(100);
    assert!(region(&NewRegion { code: "1".into(), nom }).is_ok());
  }

  #[test]
  fn city_name_needs_two_characters() {
    let update = CityUpdate { nom: "Y".into(), nb_habitants: 10 };
    assert!(matches!(city_update(&update), Err(Error::Validation(_))));
  }

  #[test]
  fn city_needs_one_inhabitant() {
    let update = CityUpdate { nom: "Ys".into(), nb_habitants: 0 };
    assert!(matches!(city_update(&update), Err(Error::Validation(_))));
  }

  #[test]
  fn inverted_range_is_rejected() {
    assert!(range(10, 10).is_ok());
    assert!(matches!(range(11, 10), Err(Error::Validation(_))));
  }

  #[test]
  fn page_size_bounds() {
    assert!(page_size(1).is_ok());
    assert!(page_size(MAX_PAGE_SIZE).is_ok());
    assert!(page_size(0).is_err());
    assert!(page_size(MAX_PAGE_SIZE + 1).is_err());
  }
}
