//! The ingest loop: read rows, resolve parents, insert cities.

use std::{collections::HashMap, path::Path};

use recensement_core::{
  model::{Department, NewDepartment, NewRegion, Region},
  store::{GeoStore, StoreError as _},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
  Error, Result,
  census::{CensusRecord, RowError},
};

// ─── Settings and report ─────────────────────────────────────────────────────

/// Which existing cities make an incoming row a duplicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupScope {
  /// Any city with the same name, in any department.
  #[default]
  Name,
  /// A city with the same name in the same department.
  NameAndDepartment,
}

/// Counters for one ingest run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
  /// Data rows seen, header and blank lines excluded.
  pub rows_read:            u64,
  pub cities_inserted:      u64,
  pub cities_existing:      u64,
  pub parse_rejects:        u64,
  pub inconsistent_rejects: u64,
  pub store_failures:       u64,
  pub regions_created:      u64,
  pub departments_created:  u64,
}

enum Outcome {
  Inserted,
  Existing,
  Inconsistent,
}

// ─── Importer ────────────────────────────────────────────────────────────────

/// One ingest run. The region and department caches live as long as the
/// importer and are never evicted.
pub struct Importer<'s, S> {
  store:       &'s S,
  dedup:       DedupScope,
  regions:     HashMap<String, Region>,
  departments: HashMap<String, Department>,
  report:      IngestReport,
}

impl<'s, S: GeoStore> Importer<'s, S> {
  pub fn new(store: &'s S, dedup: DedupScope) -> Self {
    Self {
      store,
      dedup,
      regions: HashMap::new(),
      departments: HashMap::new(),
      report: IngestReport::default(),
    }
  }

  /// Ingest the census file at `path`.
  pub async fn run(self, path: impl AsRef<Path>) -> Result<IngestReport> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await.map_err(|source| Error::Read {
      path: path.to_owned(),
      source,
    })?;
    info!(path = %path.display(), bytes = bytes.len(), "starting census ingest");
    self.run_bytes(&bytes).await
  }

  /// Ingest census data already in memory. The first line is a header; a
  /// missing or undecodable header aborts the run.
  pub async fn run_bytes(mut self, input: &[u8]) -> Result<IngestReport> {
    let mut reader = csv::ReaderBuilder::new()
      .delimiter(b';')
      .has_headers(true)
      .flexible(true)
      .from_reader(input);

    let header = reader
      .headers()
      .map_err(|e| Error::Header(e.to_string()))?;
    if header.is_empty() {
      return Err(Error::Header("input is empty".into()));
    }

    for result in reader.records() {
      self.report.rows_read += 1;
      let (line, parsed) = match result {
        Ok(record) => (
          record.position().map_or(0, |p| p.line()),
          CensusRecord::from_fields(record.iter()),
        ),
        Err(e) => (
          e.position().map_or(0, |p| p.line()),
          Err(RowError::Malformed(e.to_string())),
        ),
      };

      let record = match parsed {
        Ok(record) => record,
        Err(e) => {
          warn!(line, error = %e, "skipping unparsable row");
          self.report.parse_rejects += 1;
          continue;
        }
      };

      match self.ingest(&record).await {
        Ok(Outcome::Inserted) => self.report.cities_inserted += 1,
        Ok(Outcome::Existing) => self.report.cities_existing += 1,
        Ok(Outcome::Inconsistent) => self.report.inconsistent_rejects += 1,
        Err(e) => {
          warn!(line, city = %record.nom_commune, error = %e, "failed to store row");
          self.report.store_failures += 1;
        }
      }
    }

    let r = &self.report;
    info!(
      rows_read = r.rows_read,
      cities_inserted = r.cities_inserted,
      cities_existing = r.cities_existing,
      parse_rejects = r.parse_rejects,
      inconsistent_rejects = r.inconsistent_rejects,
      store_failures = r.store_failures,
      regions_created = r.regions_created,
      departments_created = r.departments_created,
      "census ingest finished"
    );
    Ok(self.report)
  }

  async fn ingest(&mut self, record: &CensusRecord) -> Result<Outcome, S::Error> {
    let region = self.resolve_region(record).await?;
    if region.nom != record.nom_region {
      warn!(
        code = %record.code_region,
        known = %region.nom,
        found = %record.nom_region,
        city = %record.nom_commune,
        "region name mismatch, skipping row"
      );
      return Ok(Outcome::Inconsistent);
    }

    let department = self.resolve_department(record, region.id).await?;
    let exists = match self.dedup {
      DedupScope::Name => self.store.exists_city_by_name(&record.nom_commune).await?,
      DedupScope::NameAndDepartment => {
        self
          .store
          .exists_city_by_name_and_department(&record.nom_commune, department.id)
          .await?
      }
    };
    if exists {
      return Ok(Outcome::Existing);
    }

    match self.store.insert_city(record.to_city(department.id)).await {
      Ok(_) => Ok(Outcome::Inserted),
      Err(e) if e.is_duplicate_key() => Ok(Outcome::Existing),
      Err(e) => Err(e),
    }
  }

  async fn resolve_region(&mut self, record: &CensusRecord) -> Result<Region, S::Error> {
    if let Some(region) = self.regions.get(&record.code_region) {
      return Ok(region.clone());
    }

    let region = match self.store.find_region_by_code(&record.code_region).await? {
      Some(region) => region,
      None => {
        let input = NewRegion {
          code: record.code_region.clone(),
          nom:  record.nom_region.clone(),
        };
        let region = self.store.insert_region(input).await?;
        self.report.regions_created += 1;
        region
      }
    };
    self.regions.insert(region.code.clone(), region.clone());
    Ok(region)
  }

  async fn resolve_department(
    &mut self,
    record: &CensusRecord,
    region_id: i64,
  ) -> Result<Department, S::Error> {
    if let Some(department) = self.departments.get(&record.code_departement) {
      return Ok(department.clone());
    }

    let department =
      match self.store.find_department_by_code(&record.code_departement).await? {
        Some(department) => department,
        None => {
          let input = NewDepartment {
            code:      record.code_departement.clone(),
            region_id: Some(region_id),
          };
          let department = self.store.insert_department(input).await?;
          self.report.departments_created += 1;
          department
        }
      };
    self.departments.insert(department.code.clone(), department.clone());
    Ok(department)
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use recensement_core::{page::PageRequest, store::GeoStore};
  use recensement_store_sqlite::SqliteStore;

  use super::*;

  const HEADER: &str = "Code région;Nom de la région;Code département;\
    Code arrondissement;Code canton;Code commune;Nom de la commune;\
    Population municipale;Population comptée à part;Population totale";

  fn csv(rows: &[&str]) -> Vec<u8> {
    let mut out = String::from(HEADER);
    for row in rows {
      out.push('\n');
      out.push_str(row);
    }
    out.push('\n');
    out.into_bytes()
  }

  async fn store() -> SqliteStore {
    SqliteStore::open_in_memory()
      .await
      .expect("in-memory store")
  }

  const PARIS: &str = "11;Île-de-France;75;1;99;056;Paris;2 133 111;32 312;2 165 423";
  const BOULOGNE: &str =
    "11;Île-de-France;92;2;99;012;Boulogne-Billancourt;120 071;1 533;121 604";
  const MONTPELLIER: &str = "76;Occitanie;34;3;99;172;Montpellier;285 121;3 000;288 121";

  #[tokio::test]
  async fn ingests_a_single_row() {
    let s = store().await;
    let report = Importer::new(&s, DedupScope::Name)
      .run_bytes(&csv(&[PARIS]))
      .await
      .unwrap();

    assert_eq!(report.rows_read, 1);
    assert_eq!(report.cities_inserted, 1);
    assert_eq!(report.regions_created, 1);
    assert_eq!(report.departments_created, 1);

    let region = s.find_region_by_code("11").await.unwrap().unwrap();
    assert_eq!(region.nom, "Île-de-France");
    let dept = s.find_department_by_code("75").await.unwrap().unwrap();
    assert_eq!(dept.region_id, Some(region.id));

    let paris = s.find_city_by_name("Paris").await.unwrap().unwrap();
    assert_eq!(paris.nb_habitants, 2_165_423);
    assert_eq!(paris.population_totale, 2_165_423);
    assert_eq!(paris.population_comptee_a_part, 32_312);
    assert_eq!(paris.department_id, dept.id);
  }

  #[tokio::test]
  async fn parents_are_created_once() {
    let s = store().await;
    let report = Importer::new(&s, DedupScope::Name)
      .run_bytes(&csv(&[PARIS, BOULOGNE, MONTPELLIER]))
      .await
      .unwrap();

    assert_eq!(report.cities_inserted, 3);
    assert_eq!(report.regions_created, 2);
    assert_eq!(report.departments_created, 3);
    assert_eq!(s.list_regions().await.unwrap().len(), 2);
  }

  #[tokio::test]
  async fn region_name_mismatch_skips_the_row() {
    let s = store().await;
    let renamed = "11;IDF;92;2;99;012;Boulogne-Billancourt;120 071;1 533;121 604";
    let report = Importer::new(&s, DedupScope::Name)
      .run_bytes(&csv(&[PARIS, renamed]))
      .await
      .unwrap();

    assert_eq!(report.cities_inserted, 1);
    assert_eq!(report.inconsistent_rejects, 1);
    assert_eq!(report.departments_created, 1);

    let region = s.find_region_by_code("11").await.unwrap().unwrap();
    assert_eq!(region.nom, "Île-de-France");
    assert!(!s.exists_city_by_name("Boulogne-Billancourt").await.unwrap());
    assert!(s.find_department_by_code("92").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn bad_rows_are_skipped_and_counted() {
    let s = store().await;
    let report = Importer::new(&s, DedupScope::Name)
      .run_bytes(&csv(&[
        "11;Île-de-France;75",
        "11;Île-de-France;75;1;99;056;Paris;beaucoup;0;1",
        "",
        MONTPELLIER,
      ]))
      .await
      .unwrap();

    assert_eq!(report.rows_read, 3);
    assert_eq!(report.parse_rejects, 2);
    assert_eq!(report.cities_inserted, 1);
    assert!(s.exists_city_by_name("Montpellier").await.unwrap());
  }

  #[tokio::test]
  async fn reingesting_the_same_file_inserts_nothing() {
    let s = store().await;
    let input = csv(&[PARIS, BOULOGNE, MONTPELLIER]);

    let first = Importer::new(&s, DedupScope::Name).run_bytes(&input).await.unwrap();
    let second = Importer::new(&s, DedupScope::Name).run_bytes(&input).await.unwrap();

    assert_eq!(first.cities_inserted, 3);
    assert_eq!(second.cities_inserted, 0);
    assert_eq!(second.cities_existing, 3);
    assert_eq!(second.regions_created, 0);
    assert_eq!(second.departments_created, 0);

    let page = s.list_cities(PageRequest::default()).await.unwrap();
    assert_eq!(page.total_elements, 3);
  }

  #[tokio::test]
  async fn dedup_scope_decides_homonyms() {
    let a = "84;Auvergne-Rhône-Alpes;01;1;01;001;Saint-Denis;100;0;100";
    let b = "84;Auvergne-Rhône-Alpes;69;1;01;002;Saint-Denis;200;0;200";

    let s = store().await;
    let global = Importer::new(&s, DedupScope::Name)
      .run_bytes(&csv(&[a, b]))
      .await
      .unwrap();
    assert_eq!(global.cities_inserted, 1);
    assert_eq!(global.cities_existing, 1);

    let s = store().await;
    let scoped = Importer::new(&s, DedupScope::NameAndDepartment)
      .run_bytes(&csv(&[a, b]))
      .await
      .unwrap();
    assert_eq!(scoped.cities_inserted, 2);
  }

  #[tokio::test]
  async fn every_city_has_department_and_region() {
    let s = store().await;
    Importer::new(&s, DedupScope::Name)
      .run_bytes(&csv(&[PARIS, BOULOGNE, MONTPELLIER]))
      .await
      .unwrap();

    let cities = s.list_cities(PageRequest::default()).await.unwrap();
    for city in cities.content {
      let dept = s.get_department(city.department_id).await.unwrap().unwrap();
      let region_id = dept.region_id.unwrap();
      assert!(s.get_region(region_id).await.unwrap().is_some());
      assert_eq!(city.nb_habitants, city.population_totale);
    }
  }

  #[tokio::test]
  async fn reads_from_a_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&csv(&[PARIS])).unwrap();

    let s = store().await;
    let report = Importer::new(&s, DedupScope::Name).run(file.path()).await.unwrap();
    assert_eq!(report.cities_inserted, 1);
  }

  #[tokio::test]
  async fn missing_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let s = store().await;
    let err = Importer::new(&s, DedupScope::Name)
      .run(dir.path().join("absent.csv"))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Read { .. }));
  }

  #[tokio::test]
  async fn undecodable_header_is_fatal() {
    let mut input = b"Code r\xe9gion;Nom de la r\xe9gion\n".to_vec();
    input.extend_from_slice(PARIS.as_bytes());
    input.push(b'\n');

    let s = store().await;
    let err = Importer::new(&s, DedupScope::Name)
      .run_bytes(&input)
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Header(_)));
    assert!(!s.exists_city_by_name("Paris").await.unwrap());
  }

  #[tokio::test]
  async fn empty_input_is_fatal() {
    let s = store().await;
    let err = Importer::new(&s, DedupScope::Name)
      .run_bytes(b"")
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Header(_)));
  }
}
