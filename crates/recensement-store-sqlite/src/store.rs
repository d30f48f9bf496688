//! [`SqliteStore`]: the SQLite implementation of [`GeoStore`].

use std::path::Path;

use recensement_core::{
  model::{
    City, CityUpdate, Department, NewCity, NewDepartment, NewRegion, Region,
  },
  page::{Page, PageRequest},
  store::GeoStore,
};
use rusqlite::{OptionalExtension as _, types::Value};

use crate::{
  Result,
  encode::{
    CITY_COLUMNS, DEPARTMENT_COLUMNS, REGION_COLUMNS, RawCity, clamp_bound,
    decode_cities, decode_count, department_from_row, encode_count,
    region_from_row,
  },
  schema::SCHEMA,
};

fn text(s: &str) -> Value { Value::Text(s.to_owned()) }

fn int(i: i64) -> Value { Value::Integer(i) }

// ─── Store ───────────────────────────────────────────────────────────────────

/// A census store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_owned();
    tracing::debug!(path = %path.display(), "opening census store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Query helpers ──

  async fn query_all<T, F>(
    &self,
    sql: String,
    params: Vec<Value>,
    map: F,
  ) -> Result<Vec<T>>
  where
    T: Send + 'static,
    F: FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T> + Send + 'static,
  {
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), map)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn query_opt<T, F>(
    &self,
    sql: String,
    params: Vec<Value>,
    map: F,
  ) -> Result<Option<T>>
  where
    T: Send + 'static,
    F: FnOnce(&rusqlite::Row<'_>) -> rusqlite::Result<T> + Send + 'static,
  {
    let row = self
      .conn
      .call(move |conn| {
        let row = conn
          .query_row(&sql, rusqlite::params_from_iter(params), map)
          .optional()?;
        Ok(row)
      })
      .await?;
    Ok(row)
  }

  async fn query_exists(
    &self,
    filter: &'static str,
    params: Vec<Value>,
  ) -> Result<bool> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {filter})");
    let found = self
      .conn
      .call(move |conn| {
        let found: bool = conn.query_row(
          &sql,
          rusqlite::params_from_iter(params),
          |r| r.get(0),
        )?;
        Ok(found)
      })
      .await?;
    Ok(found)
  }

  async fn select_regions(
    &self,
    filter: &str,
    params: Vec<Value>,
  ) -> Result<Vec<Region>> {
    let sql = format!("SELECT {REGION_COLUMNS} FROM regions {filter}");
    self.query_all(sql, params, region_from_row).await
  }

  async fn select_departments(
    &self,
    filter: &str,
    params: Vec<Value>,
  ) -> Result<Vec<Department>> {
    let sql = format!("SELECT {DEPARTMENT_COLUMNS} FROM departments {filter}");
    self.query_all(sql, params, department_from_row).await
  }

  async fn select_cities(
    &self,
    filter: &str,
    params: Vec<Value>,
  ) -> Result<Vec<City>> {
    let sql = format!("SELECT {CITY_COLUMNS} FROM cities {filter}");
    decode_cities(self.query_all(sql, params, RawCity::from_row).await?)
  }

  async fn select_city(
    &self,
    filter: &str,
    params: Vec<Value>,
  ) -> Result<Option<City>> {
    let sql = format!("SELECT {CITY_COLUMNS} FROM cities {filter}");
    self
      .query_opt(sql, params, RawCity::from_row)
      .await?
      .map(RawCity::into_city)
      .transpose()
  }
}

// ─── GeoStore impl ───────────────────────────────────────────────────────────

impl GeoStore for SqliteStore {
  type Error = crate::Error;

  // ── Regions ──

  async fn insert_region(&self, input: NewRegion) -> Result<Region> {
    let (code, nom) = (input.code.clone(), input.nom.clone());
    let id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO regions (code, nom) VALUES (?1, ?2)",
          rusqlite::params![code, nom],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
      })
      .await?;
    Ok(Region { id, code: input.code, nom: input.nom })
  }

  async fn get_region(&self, id: i64) -> Result<Option<Region>> {
    let sql = format!("SELECT {REGION_COLUMNS} FROM regions WHERE id = ?1");
    self.query_opt(sql, vec![int(id)], region_from_row).await
  }

  async fn find_region_by_code<'a>(
    &'a self,
    code: &'a str,
  ) -> Result<Option<Region>> {
    let sql = format!("SELECT {REGION_COLUMNS} FROM regions WHERE code = ?1");
    self.query_opt(sql, vec![text(code)], region_from_row).await
  }

  async fn find_region_by_name<'a>(
    &'a self,
    nom: &'a str,
  ) -> Result<Option<Region>> {
    let sql = format!(
      "SELECT {REGION_COLUMNS} FROM regions WHERE nom = ?1 ORDER BY id LIMIT 1"
    );
    self.query_opt(sql, vec![text(nom)], region_from_row).await
  }

  async fn exists_region_by_code<'a>(&'a self, code: &'a str) -> Result<bool> {
    self.query_exists("regions WHERE code = ?1", vec![text(code)]).await
  }

  async fn exists_region_by_name<'a>(&'a self, nom: &'a str) -> Result<bool> {
    self.query_exists("regions WHERE nom = ?1", vec![text(nom)]).await
  }

  async fn list_regions(&self) -> Result<Vec<Region>> {
    self.select_regions("ORDER BY id", Vec::new()).await
  }

  async fn update_region(
    &self,
    id: i64,
    input: NewRegion,
  ) -> Result<Option<Region>> {
    let (code, nom) = (input.code.clone(), input.nom.clone());
    let changed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let n = tx.execute(
          "UPDATE regions SET code = ?1, nom = ?2 WHERE id = ?3",
          rusqlite::params![code, nom, id],
        )?;
        tx.commit()?;
        Ok(n)
      })
      .await?;
    Ok((changed > 0).then(|| Region { id, code: input.code, nom: input.nom }))
  }

  async fn delete_region(&self, id: i64) -> Result<bool> {
    let removed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM cities WHERE department_id IN \
           (SELECT id FROM departments WHERE region_id = ?1)",
          rusqlite::params![id],
        )?;
        tx.execute(
          "DELETE FROM departments WHERE region_id = ?1",
          rusqlite::params![id],
        )?;
        let n =
          tx.execute("DELETE FROM regions WHERE id = ?1", rusqlite::params![id])?;
        tx.commit()?;
        Ok(n)
      })
      .await?;
    Ok(removed > 0)
  }

  async fn delete_all_regions(&self) -> Result<u64> {
    let removed = self
      .conn
      .call(|conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM cities", [])?;
        tx.execute("DELETE FROM departments", [])?;
        let n = tx.execute("DELETE FROM regions", [])?;
        tx.commit()?;
        Ok(n)
      })
      .await?;
    Ok(removed as u64)
  }

  // ── Departments ──

  async fn insert_department(&self, input: NewDepartment) -> Result<Department> {
    let code = input.code.clone();
    let region_id = input.region_id;
    let id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO departments (code, region_id) VALUES (?1, ?2)",
          rusqlite::params![code, region_id],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
      })
      .await?;
    Ok(Department { id, code: input.code, region_id })
  }

  async fn get_department(&self, id: i64) -> Result<Option<Department>> {
    let sql =
      format!("SELECT {DEPARTMENT_COLUMNS} FROM departments WHERE id = ?1");
    self.query_opt(sql, vec![int(id)], department_from_row).await
  }

  async fn find_department_by_code<'a>(
    &'a self,
    code: &'a str,
  ) -> Result<Option<Department>> {
    let sql =
      format!("SELECT {DEPARTMENT_COLUMNS} FROM departments WHERE code = ?1");
    self.query_opt(sql, vec![text(code)], department_from_row).await
  }

  async fn exists_department_by_code<'a>(
    &'a self,
    code: &'a str,
  ) -> Result<bool> {
    self.query_exists("departments WHERE code = ?1", vec![text(code)]).await
  }

  async fn list_departments(&self) -> Result<Vec<Department>> {
    self.select_departments("ORDER BY id", Vec::new()).await
  }

  async fn update_department(
    &self,
    id: i64,
    input: NewDepartment,
  ) -> Result<Option<Department>> {
    let code = input.code.clone();
    let region_id = input.region_id;
    let changed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let n = tx.execute(
          "UPDATE departments SET code = ?1, region_id = ?2 WHERE id = ?3",
          rusqlite::params![code, region_id, id],
        )?;
        tx.commit()?;
        Ok(n)
      })
      .await?;
    Ok((changed > 0).then(|| Department { id, code: input.code, region_id }))
  }

  async fn delete_department(&self, id: i64) -> Result<bool> {
    let removed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM cities WHERE department_id = ?1",
          rusqlite::params![id],
        )?;
        let n = tx.execute(
          "DELETE FROM departments WHERE id = ?1",
          rusqlite::params![id],
        )?;
        tx.commit()?;
        Ok(n)
      })
      .await?;
    Ok(removed > 0)
  }

  // ── Cities: writes ──

  async fn insert_city(&self, input: NewCity) -> Result<City> {
    let raw = RawCity::encode(&input)?;
    let id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO cities (
             nom, nb_habitants, code_arrondissement, code_canton, code_commune,
             population_municipale, population_comptee_a_part,
             population_totale, department_id
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            raw.nom,
            raw.nb_habitants,
            raw.code_arrondissement,
            raw.code_canton,
            raw.code_commune,
            raw.population_municipale,
            raw.population_comptee_a_part,
            raw.population_totale,
            raw.department_id,
          ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
      })
      .await?;

    Ok(City {
      id,
      nom: input.nom,
      nb_habitants: input.nb_habitants,
      code_arrondissement: input.code_arrondissement,
      code_canton: input.code_canton,
      code_commune: input.code_commune,
      population_municipale: input.population_municipale,
      population_comptee_a_part: input.population_comptee_a_part,
      population_totale: input.population_totale,
      department_id: input.department_id,
    })
  }

  async fn update_city(&self, id: i64, update: CityUpdate) -> Result<Option<City>> {
    let nb_habitants = encode_count(update.nb_habitants)?;
    let select = format!("SELECT {CITY_COLUMNS} FROM cities WHERE id = ?1");
    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let n = tx.execute(
          "UPDATE cities SET nom = ?1, nb_habitants = ?2 WHERE id = ?3",
          rusqlite::params![update.nom, nb_habitants, id],
        )?;
        if n == 0 {
          return Ok(None);
        }
        let raw =
          tx.query_row(&select, rusqlite::params![id], RawCity::from_row)?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;
    raw.map(RawCity::into_city).transpose()
  }

  async fn delete_city(&self, id: i64) -> Result<bool> {
    let removed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let n =
          tx.execute("DELETE FROM cities WHERE id = ?1", rusqlite::params![id])?;
        tx.commit()?;
        Ok(n)
      })
      .await?;
    Ok(removed > 0)
  }

  // ── Cities: lookups ──

  async fn get_city(&self, id: i64) -> Result<Option<City>> {
    self.select_city("WHERE id = ?1", vec![int(id)]).await
  }

  async fn find_city_by_name<'a>(&'a self, nom: &'a str) -> Result<Option<City>> {
    self
      .select_city("WHERE nom = ?1 ORDER BY id LIMIT 1", vec![text(nom)])
      .await
  }

  async fn exists_city_by_name<'a>(&'a self, nom: &'a str) -> Result<bool> {
    self.query_exists("cities WHERE nom = ?1", vec![text(nom)]).await
  }

  async fn exists_city_by_name_and_department<'a>(
    &'a self,
    nom: &'a str,
    department_id: i64,
  ) -> Result<bool> {
    self
      .query_exists(
        "cities WHERE nom = ?1 AND department_id = ?2",
        vec![text(nom), int(department_id)],
      )
      .await
  }

  // ── Cities: scans ──

  async fn list_cities(&self, request: PageRequest) -> Result<Page<City>> {
    let limit = i64::from(request.size);
    let offset = encode_count(request.offset())?;
    let select =
      format!("SELECT {CITY_COLUMNS} FROM cities ORDER BY id LIMIT ?1 OFFSET ?2");

    let (total, raws) = self
      .conn
      .call(move |conn| {
        // Count and slice under one read transaction so they agree.
        let tx = conn.transaction()?;
        let total: i64 =
          tx.query_row("SELECT COUNT(*) FROM cities", [], |r| r.get(0))?;
        let mut stmt = tx.prepare(&select)?;
        let raws = stmt
          .query_map(rusqlite::params![limit, offset], RawCity::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        drop(stmt);
        tx.commit()?;
        Ok((total, raws))
      })
      .await?;

    Ok(Page::new(decode_cities(raws)?, request, decode_count(total)?))
  }

  async fn cities_by_name_prefix<'a>(
    &'a self,
    prefix: &'a str,
  ) -> Result<Vec<City>> {
    // `LIKE` ignores ASCII case; compare the leading substring instead.
    self
      .select_cities(
        "WHERE substr(nom, 1, length(?1)) = ?1 ORDER BY id",
        vec![text(prefix)],
      )
      .await
  }

  async fn cities_by_population_greater_than(&self, min: u64) -> Result<Vec<City>> {
    self
      .select_cities(
        "WHERE nb_habitants > ?1 ORDER BY id",
        vec![int(clamp_bound(min))],
      )
      .await
  }

  async fn cities_by_population_between(
    &self,
    min: u64,
    max: u64,
  ) -> Result<Vec<City>> {
    self
      .select_cities(
        "WHERE nb_habitants BETWEEN ?1 AND ?2 ORDER BY id",
        vec![int(clamp_bound(min)), int(clamp_bound(max))],
      )
      .await
  }

  async fn cities_by_department_and_population_greater_than(
    &self,
    department_id: i64,
    min: u64,
  ) -> Result<Vec<City>> {
    self
      .select_cities(
        "WHERE department_id = ?1 AND nb_habitants > ?2 ORDER BY id",
        vec![int(department_id), int(clamp_bound(min))],
      )
      .await
  }

  async fn cities_by_department_and_population_between(
    &self,
    department_id: i64,
    min: u64,
    max: u64,
  ) -> Result<Vec<City>> {
    self
      .select_cities(
        "WHERE department_id = ?1 AND nb_habitants BETWEEN ?2 AND ?3 \
         ORDER BY id",
        vec![
          int(department_id),
          int(clamp_bound(min)),
          int(clamp_bound(max)),
        ],
      )
      .await
  }

  async fn cities_by_department_sorted_by_population_desc(
    &self,
    department_id: i64,
    limit: u32,
  ) -> Result<Vec<City>> {
    self
      .select_cities(
        "WHERE department_id = ?1 ORDER BY nb_habitants DESC, id ASC LIMIT ?2",
        vec![int(department_id), int(i64::from(limit))],
      )
      .await
  }

  async fn cities_by_department(&self, department_id: i64) -> Result<Vec<City>> {
    self
      .select_cities("WHERE department_id = ?1 ORDER BY id", vec![int(department_id)])
      .await
  }
}
