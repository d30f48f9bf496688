//! [`CensusService`]: business-level queries over any [`GeoStore`].
//!
//! The service validates input, resolves parents (by id or by code) into
//! persisted rows before delegating to the store, and turns empty filter
//! results and unique-key collisions into domain errors.

use std::sync::Arc;

use tracing::warn;

use crate::{
  Entity, Error, Result,
  directory::DepartmentDirectory,
  model::{
    City, CityDraft, CityUpdate, Department, NewDepartment, NewRegion, Region,
  },
  page::{Page, PageRequest},
  store::{GeoStore, StoreError},
  validate,
  view::CityRow,
};

fn store_error<E: StoreError>(e: E) -> Error { Error::Store(Box::new(e)) }

/// Map a failed write: unique-key violations become [`Error::Duplicate`].
fn write_error<E: StoreError>(
  e: E,
  entity: Entity,
  detail: impl FnOnce() -> String,
) -> Error {
  if e.is_duplicate_key() {
    Error::duplicate(entity, detail())
  } else {
    store_error(e)
  }
}

/// Fail with [`Error::NotFound`] when a filtered query matched nothing.
fn non_empty(
  cities: Vec<City>,
  detail: impl FnOnce() -> String,
) -> Result<Vec<City>> {
  if cities.is_empty() {
    Err(Error::not_found(Entity::City, detail()))
  } else {
    Ok(cities)
  }
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// Stateless query layer. The store is reference-counted.
pub struct CensusService<S> {
  store: Arc<S>,
}

impl<S> Clone for CensusService<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: GeoStore> CensusService<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  pub fn store(&self) -> &S { &self.store }

  // ── Regions ───────────────────────────────────────────────────────────

  pub async fn list_regions(&self) -> Result<Vec<Region>> {
    self.store.list_regions().await.map_err(store_error)
  }

  pub async fn get_region(&self, id: i64) -> Result<Region> {
    self
      .store
      .get_region(id)
      .await
      .map_err(store_error)?
      .ok_or_else(|| Error::not_found(Entity::Region, format!("region {id} not found")))
  }

  pub async fn region_by_code(&self, code: &str) -> Result<Region> {
    self
      .store
      .find_region_by_code(code)
      .await
      .map_err(store_error)?
      .ok_or_else(|| {
        Error::not_found(Entity::Region, format!("no region with code {code:?}"))
      })
  }

  pub async fn region_by_name(&self, nom: &str) -> Result<Region> {
    self
      .store
      .find_region_by_name(nom)
      .await
      .map_err(store_error)?
      .ok_or_else(|| {
        Error::not_found(Entity::Region, format!("no region named {nom:?}"))
      })
  }

  pub async fn create_region(&self, input: NewRegion) -> Result<Region> {
    validate::region(&input)?;
    let code = input.code.clone();
    let taken = self
      .store
      .exists_region_by_code(&code)
      .await
      .map_err(store_error)?;
    if taken {
      return Err(Error::duplicate(
        Entity::Region,
        format!("region with code {code:?} already exists"),
      ));
    }
    self
      .store
      .insert_region(input)
      .await
      .map_err(|e| {
        write_error(e, Entity::Region, || format!("region with code {code:?} already exists"))
      })
  }

  pub async fn update_region(&self, id: i64, input: NewRegion) -> Result<Region> {
    validate::region(&input)?;
    let code = input.code.clone();
    self
      .store
      .update_region(id, input)
      .await
      .map_err(|e| {
        write_error(e, Entity::Region, || format!("region with code {code:?} already exists"))
      })?
      .ok_or_else(|| Error::not_found(Entity::Region, format!("region {id} not found")))
  }

  /// Delete a region and, transitively, its departments and cities.
  pub async fn delete_region(&self, id: i64) -> Result<()> {
    let deleted = self.store.delete_region(id).await.map_err(store_error)?;
    if !deleted {
      return Err(Error::not_found(Entity::Region, format!("region {id} not found")));
    }
    Ok(())
  }

  pub async fn delete_all_regions(&self) -> Result<u64> {
    self.store.delete_all_regions().await.map_err(store_error)
  }

  // ── Departments ───────────────────────────────────────────────────────

  pub async fn list_departments(&self) -> Result<Vec<Department>> {
    self.store.list_departments().await.map_err(store_error)
  }

  pub async fn get_department(&self, id: i64) -> Result<Department> {
    self
      .store
      .get_department(id)
      .await
      .map_err(store_error)?
      .ok_or_else(|| {
        Error::not_found(Entity::Department, format!("department {id} not found"))
      })
  }

  pub async fn department_by_code(&self, code: &str) -> Result<Department> {
    self
      .store
      .find_department_by_code(code)
      .await
      .map_err(store_error)?
      .ok_or_else(|| {
        Error::not_found(
          Entity::Department,
          format!("no department with code {code:?}"),
        )
      })
  }

  /// Verify that the referenced region, if any, exists.
  async fn check_region_ref(&self, region_id: Option<i64>) -> Result<()> {
    let Some(region_id) = region_id else {
      return Ok(());
    };
    let region = self.store.get_region(region_id).await.map_err(store_error)?;
    if region.is_none() {
      return Err(Error::dependency_missing(
        Entity::Region,
        format!("region {region_id} does not exist"),
      ));
    }
    Ok(())
  }

  pub async fn create_department(&self, input: NewDepartment) -> Result<Department> {
    validate::department(&input)?;
    let code = input.code.clone();
    let taken = self
      .store
      .exists_department_by_code(&code)
      .await
      .map_err(store_error)?;
    if taken {
      return Err(Error::duplicate(
        Entity::Department,
        format!("department with code {code:?} already exists"),
      ));
    }
    self.check_region_ref(input.region_id).await?;
    self
      .store
      .insert_department(input)
      .await
      .map_err(|e| {
        write_error(e, Entity::Department, || format!("department with code {code:?} already exists"))
      })
  }

  /// Replace the department's code and region.
  pub async fn update_department(
    &self,
    id: i64,
    input: NewDepartment,
  ) -> Result<Department> {
    validate::department(&input)?;
    self.check_region_ref(input.region_id).await?;
    let code = input.code.clone();
    self
      .store
      .update_department(id, input)
      .await
      .map_err(|e| {
        write_error(e, Entity::Department, || format!("department with code {code:?} already exists"))
      })?
      .ok_or_else(|| {
        Error::not_found(Entity::Department, format!("department {id} not found"))
      })
  }

  pub async fn delete_department(&self, id: i64) -> Result<()> {
    let deleted = self.store.delete_department(id).await.map_err(store_error)?;
    if !deleted {
      return Err(Error::not_found(
        Entity::Department,
        format!("department {id} not found"),
      ));
    }
    Ok(())
  }

  // ── Cities: CRUD ─────────────────────────────────────────────────────

  /// Paginated listing in id order. An empty page is not an error.
  pub async fn list_cities(&self, request: PageRequest) -> Result<Page<City>> {
    validate::page_size(request.size)?;
    self.store.list_cities(request).await.map_err(store_error)
  }

  pub async fn get_city(&self, id: i64) -> Result<City> {
    self
      .store
      .get_city(id)
      .await
      .map_err(store_error)?
      .ok_or_else(|| Error::not_found(Entity::City, format!("city {id} not found")))
  }

  pub async fn city_by_name(&self, nom: &str) -> Result<City> {
    self
      .store
      .find_city_by_name(nom)
      .await
      .map_err(store_error)?
      .ok_or_else(|| Error::not_found(Entity::City, format!("no city named {nom:?}")))
  }

  /// Create a city from a caller-supplied draft.
  ///
  /// The draft's department reference is replaced by the persisted
  /// department before insertion; a missing or unknown reference is a
  /// [`Error::DependencyMissing`].
  pub async fn create_city(&self, draft: CityDraft) -> Result<City> {
    validate::city_draft(&draft)?;

    let department_id = draft.department_id.ok_or_else(|| {
      Error::dependency_missing(Entity::Department, "department is missing")
    })?;
    let department = self
      .store
      .get_department(department_id)
      .await
      .map_err(store_error)?
      .ok_or_else(|| {
        Error::dependency_missing(
          Entity::Department,
          format!("department {department_id} does not exist"),
        )
      })?;

    let nom = draft.nom.clone();
    let exists = self
      .store
      .exists_city_by_name_and_department(&nom, department.id)
      .await
      .map_err(store_error)?;
    if exists {
      return Err(Error::duplicate(
        Entity::City,
        format!("city {nom:?} already exists in department {}", department.code),
      ));
    }

    let code = department.code.clone();
    self
      .store
      .insert_city(draft.resolve(department.id))
      .await
      .map_err(|e| {
        write_error(e, Entity::City, || format!("city {nom:?} already exists in department {code}"))
      })
  }

  /// Change the name and population of a city. Census fields are immutable.
  pub async fn update_city(&self, id: i64, update: CityUpdate) -> Result<City> {
    validate::city_update(&update)?;
    let nom = update.nom.clone();
    self
      .store
      .update_city(id, update)
      .await
      .map_err(|e| {
        write_error(e, Entity::City, || format!("city {nom:?} already exists in this department"))
      })?
      .ok_or_else(|| Error::not_found(Entity::City, format!("city {id} not found")))
  }

  pub async fn delete_city(&self, id: i64) -> Result<()> {
    let deleted = self.store.delete_city(id).await.map_err(store_error)?;
    if !deleted {
      return Err(Error::not_found(Entity::City, format!("city {id} not found")));
    }
    Ok(())
  }

  // ── Cities: by department id ─────────────────────────────────────────

  /// The `n` most populated cities of the department with id
  /// `department_id`. May be empty.
  pub async fn top_cities_of_department(
    &self,
    department_id: i64,
    n: u32,
  ) -> Result<Vec<City>> {
    validate::top_n(n)?;
    let department = self.get_department(department_id).await?;
    self
      .store
      .cities_by_department_sorted_by_population_desc(department.id, n)
      .await
      .map_err(store_error)
  }

  pub async fn cities_of_department_in_range(
    &self,
    department_id: i64,
    min: u64,
    max: u64,
  ) -> Result<Vec<City>> {
    validate::range(min, max)?;
    let department = self.get_department(department_id).await?;
    let cities = self
      .store
      .cities_by_department_and_population_between(department.id, min, max)
      .await
      .map_err(store_error)?;
    non_empty(cities, || {
      format!(
        "no city of department {} has a population between {min} and {max}",
        department.code
      )
    })
  }

  // ── Cities: searches ─────────────────────────────────────────────────

  pub async fn search_by_prefix(&self, prefix: &str) -> Result<Vec<City>> {
    if prefix.is_empty() {
      return Err(Error::Validation("prefix must not be empty".into()));
    }
    let cities = self
      .store
      .cities_by_name_prefix(prefix)
      .await
      .map_err(store_error)?;
    non_empty(cities, || format!("no city name starts with {prefix:?}"))
  }

  pub async fn search_by_min_population(&self, min: u64) -> Result<Vec<City>> {
    let cities = self
      .store
      .cities_by_population_greater_than(min)
      .await
      .map_err(store_error)?;
    non_empty(cities, || format!("no city has a population above {min}"))
  }

  pub async fn search_by_population_range(
    &self,
    min: u64,
    max: u64,
  ) -> Result<Vec<City>> {
    validate::range(min, max)?;
    let cities = self
      .store
      .cities_by_population_between(min, max)
      .await
      .map_err(store_error)?;
    non_empty(cities, || {
      format!("no city has a population between {min} and {max}")
    })
  }

  pub async fn search_by_department_and_min_population(
    &self,
    department_code: &str,
    min: u64,
  ) -> Result<Vec<City>> {
    let department = self.department_by_code(department_code).await?;
    let cities = self
      .store
      .cities_by_department_and_population_greater_than(department.id, min)
      .await
      .map_err(store_error)?;
    non_empty(cities, || {
      format!(
        "no city of department {department_code} has a population above {min}"
      )
    })
  }

  pub async fn search_by_department_and_population_range(
    &self,
    department_code: &str,
    min: u64,
    max: u64,
  ) -> Result<Vec<City>> {
    validate::range(min, max)?;
    let department = self.department_by_code(department_code).await?;
    let cities = self
      .store
      .cities_by_department_and_population_between(department.id, min, max)
      .await
      .map_err(store_error)?;
    non_empty(cities, || {
      format!(
        "no city of department {department_code} has a population between {min} and {max}"
      )
    })
  }

  pub async fn top_n_by_department_code(
    &self,
    department_code: &str,
    n: u32,
  ) -> Result<Vec<City>> {
    validate::top_n(n)?;
    let department = self.department_by_code(department_code).await?;
    self
      .store
      .cities_by_department_sorted_by_population_desc(department.id, n)
      .await
      .map_err(store_error)
  }

  /// All cities of the department with `department_code`, in id order.
  pub async fn cities_of_department_code(
    &self,
    department_code: &str,
  ) -> Result<(Department, Vec<City>)> {
    let department = self.department_by_code(department_code).await?;
    let cities = self
      .store
      .cities_by_department(department.id)
      .await
      .map_err(store_error)?;
    Ok((department, cities))
  }

  // ── Reports ───────────────────────────────────────────────────────────

  /// Build the report row of one city, with the department name fetched
  /// from `directory`. A directory failure is an [`Error::External`].
  pub async fn city_details<D: DepartmentDirectory>(
    &self,
    id: i64,
    directory: &D,
  ) -> Result<CityRow> {
    let city = self.get_city(id).await?;
    let department = self.get_department(city.department_id).await?;
    let info = directory
      .lookup(&department.code)
      .await
      .map_err(|e| Error::External(e.to_string()))?;
    Ok(CityRow::new(&city, &department, Some(info.nom)))
  }

  /// Report rows for every city of a department. The department name is
  /// looked up once; if the directory is unavailable the rows carry no name.
  pub async fn department_report<D: DepartmentDirectory>(
    &self,
    department_code: &str,
    directory: &D,
  ) -> Result<Vec<CityRow>> {
    let (department, cities) = self.cities_of_department_code(department_code).await?;
    let nom_departement = match directory.lookup(&department.code).await {
      Ok(info) => Some(info.nom),
      Err(e) => {
        warn!(code = %department.code, error = %e, "department name lookup failed");
        None
      }
    };
    Ok(
      cities
        .iter()
        .map(|city| CityRow::new(city, &department, nom_departement.clone()))
        .collect(),
    )
  }
}
