//! The `GeoStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `recensement-store-sqlite`). Higher layers (the query service, the
//! importer) depend on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  model::{
    City, CityUpdate, Department, NewCity, NewDepartment, NewRegion, Region,
  },
  page::{Page, PageRequest},
};

/// Backend errors must say whether they were caused by a unique constraint,
/// so that callers can report a duplicate instead of a generic failure.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn is_duplicate_key(&self) -> bool;
}

/// Abstraction over a census store backend.
///
/// Every mutating method is atomic. Parents are referenced by id and must
/// already exist; the store never resolves partial references.
///
/// All list methods return rows ordered by id ascending unless documented
/// otherwise.
pub trait GeoStore: Send + Sync {
  type Error: StoreError;

  // ── Regions ───────────────────────────────────────────────────────────

  /// Persist a region. Fails with a duplicate-key error if the code is taken.
  fn insert_region(
    &self,
    input: NewRegion,
  ) -> impl Future<Output = Result<Region, Self::Error>> + Send + '_;

  fn get_region(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Region>, Self::Error>> + Send + '_;

  fn find_region_by_code<'a>(
    &'a self,
    code: &'a str,
  ) -> impl Future<Output = Result<Option<Region>, Self::Error>> + Send + 'a;

  fn find_region_by_name<'a>(
    &'a self,
    nom: &'a str,
  ) -> impl Future<Output = Result<Option<Region>, Self::Error>> + Send + 'a;

  fn exists_region_by_code<'a>(
    &'a self,
    code: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn exists_region_by_name<'a>(
    &'a self,
    nom: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn list_regions(
    &self,
  ) -> impl Future<Output = Result<Vec<Region>, Self::Error>> + Send + '_;

  /// Replace `code` and `nom`. Returns `None` if the region does not exist.
  fn update_region(
    &self,
    id: i64,
    input: NewRegion,
  ) -> impl Future<Output = Result<Option<Region>, Self::Error>> + Send + '_;

  /// Delete a region together with its departments and their cities.
  /// Returns `false` if the region did not exist.
  fn delete_region(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete every region, department and city. Returns the number of regions
  /// removed.
  fn delete_all_regions(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Departments ───────────────────────────────────────────────────────

  /// Persist a department. Fails with a duplicate-key error if the code is
  /// taken.
  fn insert_department(
    &self,
    input: NewDepartment,
  ) -> impl Future<Output = Result<Department, Self::Error>> + Send + '_;

  fn get_department(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Department>, Self::Error>> + Send + '_;

  fn find_department_by_code<'a>(
    &'a self,
    code: &'a str,
  ) -> impl Future<Output = Result<Option<Department>, Self::Error>> + Send + 'a;

  fn exists_department_by_code<'a>(
    &'a self,
    code: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn list_departments(
    &self,
  ) -> impl Future<Output = Result<Vec<Department>, Self::Error>> + Send + '_;

  /// Replace `code` and `region_id`. Returns `None` if the department does
  /// not exist.
  fn update_department(
    &self,
    id: i64,
    input: NewDepartment,
  ) -> impl Future<Output = Result<Option<Department>, Self::Error>> + Send + '_;

  /// Delete a department and its cities. Returns `false` if it did not exist.
  fn delete_department(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Cities: writes ───────────────────────────────────────────────────

  /// Persist a city. Fails with a duplicate-key error if the department
  /// already has a city with this name.
  fn insert_city(
    &self,
    input: NewCity,
  ) -> impl Future<Output = Result<City, Self::Error>> + Send + '_;

  /// Apply a name/population change. Returns `None` if the city does not
  /// exist.
  fn update_city(
    &self,
    id: i64,
    update: CityUpdate,
  ) -> impl Future<Output = Result<Option<City>, Self::Error>> + Send + '_;

  /// Returns `false` if the city did not exist.
  fn delete_city(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Cities: lookups ──────────────────────────────────────────────────

  fn get_city(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<City>, Self::Error>> + Send + '_;

  /// First city (lowest id) with exactly this name.
  fn find_city_by_name<'a>(
    &'a self,
    nom: &'a str,
  ) -> impl Future<Output = Result<Option<City>, Self::Error>> + Send + 'a;

  fn exists_city_by_name<'a>(
    &'a self,
    nom: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn exists_city_by_name_and_department<'a>(
    &'a self,
    nom: &'a str,
    department_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Cities: scans ────────────────────────────────────────────────────

  fn list_cities(
    &self,
    request: PageRequest,
  ) -> impl Future<Output = Result<Page<City>, Self::Error>> + Send + '_;

  /// Case-sensitive prefix match on the city name.
  fn cities_by_name_prefix<'a>(
    &'a self,
    prefix: &'a str,
  ) -> impl Future<Output = Result<Vec<City>, Self::Error>> + Send + 'a;

  /// Cities with `nb_habitants > min`.
  fn cities_by_population_greater_than(
    &self,
    min: u64,
  ) -> impl Future<Output = Result<Vec<City>, Self::Error>> + Send + '_;

  /// Cities with `min <= nb_habitants <= max`.
  fn cities_by_population_between(
    &self,
    min: u64,
    max: u64,
  ) -> impl Future<Output = Result<Vec<City>, Self::Error>> + Send + '_;

  fn cities_by_department_and_population_greater_than(
    &self,
    department_id: i64,
    min: u64,
  ) -> impl Future<Output = Result<Vec<City>, Self::Error>> + Send + '_;

  fn cities_by_department_and_population_between(
    &self,
    department_id: i64,
    min: u64,
    max: u64,
  ) -> impl Future<Output = Result<Vec<City>, Self::Error>> + Send + '_;

  /// At most `limit` cities of the department, most populated first; ties
  /// are broken by id ascending.
  fn cities_by_department_sorted_by_population_desc(
    &self,
    department_id: i64,
    limit: u32,
  ) -> impl Future<Output = Result<Vec<City>, Self::Error>> + Send + '_;

  fn cities_by_department(
    &self,
    department_id: i64,
  ) -> impl Future<Output = Result<Vec<City>, Self::Error>> + Send + '_;
}
