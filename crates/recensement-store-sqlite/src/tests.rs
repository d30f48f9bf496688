//! Integration tests for `SqliteStore` against an in-memory database.

use recensement_core::{
  model::{CityUpdate, NewCity, NewDepartment, NewRegion},
  page::PageRequest,
  store::{GeoStore, StoreError as _},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn region(code: &str, nom: &str) -> NewRegion {
  NewRegion { code: code.into(), nom: nom.into() }
}

fn city(nom: &str, nb_habitants: u64, department_id: i64) -> NewCity {
  NewCity {
    nom: nom.into(),
    nb_habitants,
    code_arrondissement: "1".into(),
    code_canton: "99".into(),
    code_commune: "056".into(),
    population_municipale: nb_habitants,
    population_comptee_a_part: 0,
    population_totale: nb_habitants,
    department_id,
  }
}

/// A region with one department, returning the department id.
async fn seeded(s: &SqliteStore) -> i64 {
  let r = s.insert_region(region("11", "Île-de-France")).await.unwrap();
  s.insert_department(NewDepartment { code: "75".into(), region_id: Some(r.id) })
    .await
    .unwrap()
    .id
}

// ─── Regions ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_region() {
  let s = store().await;

  let r = s.insert_region(region("11", "Île-de-France")).await.unwrap();
  assert_eq!(r.code, "11");

  let fetched = s.get_region(r.id).await.unwrap().unwrap();
  assert_eq!(fetched, r);

  assert_eq!(s.find_region_by_code("11").await.unwrap(), Some(r.clone()));
  assert_eq!(s.find_region_by_name("Île-de-France").await.unwrap(), Some(r));
  assert!(s.exists_region_by_code("11").await.unwrap());
  assert!(!s.exists_region_by_name("Bretagne").await.unwrap());
}

#[tokio::test]
async fn get_region_missing_returns_none() {
  let s = store().await;
  assert!(s.get_region(42).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_region_code_is_a_duplicate_key() {
  let s = store().await;
  s.insert_region(region("11", "Île-de-France")).await.unwrap();

  let err = s.insert_region(region("11", "Autre")).await.unwrap_err();
  assert!(err.is_duplicate_key());
  assert_eq!(s.list_regions().await.unwrap().len(), 1);
}

#[tokio::test]
async fn update_region_replaces_fields() {
  let s = store().await;
  let r = s.insert_region(region("11", "IDF")).await.unwrap();

  let updated = s
    .update_region(r.id, region("11", "Île-de-France"))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.nom, "Île-de-France");
  assert!(s.update_region(999, region("99", "X")).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_region_cascades_to_departments_and_cities() {
  let s = store().await;
  let dept = seeded(&s).await;
  s.insert_city(city("Paris", 2_133_111, dept)).await.unwrap();

  let r = s.find_region_by_code("11").await.unwrap().unwrap();
  assert!(s.delete_region(r.id).await.unwrap());

  assert!(s.get_department(dept).await.unwrap().is_none());
  assert!(!s.exists_city_by_name("Paris").await.unwrap());
  assert!(!s.delete_region(r.id).await.unwrap());
}

#[tokio::test]
async fn delete_all_regions_empties_the_store() {
  let s = store().await;
  let dept = seeded(&s).await;
  s.insert_city(city("Paris", 10, dept)).await.unwrap();
  s.insert_region(region("53", "Bretagne")).await.unwrap();

  assert_eq!(s.delete_all_regions().await.unwrap(), 2);
  assert!(s.list_regions().await.unwrap().is_empty());
  assert!(s.list_departments().await.unwrap().is_empty());
  let page = s.list_cities(PageRequest::default()).await.unwrap();
  assert_eq!(page.total_elements, 0);
}

// ─── Departments ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn department_without_region_is_allowed() {
  let s = store().await;
  let d = s
    .insert_department(NewDepartment { code: "2A".into(), region_id: None })
    .await
    .unwrap();
  assert_eq!(s.find_department_by_code("2A").await.unwrap(), Some(d));
}

#[tokio::test]
async fn duplicate_department_code_is_a_duplicate_key() {
  let s = store().await;
  seeded(&s).await;

  let err = s
    .insert_department(NewDepartment { code: "75".into(), region_id: None })
    .await
    .unwrap_err();
  assert!(err.is_duplicate_key());
  assert_eq!(s.list_departments().await.unwrap().len(), 1);
}

#[tokio::test]
async fn delete_department_removes_its_cities() {
  let s = store().await;
  let dept = seeded(&s).await;
  let paris = s.insert_city(city("Paris", 10, dept)).await.unwrap();

  assert!(s.delete_department(dept).await.unwrap());
  assert!(s.get_city(paris.id).await.unwrap().is_none());
  assert!(s.exists_region_by_code("11").await.unwrap());
}

// ─── Cities ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_city_keeps_census_fields() {
  let s = store().await;
  let dept = seeded(&s).await;

  let paris = s.insert_city(city("Paris", 2_133_111, dept)).await.unwrap();
  let fetched = s.get_city(paris.id).await.unwrap().unwrap();
  assert_eq!(fetched, paris);
  assert_eq!(fetched.code_commune, "056");
}

#[tokio::test]
async fn same_name_in_one_department_is_a_duplicate_key() {
  let s = store().await;
  let dept = seeded(&s).await;
  let other = s
    .insert_department(NewDepartment { code: "92".into(), region_id: None })
    .await
    .unwrap()
    .id;

  s.insert_city(city("Saint-Denis", 10, dept)).await.unwrap();
  s.insert_city(city("Saint-Denis", 20, other)).await.unwrap();

  let err = s.insert_city(city("Saint-Denis", 30, dept)).await.unwrap_err();
  assert!(err.is_duplicate_key());
  assert!(s.exists_city_by_name_and_department("Saint-Denis", other).await.unwrap());
}

#[tokio::test]
async fn unknown_department_is_rejected() {
  let s = store().await;
  let err = s.insert_city(city("Nowhere", 10, 999)).await.unwrap_err();
  assert!(!err.is_duplicate_key());
}

#[tokio::test]
async fn update_city_changes_name_and_population_only() {
  let s = store().await;
  let dept = seeded(&s).await;
  let c = s.insert_city(city("Pariss", 10, dept)).await.unwrap();

  let updated = s
    .update_city(c.id, CityUpdate { nom: "Paris".into(), nb_habitants: 11 })
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.nom, "Paris");
  assert_eq!(updated.nb_habitants, 11);
  assert_eq!(updated.population_totale, 10);

  let missing = s
    .update_city(999, CityUpdate { nom: "Paris".into(), nb_habitants: 1 })
    .await
    .unwrap();
  assert!(missing.is_none());
}

#[tokio::test]
async fn find_city_by_name_returns_lowest_id() {
  let s = store().await;
  let dept = seeded(&s).await;
  let other = s
    .insert_department(NewDepartment { code: "93".into(), region_id: None })
    .await
    .unwrap()
    .id;
  let first = s.insert_city(city("Saint-Denis", 10, other)).await.unwrap();
  s.insert_city(city("Saint-Denis", 20, dept)).await.unwrap();

  let found = s.find_city_by_name("Saint-Denis").await.unwrap().unwrap();
  assert_eq!(found.id, first.id);
}

#[tokio::test]
async fn delete_city_reports_absence() {
  let s = store().await;
  let dept = seeded(&s).await;
  let c = s.insert_city(city("Paris", 10, dept)).await.unwrap();

  assert!(s.delete_city(c.id).await.unwrap());
  assert!(!s.delete_city(c.id).await.unwrap());
}

#[tokio::test]
async fn list_cities_pages_in_id_order() {
  let s = store().await;
  let dept = seeded(&s).await;
  for i in 0..5 {
    s.insert_city(city(&format!("Ville{i}"), 10 + i, dept)).await.unwrap();
  }

  let page = s.list_cities(PageRequest::new(1, 2)).await.unwrap();
  assert_eq!(page.total_elements, 5);
  assert_eq!(page.total_pages, 3);
  let names: Vec<_> = page.content.iter().map(|c| c.nom.as_str()).collect();
  assert_eq!(names, ["Ville2", "Ville3"]);

  let past_end = s.list_cities(PageRequest::new(9, 2)).await.unwrap();
  assert!(past_end.content.is_empty());
  assert_eq!(past_end.total_elements, 5);
}

#[tokio::test]
async fn prefix_search_is_case_sensitive() {
  let s = store().await;
  let dept = seeded(&s).await;
  s.insert_city(city("Paris", 10, dept)).await.unwrap();
  s.insert_city(city("Pantin", 10, dept)).await.unwrap();
  s.insert_city(city("paray", 10, dept)).await.unwrap();

  let found = s.cities_by_name_prefix("Pa").await.unwrap();
  let names: Vec<_> = found.iter().map(|c| c.nom.as_str()).collect();
  assert_eq!(names, ["Paris", "Pantin"]);

  assert!(s.cities_by_name_prefix("ZZZ").await.unwrap().is_empty());
}

#[tokio::test]
async fn prefix_search_treats_wildcards_literally() {
  let s = store().await;
  let dept = seeded(&s).await;
  s.insert_city(city("Paris", 10, dept)).await.unwrap();

  assert!(s.cities_by_name_prefix("P%").await.unwrap().is_empty());
  assert!(s.cities_by_name_prefix("P_r").await.unwrap().is_empty());
}

#[tokio::test]
async fn population_filters_use_strict_and_inclusive_bounds() {
  let s = store().await;
  let dept = seeded(&s).await;
  s.insert_city(city("Small", 100, dept)).await.unwrap();
  s.insert_city(city("Medium", 200, dept)).await.unwrap();
  s.insert_city(city("Large", 300, dept)).await.unwrap();

  let above = s.cities_by_population_greater_than(200).await.unwrap();
  assert_eq!(above.len(), 1);
  assert_eq!(above[0].nom, "Large");

  let between = s.cities_by_population_between(100, 200).await.unwrap();
  assert_eq!(between.len(), 2);

  let in_dept = s
    .cities_by_department_and_population_between(dept, 200, 300)
    .await
    .unwrap();
  assert_eq!(in_dept.len(), 2);

  let in_dept_above = s
    .cities_by_department_and_population_greater_than(dept, 99)
    .await
    .unwrap();
  assert_eq!(in_dept_above.len(), 3);
}

#[tokio::test]
async fn population_bounds_beyond_i64_saturate() {
  let s = store().await;
  let dept = seeded(&s).await;
  s.insert_city(city("Paris", 2_165_423, dept)).await.unwrap();

  let above = s.cities_by_population_greater_than(u64::MAX).await.unwrap();
  assert!(above.is_empty());

  let all = s.cities_by_population_between(0, u64::MAX).await.unwrap();
  assert_eq!(all.len(), 1);

  let in_dept = s
    .cities_by_department_and_population_between(dept, 1, u64::MAX)
    .await
    .unwrap();
  assert_eq!(in_dept.len(), 1);

  let in_dept_above = s
    .cities_by_department_and_population_greater_than(dept, u64::MAX)
    .await
    .unwrap();
  assert!(in_dept_above.is_empty());
}

#[tokio::test]
async fn top_cities_break_ties_by_id() {
  let s = store().await;
  let dept = seeded(&s).await;
  let a = s.insert_city(city("A", 100, dept)).await.unwrap();
  let b = s.insert_city(city("B", 300, dept)).await.unwrap();
  let c = s.insert_city(city("C", 200, dept)).await.unwrap();
  let d = s.insert_city(city("D", 300, dept)).await.unwrap();

  let top = s
    .cities_by_department_sorted_by_population_desc(dept, 3)
    .await
    .unwrap();
  let ids: Vec<_> = top.iter().map(|c| c.id).collect();
  assert_eq!(ids, [b.id, d.id, c.id]);

  let all = s.cities_by_department(dept).await.unwrap();
  assert_eq!(all.first().map(|c| c.id), Some(a.id));
}

#[tokio::test]
async fn reopening_a_file_store_keeps_data() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("census.db");

  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.insert_region(region("11", "Île-de-France")).await.unwrap();
  }

  let s = SqliteStore::open(&path).await.unwrap();
  assert!(s.exists_region_by_code("11").await.unwrap());
}
