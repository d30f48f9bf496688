//! Handlers for `/villes` endpoints.
//!
//! | Method   | Path                                     | Notes                         |
//! |----------|------------------------------------------|-------------------------------|
//! | `GET`    | `/villes`                                | `?page=0&size=100`            |
//! | `POST`   | `/villes`                                | Body: city with `departmentId`|
//! | `GET`    | `/villes/{id}`                           | 404 if not found              |
//! | `PUT`    | `/villes/{id}`                           | Body: `{"nom","nbHabitants"}` |
//! | `DELETE` | `/villes/{id}`                           |                               |
//! | `GET`    | `/villes/{id}/details`                   | Enriched report row           |
//! | `GET`    | `/villes/departement/{id}/top-villes`    | `?maxResults=5`               |
//! | `GET`    | `/villes/departement/{id}/population`    | `?minPopulation&maxPopulation`|
//! | `GET`    | `/villes/search…`                        | 404 when nothing matches      |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use recensement_core::{
  directory::DepartmentDirectory,
  model::{City, CityDraft, CityUpdate},
  page::{Page, PageRequest},
  store::GeoStore,
  view::CityRow,
};
use serde::Deserialize;

use crate::{
  AppState,
  error::ApiError,
  extract::{JsonBody, PathParam, QueryParams},
};

const DEFAULT_TOP: u32 = 5;

fn required<T>(name: &str, value: Option<T>) -> Result<T, ApiError> {
  value.ok_or_else(|| ApiError::bad_request(format!("missing query parameter `{name}`")))
}

// ─── Query parameters ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PageParams {
  pub page: Option<u32>,
  pub size: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopParams {
  pub max_results: Option<u32>,
}

/// Every filter accepted by the search endpoints; each endpoint requires its
/// own subset.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
  pub prefix:           Option<String>,
  pub min_population:   Option<u64>,
  pub max_population:   Option<u64>,
  pub departement_code: Option<String>,
  pub n:                Option<u32>,
}

impl SearchParams {
  fn min(&self) -> Result<u64, ApiError> { required("minPopulation", self.min_population) }

  fn max(&self) -> Result<u64, ApiError> { required("maxPopulation", self.max_population) }

  fn departement(&self) -> Result<&str, ApiError> {
    required("departementCode", self.departement_code.as_deref())
  }
}

// ─── Bodies ──────────────────────────────────────────────────────────────────

/// `POST /villes` body. Census codes and detailed counts are optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  pub nom:                       String,
  pub nb_habitants:              u64,
  #[serde(default)]
  pub code_arrondissement:       String,
  #[serde(default)]
  pub code_canton:               String,
  #[serde(default)]
  pub code_commune:              String,
  #[serde(default)]
  pub population_municipale:     u64,
  #[serde(default)]
  pub population_comptee_a_part: u64,
  #[serde(default)]
  pub population_totale:         u64,
  pub department_id:             Option<i64>,
}

impl From<CreateBody> for CityDraft {
  fn from(body: CreateBody) -> Self {
    Self {
      nom: body.nom,
      nb_habitants: body.nb_habitants,
      code_arrondissement: body.code_arrondissement,
      code_canton: body.code_canton,
      code_commune: body.code_commune,
      population_municipale: body.population_municipale,
      population_comptee_a_part: body.population_comptee_a_part,
      population_totale: body.population_totale,
      department_id: body.department_id,
    }
  }
}

// ─── CRUD ────────────────────────────────────────────────────────────────────

/// `GET /villes[?page=<n>&size=<n>]`
pub async fn list<S, D>(
  State(state): State<AppState<S, D>>,
  QueryParams(params): QueryParams<PageParams>,
) -> Result<Json<Page<City>>, ApiError>
where
  S: GeoStore,
  D: DepartmentDirectory,
{
  let request = PageRequest::new(
    params.page.unwrap_or(0),
    params.size.unwrap_or(PageRequest::DEFAULT_SIZE),
  );
  Ok(Json(state.service.list_cities(request).await?))
}

/// `GET /villes/{id}`
pub async fn get_one<S, D>(
  State(state): State<AppState<S, D>>,
  PathParam(id): PathParam<i64>,
) -> Result<Json<City>, ApiError>
where
  S: GeoStore,
  D: DepartmentDirectory,
{
  Ok(Json(state.service.get_city(id).await?))
}

/// `POST /villes`
pub async fn create<S, D>(
  State(state): State<AppState<S, D>>,
  JsonBody(body): JsonBody<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GeoStore,
  D: DepartmentDirectory,
{
  let city = state.service.create_city(body.into()).await?;
  Ok((StatusCode::CREATED, Json(city)))
}

/// `PUT /villes/{id}`
pub async fn update<S, D>(
  State(state): State<AppState<S, D>>,
  PathParam(id): PathParam<i64>,
  JsonBody(body): JsonBody<CityUpdate>,
) -> Result<Json<City>, ApiError>
where
  S: GeoStore,
  D: DepartmentDirectory,
{
  Ok(Json(state.service.update_city(id, body).await?))
}

/// `DELETE /villes/{id}`
pub async fn delete_one<S, D>(
  State(state): State<AppState<S, D>>,
  PathParam(id): PathParam<i64>,
) -> Result<StatusCode, ApiError>
where
  S: GeoStore,
  D: DepartmentDirectory,
{
  state.service.delete_city(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /villes/{id}/details`
pub async fn details<S, D>(
  State(state): State<AppState<S, D>>,
  PathParam(id): PathParam<i64>,
) -> Result<Json<CityRow>, ApiError>
where
  S: GeoStore,
  D: DepartmentDirectory,
{
  let row = state
    .service
    .city_details(id, state.directory.as_ref())
    .await?;
  Ok(Json(row))
}

// ─── By department id ────────────────────────────────────────────────────────

/// `GET /villes/departement/{id}/top-villes[?maxResults=<n>]`
pub async fn top_of_department<S, D>(
  State(state): State<AppState<S, D>>,
  PathParam(id): PathParam<i64>,
  QueryParams(params): QueryParams<TopParams>,
) -> Result<Json<Vec<City>>, ApiError>
where
  S: GeoStore,
  D: DepartmentDirectory,
{
  let n = params.max_results.unwrap_or(DEFAULT_TOP);
  Ok(Json(state.service.top_cities_of_department(id, n).await?))
}

/// `GET /villes/departement/{id}/population?minPopulation=&maxPopulation=`
pub async fn department_population<S, D>(
  State(state): State<AppState<S, D>>,
  PathParam(id): PathParam<i64>,
  QueryParams(params): QueryParams<SearchParams>,
) -> Result<Json<Vec<City>>, ApiError>
where
  S: GeoStore,
  D: DepartmentDirectory,
{
  let cities = state
    .service
    .cities_of_department_in_range(id, params.min()?, params.max()?)
    .await?;
  Ok(Json(cities))
}

// ─── Searches ────────────────────────────────────────────────────────────────

/// `GET /villes/search?prefix=`
pub async fn search_prefix<S, D>(
  State(state): State<AppState<S, D>>,
  QueryParams(params): QueryParams<SearchParams>,
) -> Result<Json<Vec<City>>, ApiError>
where
  S: GeoStore,
  D: DepartmentDirectory,
{
  let prefix = required("prefix", params.prefix.as_deref())?;
  Ok(Json(state.service.search_by_prefix(prefix).await?))
}

/// `GET /villes/search/by-min-population?minPopulation=`
pub async fn search_min_population<S, D>(
  State(state): State<AppState<S, D>>,
  QueryParams(params): QueryParams<SearchParams>,
) -> Result<Json<Vec<City>>, ApiError>
where
  S: GeoStore,
  D: DepartmentDirectory,
{
  Ok(Json(state.service.search_by_min_population(params.min()?).await?))
}

/// `GET /villes/search/by-population-range?minPopulation=&maxPopulation=`
pub async fn search_population_range<S, D>(
  State(state): State<AppState<S, D>>,
  QueryParams(params): QueryParams<SearchParams>,
) -> Result<Json<Vec<City>>, ApiError>
where
  S: GeoStore,
  D: DepartmentDirectory,
{
  let cities = state
    .service
    .search_by_population_range(params.min()?, params.max()?)
    .await?;
  Ok(Json(cities))
}

/// `GET /villes/search/by-departement-and-min-population?departementCode=&minPopulation=`
pub async fn search_department_min_population<S, D>(
  State(state): State<AppState<S, D>>,
  QueryParams(params): QueryParams<SearchParams>,
) -> Result<Json<Vec<City>>, ApiError>
where
  S: GeoStore,
  D: DepartmentDirectory,
{
  let cities = state
    .service
    .search_by_department_and_min_population(params.departement()?, params.min()?)
    .await?;
  Ok(Json(cities))
}

/// `GET /villes/search/by-departement-and-population-range?departementCode=&minPopulation=&maxPopulation=`
pub async fn search_department_population_range<S, D>(
  State(state): State<AppState<S, D>>,
  QueryParams(params): QueryParams<SearchParams>,
) -> Result<Json<Vec<City>>, ApiError>
where
  S: GeoStore,
  D: DepartmentDirectory,
{
  let cities = state
    .service
    .search_by_department_and_population_range(
      params.departement()?,
      params.min()?,
      params.max()?,
    )
    .await?;
  Ok(Json(cities))
}

/// `GET /villes/search/top-n-by-departement?departementCode=&n=`
pub async fn search_top_n<S, D>(
  State(state): State<AppState<S, D>>,
  QueryParams(params): QueryParams<SearchParams>,
) -> Result<Json<Vec<City>>, ApiError>
where
  S: GeoStore,
  D: DepartmentDirectory,
{
  let n = required("n", params.n)?;
  let cities = state
    .service
    .top_n_by_department_code(params.departement()?, n)
    .await?;
  Ok(Json(cities))
}
