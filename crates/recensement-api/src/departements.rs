//! Handlers for `/departements` endpoints.
//!
//! | Method   | Path                                  | Notes                       |
//! |----------|---------------------------------------|-----------------------------|
//! | `GET`    | `/departements`                       |                             |
//! | `POST`   | `/departements`                       | Body: `{"code","regionId"}` |
//! | `GET`    | `/departements/{id}`                  | 404 if not found            |
//! | `PUT`    | `/departements/{id}`                  | Replaces code and region    |
//! | `DELETE` | `/departements/{id}`                  | Cascades to cities          |
//! | `GET`    | `/departements/{code}/villes/pdf-export` | `top_villes.pdf`         |
//! | `GET`    | `/departements/{code}/villes/csv-export` | `villes.csv`             |

use axum::{
  Json,
  extract::State,
  http::{StatusCode, header},
  response::IntoResponse,
};
use recensement_core::{
  directory::DepartmentDirectory,
  model::{Department, NewDepartment},
  store::GeoStore,
};

use crate::{
  AppState,
  error::ApiError,
  extract::{JsonBody, PathParam},
};

// ─── CRUD ────────────────────────────────────────────────────────────────────

/// `GET /departements`
pub async fn list<S, D>(
  State(state): State<AppState<S, D>>,
) -> Result<Json<Vec<Department>>, ApiError>
where
  S: GeoStore,
  D: DepartmentDirectory,
{
  Ok(Json(state.service.list_departments().await?))
}

/// `GET /departements/{id}`
pub async fn get_one<S, D>(
  State(state): State<AppState<S, D>>,
  PathParam(id): PathParam<i64>,
) -> Result<Json<Department>, ApiError>
where
  S: GeoStore,
  D: DepartmentDirectory,
{
  Ok(Json(state.service.get_department(id).await?))
}

/// `POST /departements`
pub async fn create<S, D>(
  State(state): State<AppState<S, D>>,
  JsonBody(body): JsonBody<NewDepartment>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GeoStore,
  D: DepartmentDirectory,
{
  let department = state.service.create_department(body).await?;
  Ok((StatusCode::CREATED, Json(department)))
}

/// `PUT /departements/{id}`
pub async fn update<S, D>(
  State(state): State<AppState<S, D>>,
  PathParam(id): PathParam<i64>,
  JsonBody(body): JsonBody<NewDepartment>,
) -> Result<Json<Department>, ApiError>
where
  S: GeoStore,
  D: DepartmentDirectory,
{
  Ok(Json(state.service.update_department(id, body).await?))
}

/// `DELETE /departements/{id}`
pub async fn delete_one<S, D>(
  State(state): State<AppState<S, D>>,
  PathParam(id): PathParam<i64>,
) -> Result<StatusCode, ApiError>
where
  S: GeoStore,
  D: DepartmentDirectory,
{
  state.service.delete_department(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Exports ─────────────────────────────────────────────────────────────────

/// `GET /departements/{code}/villes/pdf-export`
pub async fn pdf_export<S, D>(
  State(state): State<AppState<S, D>>,
  PathParam(code): PathParam<String>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GeoStore,
  D: DepartmentDirectory,
{
  let rows = state
    .service
    .department_report(&code, state.directory.as_ref())
    .await?;
  let title = format!("Liste des villes du département {code}");
  let pdf = recensement_report::render_pdf(&title, &rows)?;

  Ok((
    [
      (header::CONTENT_TYPE, "application/pdf"),
      (header::CONTENT_DISPOSITION, "attachment; filename=\"top_villes.pdf\""),
    ],
    pdf,
  ))
}

/// `GET /departements/{code}/villes/csv-export`
pub async fn csv_export<S, D>(
  State(state): State<AppState<S, D>>,
  PathParam(code): PathParam<String>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GeoStore,
  D: DepartmentDirectory,
{
  let rows = state
    .service
    .department_report(&code, state.directory.as_ref())
    .await?;
  let csv = recensement_report::render_csv(&rows)?;

  Ok((
    [
      (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
      (header::CONTENT_DISPOSITION, "attachment; filename=\"villes.csv\""),
    ],
    csv,
  ))
}
