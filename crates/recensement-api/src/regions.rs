//! Handlers for `/regions` endpoints.
//!
//! | Method   | Path            | Notes                              |
//! |----------|-----------------|------------------------------------|
//! | `GET`    | `/regions`      | 204 when there is no region        |
//! | `POST`   | `/regions`      | Body: `{"code":"11","nom":"…"}`    |
//! | `DELETE` | `/regions`      | Cascades to departments and cities |
//! | `GET`    | `/regions/{id}` | 404 if not found                   |
//! | `PUT`    | `/regions/{id}` | Replaces `code` and `nom`          |
//! | `DELETE` | `/regions/{id}` | Cascades                           |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use recensement_core::{
  directory::DepartmentDirectory,
  model::{NewRegion, Region},
  store::GeoStore,
};

use crate::{
  AppState,
  error::ApiError,
  extract::{JsonBody, PathParam},
};

/// `GET /regions`
pub async fn list<S, D>(
  State(state): State<AppState<S, D>>,
) -> Result<Response, ApiError>
where
  S: GeoStore,
  D: DepartmentDirectory,
{
  let regions = state.service.list_regions().await?;
  if regions.is_empty() {
    return Ok(StatusCode::NO_CONTENT.into_response());
  }
  Ok(Json(regions).into_response())
}

/// `GET /regions/{id}`
pub async fn get_one<S, D>(
  State(state): State<AppState<S, D>>,
  PathParam(id): PathParam<i64>,
) -> Result<Json<Region>, ApiError>
where
  S: GeoStore,
  D: DepartmentDirectory,
{
  Ok(Json(state.service.get_region(id).await?))
}

/// `POST /regions`
pub async fn create<S, D>(
  State(state): State<AppState<S, D>>,
  JsonBody(body): JsonBody<NewRegion>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GeoStore,
  D: DepartmentDirectory,
{
  let region = state.service.create_region(body).await?;
  Ok((StatusCode::CREATED, Json(region)))
}

/// `PUT /regions/{id}`
pub async fn update<S, D>(
  State(state): State<AppState<S, D>>,
  PathParam(id): PathParam<i64>,
  JsonBody(body): JsonBody<NewRegion>,
) -> Result<Json<Region>, ApiError>
where
  S: GeoStore,
  D: DepartmentDirectory,
{
  Ok(Json(state.service.update_region(id, body).await?))
}

/// `DELETE /regions/{id}`
pub async fn delete_one<S, D>(
  State(state): State<AppState<S, D>>,
  PathParam(id): PathParam<i64>,
) -> Result<StatusCode, ApiError>
where
  S: GeoStore,
  D: DepartmentDirectory,
{
  state.service.delete_region(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /regions`
pub async fn delete_all<S, D>(
  State(state): State<AppState<S, D>>,
) -> Result<StatusCode, ApiError>
where
  S: GeoStore,
  D: DepartmentDirectory,
{
  let removed = state.service.delete_all_regions().await?;
  tracing::info!(removed, "deleted all regions");
  Ok(StatusCode::NO_CONTENT)
}
