//! JSON REST API over the census store.
//!
//! Exposes an axum [`Router`] backed by any [`GeoStore`] and any
//! [`DepartmentDirectory`]. Transport concerns (binding, tracing layers) are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let state = AppState::new(store, directory);
//! let app = recensement_api::api_router(state);
//! ```

pub mod departements;
pub mod error;
pub mod extract;
pub mod geo_gouv;
pub mod regions;
pub mod villes;

use std::sync::Arc;

use axum::{
  Router,
  routing::get,
};
use recensement_core::{
  CensusService, directory::DepartmentDirectory, store::GeoStore,
};

pub use error::ApiError;
pub use geo_gouv::GeoApiClient;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S, D> {
  pub service:   CensusService<S>,
  pub directory: Arc<D>,
}

impl<S: GeoStore, D> AppState<S, D> {
  pub fn new(store: Arc<S>, directory: Arc<D>) -> Self {
    Self { service: CensusService::new(store), directory }
  }
}

impl<S, D> Clone for AppState<S, D> {
  fn clone(&self) -> Self {
    Self {
      service:   self.service.clone(),
      directory: Arc::clone(&self.directory),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
pub fn api_router<S, D>(state: AppState<S, D>) -> Router<()>
where
  S: GeoStore + 'static,
  D: DepartmentDirectory + 'static,
{
  Router::new()
    // Regions
    .route(
      "/regions",
      get(regions::list::<S, D>)
        .post(regions::create::<S, D>)
        .delete(regions::delete_all::<S, D>),
    )
    .route(
      "/regions/{id}",
      get(regions::get_one::<S, D>)
        .put(regions::update::<S, D>)
        .delete(regions::delete_one::<S, D>),
    )
    // Departments. Exports address a department by code, the rest by id;
    // both share one path parameter name.
    .route(
      "/departements",
      get(departements::list::<S, D>).post(departements::create::<S, D>),
    )
    .route(
      "/departements/{departement}",
      get(departements::get_one::<S, D>)
        .put(departements::update::<S, D>)
        .delete(departements::delete_one::<S, D>),
    )
    .route(
      "/departements/{departement}/villes/pdf-export",
      get(departements::pdf_export::<S, D>),
    )
    .route(
      "/departements/{departement}/villes/csv-export",
      get(departements::csv_export::<S, D>),
    )
    // Cities
    .route(
      "/villes",
      get(villes::list::<S, D>).post(villes::create::<S, D>),
    )
    .route(
      "/villes/{id}",
      get(villes::get_one::<S, D>)
        .put(villes::update::<S, D>)
        .delete(villes::delete_one::<S, D>),
    )
    .route("/villes/{id}/details", get(villes::details::<S, D>))
    .route(
      "/villes/departement/{id}/top-villes",
      get(villes::top_of_department::<S, D>),
    )
    .route(
      "/villes/departement/{id}/population",
      get(villes::department_population::<S, D>),
    )
    // Searches
    .route("/villes/search", get(villes::search_prefix::<S, D>))
    .route(
      "/villes/search/by-min-population",
      get(villes::search_min_population::<S, D>),
    )
    .route(
      "/villes/search/by-population-range",
      get(villes::search_population_range::<S, D>),
    )
    .route(
      "/villes/search/by-departement-and-min-population",
      get(villes::search_department_min_population::<S, D>),
    )
    .route(
      "/villes/search/by-departement-and-population-range",
      get(villes::search_department_population_range::<S, D>),
    )
    .route(
      "/villes/search/top-n-by-departement",
      get(villes::search_top_n::<S, D>),
    )
    .with_state(state)
}
