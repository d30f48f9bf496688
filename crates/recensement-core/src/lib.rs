//! Core types and trait definitions for the census geography store.
//!
//! Regions, departments and cities, the [`store::GeoStore`] abstraction over
//! their persistence, and the [`CensusService`] query layer. No HTTP or
//! database code lives here.

pub mod directory;
pub mod error;
pub mod model;
pub mod page;
pub mod service;
pub mod store;
pub mod view;

mod validate;

pub use error::{Entity, Error, Result};
pub use service::CensusService;
