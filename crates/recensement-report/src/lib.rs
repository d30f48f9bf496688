//! Report renderers over [`recensement_core::view::CityRow`].
//!
//! Both renderers write into any [`std::io::Write`] sink and flush it before
//! returning. The `render_*` helpers render into a fresh buffer, which is what
//! the HTTP layer uses so that a failed render never yields a partial body.

mod csv_export;
mod pdf;

pub mod error;

pub use csv_export::{CSV_HEADER, render_csv, write_csv};
pub use error::{Error, Result};
pub use pdf::{render_pdf, write_pdf};
