pub mod error;
pub mod points;

pub use error::{ImporterError, Result};
pub use points::{PointsImporter, find_sheets};
