#[macro_use]
mod error;
pub use error::{Error, IntoError};

mod dataset;
pub use dataset::Dataset;

pub mod query;
pub use query::{Instance, Query};

pub mod schema;
pub use schema::Metadata;

pub mod stmt;

/// A Result type alias that uses Strata's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
