//! CSV ingestion of labelled numeric datasets for arbor.

mod domain;
mod error;
mod reader;

pub use domain::Dataset;
pub use error::IoError;
pub use reader::DatasetReader;
