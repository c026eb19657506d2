pub mod document;
pub mod error;
pub mod parser;
pub mod report;
pub mod settings;
pub mod skills;

pub use document::Document;
pub use error::{CatalogError, DocumentError, ModelError, ProcessError, TaxonomyError};
pub use parser::{Pipeline, ProcessingResult};
pub use report::ProcessedResponse;
pub use settings::Settings;
