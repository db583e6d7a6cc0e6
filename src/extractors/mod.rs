pub mod base;
pub mod c;
pub mod config;
pub mod go;
pub mod manager;
pub mod python;
pub mod rust;
pub mod typescript;

pub use base::{BaseExtractor, ScopeFileAnalysis, ScopeInfo};
pub use manager::ExtractorManager;
