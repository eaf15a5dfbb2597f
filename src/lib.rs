pub mod cache;
pub mod config;
pub mod error;
pub mod extractor;
pub mod model;
pub mod output;
pub mod report;
pub mod resolver;
pub mod scanner;
pub mod tables;

pub use cache::Cache;
pub use config::Config;
pub use error::ScanError;
pub use model::{BaselineInfo, BaselineStatus, FeatureOccurrence, Issue, ScanResult, Severity};
pub use report::{ScanReport, Summary};
pub use resolver::Resolver;
pub use scanner::{BaselineLevel, CancellationToken, ScanOptions, Scanner};
