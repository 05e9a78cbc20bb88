pub mod document;
pub mod error;
pub mod extract;
pub mod loader;
pub mod manager;
pub mod percent;
pub mod registry;
pub mod service;

pub use document::Document;
pub use error::{FetchError, ScraperError};
pub use extract::{extractor_for, SiteExtractor};
pub use loader::{
    fixture_file_name, ContentLoader, FixtureLoader, HttpLoader, LoaderStrategy, RenderedLoader,
};
pub use manager::{ScraperManager, SiteScraper};
pub use percent::{compute_percent, derive_percent, normalize_percent, parse_price};
pub use registry::{PageRef, UrlRegistry};
pub use service::{CacheSnapshot, DiscountService};
