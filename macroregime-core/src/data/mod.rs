//! Series retrieval: provider trait, FRED client, in-memory fixtures.

pub mod download;
pub mod fred;
pub mod memory;
pub mod provider;

pub use download::{fetch_all, SeriesFetchError};
pub use fred::FredProvider;
pub use memory::InMemoryProvider;
pub use provider::{DataSource, FetchError, SeriesProvider};
