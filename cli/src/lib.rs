pub mod config;
pub mod search_client;

pub use config::{BackendConfig, Config, SearchConfig};
pub use search_client::{SearchClient, COMBINED_SEARCH_PATH};
