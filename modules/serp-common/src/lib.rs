pub mod config;
pub mod error;
pub mod record;
pub mod traits;
pub mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use config::Config;
pub use error::{ConfigError, ConnectionError, StoreError};
pub use record::{as_record, storable_text, text_field, Record};
pub use traits::{AnalyticsStore, GraphStore, StoreConnector};
pub use types::*;
