// Adapters layer: concrete implementations of the domain ports.

pub mod http;
pub mod sqlite;

pub use http::HttpSource;
pub use sqlite::{SqliteConnection, SqliteStore};
