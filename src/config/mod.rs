pub mod schema;

pub use schema::{default_config_path, Config};
