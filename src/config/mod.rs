pub mod loader;
pub mod schema;
