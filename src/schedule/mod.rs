pub mod presets;
pub mod scheduler;
pub mod types;
