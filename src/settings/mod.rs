// Persisted capture preferences.

pub mod store;
pub mod types;
