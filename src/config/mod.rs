pub mod env;
pub mod loader;
pub mod store;

// Re-export commonly used types
pub use env::Env;
pub use loader::ConfigLoader;
pub use store::Config;

// Environment file location
pub const ENV_FILE_NAME: &str = ".env";
pub const ENV_PATH_VAR: &str = "ENV_PATH";
