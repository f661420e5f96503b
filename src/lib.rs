pub mod app;
pub mod config;
pub mod errors;
pub mod infrastructure;
pub mod logger;
pub mod logging;
pub mod utils;

// Re-export commonly used items for convenience
pub use app::Application;
pub use config::{Config, Env};
pub use errors::{AppError, LogError};
pub use logger::{Logger, LoggerManager, Severity};
pub use utils::Helpers;
