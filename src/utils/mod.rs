pub mod paths;

pub use paths::Helpers;
