//! Configuration module for iSaveMoney
//!
//! - Data directory resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::SavePaths;
pub use settings::Settings;
