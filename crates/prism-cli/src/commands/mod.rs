//! Command implementations.

pub mod analyze;
pub mod classify;
pub mod config;
pub mod history;
pub mod schemas;

pub use self::analyze::execute_analyze;
pub use self::classify::execute_classify;
pub use self::config::execute_config;
pub use self::history::execute_history;
pub use self::schemas::execute_schemas;
