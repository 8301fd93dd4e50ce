//! Command implementations for polyconf-cli

pub mod explain;
pub mod list;
pub mod resolve;

pub use explain::run_explain;
pub use list::run_list;
pub use resolve::run_resolve;
