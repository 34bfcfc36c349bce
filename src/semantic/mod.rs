pub mod checker;
pub mod library;
pub mod scope_info;

pub use checker::{check, Checker};
pub use scope_info::ScopeInfo;
