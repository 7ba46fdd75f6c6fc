// EN: src/core/mod.rs

pub mod action;
pub mod app_executor;
pub mod context;
pub mod elevation;
pub mod expand;
pub mod manager;
pub mod script_executor;
pub mod settings;
pub mod url_executor;
