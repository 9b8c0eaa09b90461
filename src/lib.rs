pub mod config;
pub mod core;
pub mod directory;
pub mod drive;
pub mod main_module;
pub mod security;
pub mod tickets;
pub mod web;

pub use crate::core::shared::state::AppState;
pub use main_module::build_router;
