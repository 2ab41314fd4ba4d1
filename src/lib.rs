pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod resources;
pub mod routes;

pub use routes::{app, AppState};
