//! HTTP boundary for fitrack: routing, the authorization gate and JSON responses

pub mod config;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use handlers::handle_request;
pub use server::FitrackServer;
pub use state::AppState;
