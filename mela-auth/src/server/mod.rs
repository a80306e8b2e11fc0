pub mod config;
pub mod cookies;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod models;
pub mod services;

pub use config::Configuration;
pub use error::ServerError;

use crate::common::LiffRouting;
use services::SessionService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionService>,
    pub routing: Arc<LiffRouting>,
    pub secure_cookies: bool,
}
