pub mod models;
pub mod routing;

pub use models::{LiffProfile, SessionUser};
pub use routing::{LiffRoute, LiffRouting, LiffSettings};
