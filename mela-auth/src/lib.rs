// Common types shared between client and server
pub mod common;

// Client library (public API for the mini-app shell)
mod client;
mod error;

pub use client::{
    sign_out, Bootstrap, BootstrapError, BootstrapOutcome, BootstrapState, CachedSession,
    CallbackQuery, HostContext, IdentitySdk, LiffError, LiffExchange, LineLiffSdk,
    RedirectStateStore, SessionCache, SessionClient, SessionEstablished, SessionExchanger,
    SessionResponseView, Settings,
};
pub use common::{LiffProfile, LiffRoute, LiffRouting, LiffSettings, SessionUser};
pub use error::AuthError;

// Server modules (public for binary, internal for library)
#[cfg(feature = "server")]
pub mod server;
