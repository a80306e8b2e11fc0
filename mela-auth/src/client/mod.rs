pub mod bootstrap;
pub mod liff;
mod redirect_state;
mod session_cache;
pub mod session_client;
mod settings;

pub use bootstrap::{Bootstrap, BootstrapError, BootstrapOutcome, BootstrapState, CallbackQuery};
pub use liff::{HostContext, IdentitySdk, LiffError, LineLiffSdk};
pub use redirect_state::RedirectStateStore;
pub use session_cache::{CachedSession, SessionCache};
pub use session_client::{
    LiffExchange, SessionClient, SessionEstablished, SessionExchanger, SessionResponseView,
};
pub use settings::Settings;

use crate::error::AuthError;

/// Sign out everywhere: best-effort server logout, then the provider-side
/// session, then the local cache.
pub async fn sign_out<S: IdentitySdk>(
    sdk: &mut S,
    sessions: &SessionClient,
    cache: &SessionCache,
) -> Result<(), AuthError> {
    if let Some(session) = cache.load()? {
        if let Err(e) = sessions.logout(&session.token).await {
            tracing::warn!(error = %e, "Server-side logout failed, clearing local state anyway");
        }
    }
    sdk.logout();
    cache.delete()?;
    Ok(())
}
