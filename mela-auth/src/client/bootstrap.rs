use thiserror::Error;

use crate::client::liff::IdentitySdk;
use crate::client::redirect_state::RedirectStateStore;
use crate::client::session_client::{LiffExchange, SessionClientError, SessionExchanger};
use crate::common::{LiffRouting, SessionUser};

/// States of one page load's authentication bootstrap. `Authenticated` and
/// `Error` are terminal until the page fully reloads.
#[derive(Debug, Clone, PartialEq)]
pub enum BootstrapState {
    Loading,
    Authenticated(SessionUser),
    AwaitingProviderLogin,
    ExchangingSession,
    Error(BootstrapError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BootstrapError {
    #[error("No identity configuration for this path: {0}")]
    NoLiffConfig(String),

    #[error("{0}")]
    Initialization(String),

    #[error("Failed to fetch LIFF profile: {0}")]
    ProfileFetch(String),

    #[error("กรุณาเปิดหน้านี้ผ่าน LINE app")]
    NotInLineClient,

    #[error("{0}")]
    Exchange(String),
}

impl BootstrapError {
    /// Everything except a missing path configuration can be retried by the
    /// user; the latter needs an operator fix.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, BootstrapError::NoLiffConfig(_))
    }
}

/// Query parameters accepted on the callback route, used to recover the
/// pending state when the provider redirect landed on a cleared browser
/// context.
#[derive(Debug, Clone, Default)]
pub struct CallbackQuery {
    pub liff_id: Option<String>,
    pub callback_url: Option<String>,
}

/// Result of driving the machine for one page load.
#[derive(Debug)]
pub struct BootstrapOutcome {
    pub state: BootstrapState,
    /// Where the host must navigate next, if anywhere. For
    /// `AwaitingProviderLogin` this is the provider-hosted login URL and
    /// control does not come back.
    pub navigate_to: Option<String>,
}

/// Per-page-load orchestration of the identity SDK, the redirect-state store
/// and the session exchange.
///
/// The machine owns a one-shot latch: the provider's callback redirect and a
/// host re-render can both try to start it, and only the first attempt runs.
pub struct Bootstrap<'a, S, X> {
    sdk: &'a mut S,
    exchanger: &'a X,
    routing: &'a LiffRouting,
    store: &'a RedirectStateStore,
    state: BootstrapState,
    started: bool,
}

impl<'a, S, X> Bootstrap<'a, S, X>
where
    S: IdentitySdk,
    X: SessionExchanger,
{
    pub fn new(
        sdk: &'a mut S,
        exchanger: &'a X,
        routing: &'a LiffRouting,
        store: &'a RedirectStateStore,
    ) -> Self {
        Self {
            sdk,
            exchanger,
            routing,
            store,
            state: BootstrapState::Loading,
            started: false,
        }
    }

    pub fn state(&self) -> &BootstrapState {
        &self.state
    }

    /// Re-seed the redirect store from callback query parameters before
    /// running.
    pub fn recover_from_query(&self, query: &CallbackQuery) {
        if let Some(liff_id) = &query.liff_id {
            self.store.set_pending_liff_id(liff_id);
        }
        if let Some(url) = &query.callback_url {
            self.store.set_pending_return_url(url);
        }
    }

    /// Run the bootstrap for one page load. Returns `None` when the machine
    /// was already entered for this page instance; the duplicate invocation
    /// is ignored.
    pub async fn run(
        &mut self,
        path: &str,
        existing: Option<&SessionUser>,
    ) -> Option<BootstrapOutcome> {
        if self.started {
            return None;
        }
        self.started = true;
        Some(self.drive(path, existing).await)
    }

    /// Re-run after an error. Resets the machine to `Loading` and drives it
    /// again from step one.
    pub async fn retry(
        &mut self,
        path: &str,
        existing: Option<&SessionUser>,
    ) -> BootstrapOutcome {
        self.state = BootstrapState::Loading;
        self.started = true;
        self.drive(path, existing).await
    }

    /// Clear all transient state and send the user to the application root.
    pub fn abort_to_home(&mut self) -> BootstrapOutcome {
        self.store.clear();
        BootstrapOutcome {
            state: self.state.clone(),
            navigate_to: Some("/".to_string()),
        }
    }

    async fn drive(&mut self, path: &str, existing: Option<&SessionUser>) -> BootstrapOutcome {
        // 1. An existing valid session wins; the provider is never touched.
        if let Some(user) = existing {
            self.state = BootstrapState::Authenticated(user.clone());
            return self.outcome(None);
        }

        // 2. Which LIFF app owns this path?
        let liff_id = match self.routing.resolve(path) {
            Some(id) => id.to_string(),
            None => return self.fail(BootstrapError::NoLiffConfig(path.to_string())),
        };

        tracing::debug!(%liff_id, %path, "Initializing identity SDK");

        // 3.
        if let Err(e) = self.sdk.initialize(&liff_id) {
            return self.fail(BootstrapError::Initialization(e.to_string()));
        }

        // 4.
        if !self.sdk.is_logged_in() {
            if !self.sdk.is_in_client() {
                return self.fail(BootstrapError::NotInLineClient);
            }

            // Control leaves the page here; the store carries what the
            // resumed flow needs to know.
            self.store.set_pending_liff_id(&liff_id);
            self.store.set_pending_return_url(path);

            return match self.sdk.login(path) {
                Ok(login_url) => {
                    self.state = BootstrapState::AwaitingProviderLogin;
                    self.outcome(Some(login_url))
                }
                Err(e) => self.fail(BootstrapError::Initialization(e.to_string())),
            };
        }

        // 5.
        let profile = match self.sdk.profile().await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                return self.fail(BootstrapError::ProfileFetch(
                    "no profile available".to_string(),
                ))
            }
            Err(e) => return self.fail(BootstrapError::ProfileFetch(e.to_string())),
        };

        // 6.
        self.state = BootstrapState::ExchangingSession;
        let exchange = LiffExchange::from_profile(&profile, self.sdk.access_token());
        let established = match self.exchanger.exchange_liff(&exchange).await {
            Ok(established) => established,
            Err(SessionClientError::Rejected(reason)) => {
                return self.fail(BootstrapError::Exchange(reason))
            }
            Err(e) => return self.fail(BootstrapError::Exchange(e.to_string())),
        };

        // 7. Resume where the login interrupted the user.
        let return_url = self
            .store
            .pending_return_url()
            .unwrap_or_else(|| path.to_string());
        self.store.clear();

        tracing::debug!(user_id = %established.user.id(), "Session established");
        self.state = BootstrapState::Authenticated(established.user);
        let navigate_to = if return_url != path {
            Some(return_url)
        } else {
            None
        };
        self.outcome(navigate_to)
    }

    fn outcome(&self, navigate_to: Option<String>) -> BootstrapOutcome {
        BootstrapOutcome {
            state: self.state.clone(),
            navigate_to,
        }
    }

    fn fail(&mut self, error: BootstrapError) -> BootstrapOutcome {
        tracing::warn!(%error, "Auth bootstrap failed");
        self.state = BootstrapState::Error(error);
        self.outcome(None)
    }
}
