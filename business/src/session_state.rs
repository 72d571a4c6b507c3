//! Who is signed in, as far as the backend's session cookie says.
//!
//! The top bar shows "Login" / "Sign up" while signed out and the account
//! email with "Logout" while signed in.

use std::any::Any;

use log::{error, info, warn};
use utl_states::{
    Command, CommandFuture, CommandSnapshot, Compute, ComputeDeps, Dep, Updater, assign_impl,
};

use crate::{
    BusinessConfig, FlowError, Navigation,
    api::SessionBody,
    http::Client,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionStatus {
    #[default]
    Unknown,
    Checking,
    SignedOut,
    SignedIn {
        email: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct SessionCompute {
    pub status: SessionStatus,
}

impl SessionCompute {
    pub fn is_signed_in(&self) -> bool {
        matches!(self.status, SessionStatus::SignedIn { .. })
    }

    pub fn email(&self) -> Option<&str> {
        match &self.status {
            SessionStatus::SignedIn { email } => Some(email),
            _ => None,
        }
    }
}

impl Compute for SessionCompute {
    fn deps(&self) -> ComputeDeps {
        Vec::new()
    }

    fn compute(&self, _deps: Dep<'_>, _updater: Updater) {}

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}

/// `GET {api_url}/session`.
pub async fn check_session(api_url: &str) -> Result<SessionStatus, FlowError> {
    let response = Client::get(format!("{api_url}/session")).send().await?;
    if !response.is_success() {
        return Ok(SessionStatus::SignedOut);
    }

    let body: SessionBody = response
        .json()
        .map_err(|e| FlowError::Transport(format!("Invalid session response: {e}")))?;

    Ok(match body.email {
        Some(email) if body.logged_in && !email.is_empty() => SessionStatus::SignedIn { email },
        _ => SessionStatus::SignedOut,
    })
}

/// `POST {api_url}/logout`. A 401 only means there was no session to end,
/// so only transport failures are errors.
pub async fn logout(api_url: &str) -> Result<(), FlowError> {
    Client::post(format!("{api_url}/logout")).send().await?;
    Ok(())
}

/// Asks the backend whether the session cookie is valid. Dispatched once at startup.
#[derive(Default, Debug)]
pub struct CheckSessionCommand;

impl Command for CheckSessionCommand {
    fn run(&self, snap: CommandSnapshot, updater: Updater) -> CommandFuture {
        let api_url = match snap.state::<BusinessConfig>() {
            Ok(config) => config.api_url(),
            Err(err) => {
                error!("CheckSessionCommand: {err}");
                return Box::pin(async {});
            }
        };

        updater.set(SessionCompute {
            status: SessionStatus::Checking,
        });

        Box::pin(async move {
            let status = match check_session(&api_url).await {
                Ok(status) => status,
                Err(err) => {
                    warn!("CheckSessionCommand: treating as signed out: {err}");
                    SessionStatus::SignedOut
                }
            };
            info!("CheckSessionCommand: {status:?}");
            updater.set(SessionCompute { status });
        })
    }
}

/// Ends the session and reloads the page.
#[derive(Default, Debug)]
pub struct LogoutCommand;

impl Command for LogoutCommand {
    fn run(&self, snap: CommandSnapshot, updater: Updater) -> CommandFuture {
        let api_url = match snap.state::<BusinessConfig>() {
            Ok(config) => config.api_url(),
            Err(err) => {
                error!("LogoutCommand: {err}");
                return Box::pin(async {});
            }
        };

        Box::pin(async move {
            if let Err(err) = logout(&api_url).await {
                warn!("LogoutCommand: {err}");
            }
            info!("LogoutCommand: signed out");
            updater.set(SessionCompute {
                status: SessionStatus::SignedOut,
            });
            updater.set(Navigation::Reload);
        })
    }
}
