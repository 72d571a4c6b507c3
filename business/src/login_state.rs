//! Login flow.
//!
//! `LoginCommand` validates `LoginInput`, posts the credentials to `/api/login`
//! and reacts to the outcome:
//! - success: banner cleared, modal closed, a page reload requested
//! - failure: backend text shown in the login panel, password cleared, dialog shaken

use std::any::Any;

use log::{debug, error, info, warn};
use utl_states::{
    Command, CommandFuture, CommandSnapshot, Compute, ComputeDeps, Dep, State, Updater,
    assign_impl, state_assign_impl,
};
use ustr::Ustr;

use crate::{
    BannerStyle, BusinessConfig, FlowError, FlowStatus, ModalView, Navigation,
    api::{CredentialsRequest, backend_error},
    http::Client,
};

pub const LOGIN_FIELDS_REQUIRED: &str = "Please enter your email and password.";
pub const LOGIN_FAILED: &str = "Login failed";

/// Form fields of the login panel.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

impl LoginInput {
    /// Checks both fields before anything is sent.
    pub fn validate(&self) -> Result<CredentialsRequest, FlowError> {
        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() {
            return Err(FlowError::validation(LOGIN_FIELDS_REQUIRED));
        }

        Ok(CredentialsRequest {
            email: email.to_owned(),
            password: self.password.clone(),
        })
    }
}

impl State for LoginInput {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        state_assign_impl(self, new_self);
    }
}

/// Status of the latest login attempt, written by `LoginCommand`.
#[derive(Default, Debug, Clone)]
pub struct LoginCompute {
    pub status: FlowStatus,
}

impl LoginCompute {
    pub fn is_pending(&self) -> bool {
        self.status.is_pending()
    }
}

impl Compute for LoginCompute {
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

/// `POST {api_url}/login`. A 2xx means the backend set the session cookie.
pub async fn login(api_url: &str, request: &CredentialsRequest) -> Result<(), FlowError> {
    let response = Client::post(format!("{api_url}/login"))
        .json(request)
        .map_err(|e| FlowError::Transport(e.to_string()))?
        .send()
        .await?;

    if response.is_success() {
        Ok(())
    } else {
        // Login errors come back as plain text.
        Err(backend_error(&response, true, LOGIN_FAILED))
    }
}

/// Manual-only command submitting the login panel.
///
/// Dispatch explicitly via `ctx.dispatch::<LoginCommand>()`.
#[derive(Default, Debug)]
pub struct LoginCommand;

impl LoginCommand {
    fn read(snap: &CommandSnapshot) -> Result<(LoginInput, Ustr, bool), utl_states::Error> {
        let input = snap.state::<LoginInput>()?.clone();
        let api_url = snap.state::<BusinessConfig>()?.api_url();
        let pending = snap.compute::<LoginCompute>()?.is_pending();
        Ok((input, api_url, pending))
    }
}

impl Command for LoginCommand {
    fn run(&self, snap: CommandSnapshot, updater: Updater) -> CommandFuture {
        let (input, api_url, pending) = match Self::read(&snap) {
            Ok(read) => read,
            Err(err) => {
                error!("LoginCommand: {err}");
                return Box::pin(async {});
            }
        };

        if pending {
            debug!("LoginCommand: already in flight, ignoring");
            return Box::pin(async {});
        }

        let request = match input.validate() {
            Ok(request) => request,
            Err(err) => {
                info!("LoginCommand: {err}");
                fail(&updater, err, false);
                return Box::pin(async {});
            }
        };

        // Published before the future exists, so a second dispatch sees it.
        updater.set(LoginCompute {
            status: FlowStatus::Pending,
        });

        Box::pin(async move {
            info!("LoginCommand: signing in {}", request.email);
            match login(&api_url, &request).await {
                Ok(()) => {
                    info!("LoginCommand: signed in {}", request.email);
                    updater.update::<ModalView>(|view| {
                        view.clear_banner();
                        view.close();
                    });
                    updater.set(LoginInput::default());
                    updater.set(Navigation::Reload);
                    updater.set(LoginCompute {
                        status: FlowStatus::Succeeded,
                    });
                }
                Err(err) => {
                    warn!("LoginCommand: {err}");
                    fail(&updater, err, true);
                }
            }
        })
    }
}

/// Shows `err` in the login panel. Rejected credentials also clear the
/// password and shake the dialog.
fn fail(updater: &Updater, err: FlowError, rejected: bool) {
    let message = err.to_string();
    updater.update::<ModalView>(move |view| {
        view.show_error(message, BannerStyle::Plain);
        if rejected {
            view.start_shake();
        }
    });
    if rejected {
        updater.update::<LoginInput>(|input| input.password.clear());
    }
    updater.set(LoginCompute {
        status: FlowStatus::Failed(err),
    });
}
