//! Registration flow: the register panel posts to `/api/register`, which mails
//! an OTP. On success the modal moves on to the OTP panel with the email carried over.

use std::any::Any;

use log::{debug, error, info, warn};
use utl_states::{
    Command, CommandFuture, CommandSnapshot, Compute, ComputeDeps, Dep, State, Updater,
    assign_impl, state_assign_impl,
};
use ustr::Ustr;

use crate::{
    BannerStyle, BusinessConfig, FlowError, FlowStatus, ModalView, OtpInput,
    api::{CredentialsRequest, backend_error},
    http::Client,
};

pub const REGISTER_FIELDS_REQUIRED: &str = "Please fill all fields";
pub const PASSWORDS_DONT_MATCH: &str = "Passwords don't match";
pub const REGISTRATION_FAILED: &str = "Registration failed";

const DUPLICATE_ACCOUNT_STATUS: u16 = 409;
const DUPLICATE_ACCOUNT_MARKER: &str = "already exists";

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

impl RegisterInput {
    /// Empty fields are reported before a confirmation mismatch.
    pub fn validate(&self) -> Result<CredentialsRequest, FlowError> {
        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() {
            return Err(FlowError::validation(REGISTER_FIELDS_REQUIRED));
        }
        if self.password != self.password_confirmation {
            return Err(FlowError::validation(PASSWORDS_DONT_MATCH));
        }

        Ok(CredentialsRequest {
            email: email.to_owned(),
            password: self.password.clone(),
        })
    }
}

impl State for RegisterInput {
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

#[derive(Default, Debug, Clone)]
pub struct RegisterCompute {
    pub status: FlowStatus,
}

impl RegisterCompute {
    pub fn is_pending(&self) -> bool {
        self.status.is_pending()
    }
}

impl Compute for RegisterCompute {
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

/// Banner style for a failed registration. Only an existing account is emphasized.
pub fn failure_style(err: &FlowError) -> BannerStyle {
    match err {
        FlowError::Backend { status, message }
            if *status == DUPLICATE_ACCOUNT_STATUS
                && message.contains(DUPLICATE_ACCOUNT_MARKER) =>
        {
            BannerStyle::Emphasized
        }
        _ => BannerStyle::Plain,
    }
}

/// `POST {api_url}/register`.
pub async fn register(api_url: &str, request: &CredentialsRequest) -> Result<(), FlowError> {
    let response = Client::post(format!("{api_url}/register"))
        .json(request)
        .map_err(|e| FlowError::Transport(e.to_string()))?
        .send()
        .await?;

    if response.is_success() {
        Ok(())
    } else {
        Err(backend_error(&response, false, REGISTRATION_FAILED))
    }
}

/// Manual-only command submitting the register panel.
///
/// Dispatch explicitly via `ctx.dispatch::<RegisterCommand>()`.
#[derive(Default, Debug)]
pub struct RegisterCommand;

impl RegisterCommand {
    fn read(snap: &CommandSnapshot) -> Result<(RegisterInput, Ustr, bool), utl_states::Error> {
        let input = snap.state::<RegisterInput>()?.clone();
        let api_url = snap.state::<BusinessConfig>()?.api_url();
        let pending = snap.compute::<RegisterCompute>()?.is_pending();
        Ok((input, api_url, pending))
    }
}

impl Command for RegisterCommand {
    fn run(&self, snap: CommandSnapshot, updater: Updater) -> CommandFuture {
        let (input, api_url, pending) = match Self::read(&snap) {
            Ok(read) => read,
            Err(err) => {
                error!("RegisterCommand: {err}");
                return Box::pin(async {});
            }
        };

        if pending {
            debug!("RegisterCommand: already in flight, ignoring");
            return Box::pin(async {});
        }

        let request = match input.validate() {
            Ok(request) => request,
            Err(err) => {
                info!("RegisterCommand: {err}");
                fail(&updater, err);
                return Box::pin(async {});
            }
        };

        updater.set(RegisterCompute {
            status: FlowStatus::Pending,
        });

        Box::pin(async move {
            info!("RegisterCommand: registering {}", request.email);
            match register(&api_url, &request).await {
                Ok(()) => {
                    info!("RegisterCommand: OTP sent to {}", request.email);
                    updater.set(OtpInput {
                        email: request.email,
                        code: String::new(),
                    });
                    updater.set(RegisterInput::default());
                    updater.update::<ModalView>(ModalView::show_otp);
                    updater.set(RegisterCompute {
                        status: FlowStatus::Succeeded,
                    });
                }
                Err(err) => {
                    warn!("RegisterCommand: {err}");
                    fail(&updater, err);
                }
            }
        })
    }
}

fn fail(updater: &Updater, err: FlowError) {
    let message = err.to_string();
    let style = failure_style(&err);
    updater.update::<ModalView>(move |view| view.show_error(message, style));
    updater.set(RegisterCompute {
        status: FlowStatus::Failed(err),
    });
}
