//! OTP verification, the last step of registration.

use std::any::Any;

use log::{debug, error, info, warn};
use utl_states::{
    Command, CommandFuture, CommandSnapshot, Compute, ComputeDeps, Dep, State, Updater,
    assign_impl, state_assign_impl,
};
use ustr::Ustr;

use crate::{
    BannerStyle, BusinessConfig, FlowError, FlowStatus, LoginInput, ModalView, Navigation,
    OtpSuccess,
    api::{VerifyOtpRequest, backend_error},
    http::Client,
};

pub const OTP_REQUIRED: &str = "Please enter OTP";
pub const OTP_VERIFICATION_FAILED: &str = "OTP verification failed";
pub const REGISTRATION_SUCCESSFUL: &str = "Registration successful! Please log in.";

/// Fields of the OTP panel. `email` is filled by a successful registration
/// and is not editable.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct OtpInput {
    pub email: String,
    pub code: String,
}

impl OtpInput {
    pub fn validate(&self) -> Result<VerifyOtpRequest, FlowError> {
        let code = self.code.trim();
        if code.is_empty() {
            return Err(FlowError::validation(OTP_REQUIRED));
        }

        Ok(VerifyOtpRequest {
            email: self.email.clone(),
            otp: code.to_owned(),
        })
    }
}

impl State for OtpInput {
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
pub struct OtpCompute {
    pub status: FlowStatus,
}

impl OtpCompute {
    pub fn is_pending(&self) -> bool {
        self.status.is_pending()
    }
}

impl Compute for OtpCompute {
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

/// `POST {api_url}/verify-otp`. On 2xx the backend has created the account
/// and signed it in.
pub async fn verify_otp(api_url: &str, request: &VerifyOtpRequest) -> Result<(), FlowError> {
    let response = Client::post(format!("{api_url}/verify-otp"))
        .json(request)
        .map_err(|e| FlowError::Transport(e.to_string()))?
        .send()
        .await?;

    if response.is_success() {
        Ok(())
    } else {
        Err(backend_error(&response, false, OTP_VERIFICATION_FAILED))
    }
}

struct OtpRun {
    input: OtpInput,
    api_url: Ustr,
    on_success: OtpSuccess,
    pending: bool,
}

/// Manual-only command submitting the OTP panel.
///
/// Dispatch explicitly via `ctx.dispatch::<VerifyOtpCommand>()`.
#[derive(Default, Debug)]
pub struct VerifyOtpCommand;

impl VerifyOtpCommand {
    fn read(snap: &CommandSnapshot) -> Result<OtpRun, utl_states::Error> {
        let config = snap.state::<BusinessConfig>()?;
        Ok(OtpRun {
            input: snap.state::<OtpInput>()?.clone(),
            api_url: config.api_url(),
            on_success: config.otp_success.clone(),
            pending: snap.compute::<OtpCompute>()?.is_pending(),
        })
    }
}

impl Command for VerifyOtpCommand {
    fn run(&self, snap: CommandSnapshot, updater: Updater) -> CommandFuture {
        let run = match Self::read(&snap) {
            Ok(run) => run,
            Err(err) => {
                error!("VerifyOtpCommand: {err}");
                return Box::pin(async {});
            }
        };

        if run.pending {
            debug!("VerifyOtpCommand: already in flight, ignoring");
            return Box::pin(async {});
        }

        let request = match run.input.validate() {
            Ok(request) => request,
            Err(err) => {
                info!("VerifyOtpCommand: {err}");
                fail(&updater, err);
                return Box::pin(async {});
            }
        };

        updater.set(OtpCompute {
            status: FlowStatus::Pending,
        });

        let api_url = run.api_url;
        let on_success = run.on_success;
        Box::pin(async move {
            info!("VerifyOtpCommand: verifying {}", request.email);
            match verify_otp(&api_url, &request).await {
                Ok(()) => {
                    info!("VerifyOtpCommand: {} verified", request.email);
                    succeed(&updater, request.email, on_success);
                }
                Err(err) => {
                    warn!("VerifyOtpCommand: {err}");
                    fail(&updater, err);
                }
            }
        })
    }
}

fn succeed(updater: &Updater, email: String, on_success: OtpSuccess) {
    match on_success {
        OtpSuccess::Redirect(path) => {
            updater.update::<ModalView>(|view| {
                view.close();
                // The dialog may reopen before the page is left.
                view.show_login();
            });
            updater.set(Navigation::Redirect(path));
        }
        OtpSuccess::ReturnToLogin => {
            updater.update::<ModalView>(|view| {
                view.show_login();
                view.show_notice(REGISTRATION_SUCCESSFUL);
            });
            updater.set(LoginInput {
                email,
                password: String::new(),
            });
        }
    }
    updater.set(OtpInput::default());
    updater.set(OtpCompute {
        status: FlowStatus::Succeeded,
    });
}

fn fail(updater: &Updater, err: FlowError) {
    let message = err.to_string();
    updater.update::<ModalView>(move |view| view.show_error(message, BannerStyle::Plain));
    updater.set(OtpCompute {
        status: FlowStatus::Failed(err),
    });
}
