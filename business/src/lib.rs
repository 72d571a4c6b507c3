//! Flows of the UseThisLink account modal: login, registration, OTP
//! verification and session checks, plus shortening links and the
//! share-link actions.
//!
//! Everything is registered in a [`StateCtx`] by [`build_state_ctx`]; the UI edits
//! the input states directly and dispatches commands.

pub mod api;
mod config;
mod error;
pub mod http;
mod login_state;
mod modal_view;
mod navigation;
mod otp_state;
mod register_state;
mod session_state;
mod share_link;
mod shorten_state;

#[cfg(test)]
mod test_utils;

pub use config::{BusinessConfig, DEFAULT_DASHBOARD_PATH, DEFAULT_MODAL_OPEN_DELAY_MS, OtpSuccess};
pub use error::{FlowError, FlowStatus};
pub use login_state::{LOGIN_FAILED, LOGIN_FIELDS_REQUIRED, LoginCommand, LoginCompute, LoginInput, login};
pub use modal_view::{Banner, BannerStyle, ModalView, Panel, SHAKE_DURATION_MS};
pub use navigation::Navigation;
pub use otp_state::{
    OTP_REQUIRED, OTP_VERIFICATION_FAILED, OtpCompute, OtpInput, REGISTRATION_SUCCESSFUL,
    VerifyOtpCommand, verify_otp,
};
pub use register_state::{
    PASSWORDS_DONT_MATCH, REGISTER_FIELDS_REQUIRED, REGISTRATION_FAILED, RegisterCommand,
    RegisterCompute, RegisterInput, failure_style, register,
};
pub use session_state::{
    CheckSessionCommand, LogoutCommand, SessionCompute, SessionStatus, check_session, logout,
};
pub use share_link::{
    COPIED_NOTICE, FetchQrCodeCommand, QR_CODE_SIZE, QrCodeUrlCompute, QrImageCompute,
    QrImageStatus, ShareAction, ShareLink, fetch_qr_code, qr_code_url,
};
pub use shorten_state::{
    HISTORY_FAILED, HistoryCommand, HistoryCompute, HistoryStatus, SHORTEN_FAILED,
    ShortenCommand, ShortenCompute, ShortenInput, URL_REQUIRED, fetch_history, shorten,
    start_new_link,
};

use utl_states::{StateCtx, Time};

/// Registers every state, compute and command of the modal.
pub fn build_state_ctx(config: BusinessConfig) -> StateCtx {
    let mut ctx = StateCtx::new();

    ctx.add_state(Time::default());
    ctx.add_state(config);
    ctx.add_state(ModalView::default());
    ctx.add_state(Navigation::default());
    ctx.add_state(LoginInput::default());
    ctx.add_state(RegisterInput::default());
    ctx.add_state(OtpInput::default());
    ctx.add_state(ShareLink::default());
    ctx.add_state(ShortenInput::default());

    ctx.record_compute(LoginCompute::default());
    ctx.record_compute(RegisterCompute::default());
    ctx.record_compute(OtpCompute::default());
    ctx.record_compute(SessionCompute::default());
    ctx.record_compute(QrCodeUrlCompute::default());
    ctx.record_compute(QrImageCompute::default());
    ctx.record_compute(ShortenCompute::default());
    ctx.record_compute(HistoryCompute::default());

    ctx.record_command(LoginCommand);
    ctx.record_command(RegisterCommand);
    ctx.record_command(VerifyOtpCommand);
    ctx.record_command(CheckSessionCommand);
    ctx.record_command(LogoutCommand);
    ctx.record_command(FetchQrCodeCommand);
    ctx.record_command(ShortenCommand);
    ctx.record_command(HistoryCommand);

    ctx
}

/// Opens the dialog on the login panel after the configured delay.
pub fn open_login_modal(ctx: &mut StateCtx) {
    let now = ctx.state::<Time>().now();
    let delay = ctx.state::<BusinessConfig>().modal_open_delay();
    ctx.update::<ModalView>(|view| view.open_login_modal(now, delay));
}

/// Opens the dialog on the register panel after the configured delay.
pub fn open_register_modal(ctx: &mut StateCtx) {
    let now = ctx.state::<Time>().now();
    let delay = ctx.state::<BusinessConfig>().modal_open_delay();
    ctx.update::<ModalView>(|view| view.open_register_modal(now, delay));
}
