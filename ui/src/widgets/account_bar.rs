//! Entry points in the top bar.
//!
//! - signed out: "Login" and "Sign up", each opening the modal on its panel
//! - signed in: the account email and "Logout"

use egui::{Color32, Frame, Margin, Response, RichText, Ui};
use utl_business::{
    LogoutCommand, SessionCompute, SessionStatus, open_login_modal, open_register_modal,
};
use utl_states::StateCtx;

use crate::utils::colors::{COLOR_BLUE, COLOR_GREEN};

pub fn account_bar(state_ctx: &mut StateCtx, ui: &mut Ui) -> Response {
    let status = state_ctx
        .cached::<SessionCompute>()
        .map(|compute| compute.status.clone())
        .unwrap_or_default();

    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| match status {
        SessionStatus::SignedIn { email } => signed_in(state_ctx, ui, &email),
        SessionStatus::Unknown | SessionStatus::Checking => {
            ui.spinner();
        }
        SessionStatus::SignedOut => signed_out(state_ctx, ui),
    })
    .response
}

fn signed_out(state_ctx: &mut StateCtx, ui: &mut Ui) {
    // Right-to-left, so "Sign up" ends up rightmost.
    if entry_button(ui, "Sign up", COLOR_BLUE).clicked() {
        open_register_modal(state_ctx);
    }
    if entry_button(ui, "Login", COLOR_BLUE).clicked() {
        open_login_modal(state_ctx);
    }
}

fn signed_in(state_ctx: &mut StateCtx, ui: &mut Ui, email: &str) {
    if ui.button("Logout").clicked() {
        state_ctx.dispatch::<LogoutCommand>();
    }

    Frame::NONE
        .fill(COLOR_GREEN)
        .inner_margin(Margin::symmetric(12, 4))
        .outer_margin(Margin::symmetric(0, 4))
        .corner_radius(4.0)
        .show(ui, |ui| {
            ui.label(RichText::new(email).color(Color32::WHITE));
        });
}

fn entry_button(ui: &mut Ui, text: &str, fill: Color32) -> Response {
    ui.add(
        egui::Button::new(RichText::new(text).color(Color32::WHITE))
            .fill(fill)
            .corner_radius(4.0),
    )
}
