//! OTP panel, reached only after a successful registration.

use egui::{Key, RichText, TextEdit, Ui};
use utl_business::{OtpCompute, OtpInput, VerifyOtpCommand};
use utl_states::StateCtx;

pub fn otp_panel(state_ctx: &mut StateCtx, ui: &mut Ui) {
    let mut input = state_ctx.state::<OtpInput>().clone();
    let pending = state_ctx
        .cached::<OtpCompute>()
        .is_some_and(OtpCompute::is_pending);
    let mut submit = false;

    ui.label("We sent a one-time code to");
    ui.label(RichText::new(&input.email).strong());
    ui.add_space(8.0);

    ui.horizontal(|ui| {
        ui.label("OTP");
        let code = ui.add(
            TextEdit::singleline(&mut input.code)
                .desired_width(120.0)
                .hint_text("123456"),
        );
        if code.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
            submit = true;
        }
    });

    ui.add_space(12.0);
    ui.horizontal(|ui| {
        if ui
            .add_enabled(!pending, egui::Button::new("Verify OTP"))
            .clicked()
        {
            submit = true;
        }
        if pending {
            ui.spinner();
        }
    });

    if *state_ctx.state::<OtpInput>() != input {
        *state_ctx.state_mut::<OtpInput>() = input;
    }

    if submit && !pending {
        state_ctx.dispatch::<VerifyOtpCommand>();
    }
}
