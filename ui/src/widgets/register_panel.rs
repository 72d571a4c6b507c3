//! Register panel: email, password and confirmation, submitted by `RegisterCommand`.

use egui::{Key, TextEdit, Ui};
use utl_business::{ModalView, RegisterCommand, RegisterCompute, RegisterInput};
use utl_states::StateCtx;

const FIELD_WIDTH: f32 = 220.0;

pub fn register_panel(state_ctx: &mut StateCtx, ui: &mut Ui) {
    let mut input = state_ctx.state::<RegisterInput>().clone();
    let pending = state_ctx
        .cached::<RegisterCompute>()
        .is_some_and(RegisterCompute::is_pending);
    let mut submit = false;
    let mut switch_to_login = false;

    egui::Grid::new("register_fields")
        .num_columns(2)
        .spacing([8.0, 8.0])
        .show(ui, |ui| {
            ui.label("Email");
            ui.add(
                TextEdit::singleline(&mut input.email)
                    .desired_width(FIELD_WIDTH)
                    .hint_text("you@example.com"),
            );
            ui.end_row();

            ui.label("Password");
            ui.add(
                TextEdit::singleline(&mut input.password)
                    .password(true)
                    .desired_width(FIELD_WIDTH),
            );
            ui.end_row();

            ui.label("Repeat Password");
            let confirmation = ui.add(
                TextEdit::singleline(&mut input.password_confirmation)
                    .password(true)
                    .desired_width(FIELD_WIDTH),
            );
            if confirmation.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
                submit = true;
            }
            ui.end_row();
        });

    ui.add_space(12.0);
    ui.horizontal(|ui| {
        if ui
            .add_enabled(!pending, egui::Button::new("Create account"))
            .clicked()
        {
            submit = true;
        }
        if pending {
            ui.spinner();
        }
    });

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        ui.label("Already have an account?");
        if ui.link("Login").clicked() {
            switch_to_login = true;
        }
    });

    if *state_ctx.state::<RegisterInput>() != input {
        *state_ctx.state_mut::<RegisterInput>() = input;
    }

    if switch_to_login {
        state_ctx.update::<ModalView>(ModalView::show_login);
    } else if submit && !pending {
        state_ctx.dispatch::<RegisterCommand>();
    }
}
