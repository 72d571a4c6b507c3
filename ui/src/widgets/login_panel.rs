//! Login panel: email and password, submitted by `LoginCommand`.

use egui::{Key, TextEdit, Ui};
use utl_business::{LoginCommand, LoginCompute, LoginInput, ModalView};
use utl_states::StateCtx;

const FIELD_WIDTH: f32 = 220.0;

pub fn login_panel(state_ctx: &mut StateCtx, ui: &mut Ui) {
    let mut input = state_ctx.state::<LoginInput>().clone();
    let pending = state_ctx
        .cached::<LoginCompute>()
        .is_some_and(LoginCompute::is_pending);
    let mut submit = false;
    let mut switch_to_register = false;

    egui::Grid::new("login_fields")
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
            let password = ui.add(
                TextEdit::singleline(&mut input.password)
                    .password(true)
                    .desired_width(FIELD_WIDTH),
            );
            if password.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
                submit = true;
            }
            ui.end_row();
        });

    ui.add_space(12.0);
    ui.horizontal(|ui| {
        if ui
            .add_enabled(!pending, egui::Button::new("Sign in"))
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
        ui.label("Looking to");
        if ui.link("create an account").clicked() {
            switch_to_register = true;
        }
        ui.label("?");
    });

    if *state_ctx.state::<LoginInput>() != input {
        *state_ctx.state_mut::<LoginInput>() = input;
    }

    if switch_to_register {
        state_ctx.update::<ModalView>(ModalView::show_register);
    } else if submit && !pending {
        state_ctx.dispatch::<LoginCommand>();
    }
}
