//! The long URL form: "Shorten" submits it, "New" starts over.

use egui::{Key, TextEdit, Ui};
use utl_business::{
    Banner, BannerStyle, ShortenCommand, ShortenCompute, ShortenInput, start_new_link,
};
use utl_states::StateCtx;

use super::banner;

pub fn shorten_form(state_ctx: &mut StateCtx, ui: &mut Ui) {
    let mut input = state_ctx.state::<ShortenInput>().clone();
    let status = state_ctx
        .cached::<ShortenCompute>()
        .map(|compute| compute.status.clone())
        .unwrap_or_default();
    let pending = status.is_pending();
    let mut submit = false;
    let mut reset = false;

    ui.horizontal(|ui| {
        ui.label("Long URL");
        let field = ui.add(
            TextEdit::singleline(&mut input.original_url)
                .desired_width(280.0)
                .hint_text("https://example.com/some/long/path"),
        );
        if field.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
            submit = true;
        }
        if ui
            .add_enabled(!pending, egui::Button::new("Shorten"))
            .clicked()
        {
            submit = true;
        }
        if ui.button("New").clicked() {
            reset = true;
        }
        if pending {
            ui.spinner();
        }
    });

    if let Some(err) = status.error() {
        ui.add_space(4.0);
        banner(
            ui,
            Some(&Banner {
                message: err.to_string(),
                style: BannerStyle::Plain,
            }),
        );
    }

    if *state_ctx.state::<ShortenInput>() != input {
        *state_ctx.state_mut::<ShortenInput>() = input;
    }

    if reset {
        start_new_link(state_ctx);
    } else if submit && !pending {
        state_ctx.dispatch::<ShortenCommand>();
    }
}
