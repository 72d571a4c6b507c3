//! The account modal: one window showing whichever panel `ModalView` holds.
//!
//! Closing (window button or Esc) goes through `ModalView::close`, so the
//! banner never outlives the dialog.

use egui::{Align2, Id, Key, Window};
use utl_business::{ModalView, Panel};
use utl_states::{StateCtx, Time};

use super::{banner, login_panel, otp_panel, register_panel};

pub fn auth_modal(ctx: &egui::Context, state_ctx: &mut StateCtx) {
    let view = state_ctx.state::<ModalView>();
    if !view.is_open() {
        return;
    }

    if ctx.input(|i| i.key_pressed(Key::Escape)) {
        state_ctx.update::<ModalView>(ModalView::close);
        return;
    }

    let now = state_ctx.state::<Time>().now();
    let offset = view.shake_offset(now);
    let title = view.title();
    let panel = view.panel();
    let current_banner = view.banner().cloned();

    let mut open = true;
    Window::new(title)
        .id(Id::new("auth_modal"))
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, [offset, 0.0])
        .open(&mut open)
        .show(ctx, |ui| {
            ui.set_min_width(320.0);
            banner(ui, current_banner.as_ref());

            match panel {
                Panel::Login => login_panel(state_ctx, ui),
                Panel::Register => register_panel(state_ctx, ui),
                Panel::Otp => otp_panel(state_ctx, ui),
            }
        });

    if !open {
        state_ctx.update::<ModalView>(ModalView::close);
    }
}
