//! Links shortened in this session or by this account, newest first.
//! Picking one makes it the current share link.

use egui::{RichText, ScrollArea, Ui};
use utl_business::{HistoryCommand, HistoryCompute, HistoryStatus, ShareLink};
use utl_states::StateCtx;

use crate::utils::colors::COLOR_RED;

pub fn link_history(state_ctx: &mut StateCtx, ui: &mut Ui) {
    let status = state_ctx
        .cached::<HistoryCompute>()
        .map(|compute| compute.status.clone())
        .unwrap_or_default();
    let mut picked = None;
    let mut refresh = false;

    ui.horizontal(|ui| {
        ui.strong("History");
        if ui.small_button("Refresh").clicked() {
            refresh = true;
        }
    });

    match &status {
        HistoryStatus::Idle => {}
        HistoryStatus::Loading => {
            ui.spinner();
        }
        HistoryStatus::Failed(message) => {
            ui.label(RichText::new(message).color(COLOR_RED));
        }
        HistoryStatus::Loaded(entries) if entries.is_empty() => {
            ui.weak("No links yet");
        }
        HistoryStatus::Loaded(entries) => {
            ScrollArea::vertical().max_height(160.0).show(ui, |ui| {
                for entry in entries {
                    ui.horizontal(|ui| {
                        if ui.link(&entry.short_url).clicked() {
                            picked = Some(entry.short_url.clone());
                        }
                        ui.weak(&entry.original_url);
                    });
                }
            });
        }
    }

    if let Some(url) = picked {
        state_ctx.update::<ShareLink>(|link| *link = ShareLink::new(url));
    }
    if refresh {
        state_ctx.dispatch::<HistoryCommand>();
    }
}
