//! Copy, QR code and share buttons for the current shortened link.

use chrono::{DateTime, Utc};
use egui::{RichText, TextureOptions, Ui, load::SizedTexture};
use utl_business::{
    COPIED_NOTICE, FetchQrCodeCommand, QR_CODE_SIZE, QrCodeUrlCompute, QrImageCompute,
    QrImageStatus, ShareAction, ShareLink,
};
use utl_states::Time;

use crate::{
    state::{QrTexture, State},
    utils::{colors::COLOR_GREEN, platform, qr},
};

pub fn link_actions(state: &mut State, ui: &mut Ui) {
    let now = state.ctx.state::<Time>().now();
    let link = state.ctx.state::<ShareLink>().clone();

    // Whatever set a new link, the old QR code no longer applies.
    if state.shown_link != link.url {
        state.shown_link.clone_from(&link.url);
        state.show_qr = false;
    }
    let Some(url) = link.url.clone() else {
        return;
    };

    ui.horizontal(|ui| {
        ui.label("Short link");
        ui.label(RichText::new(&url).strong());
    });

    ui.horizontal(|ui| {
        if ui.button("Copy").clicked() {
            copy(state, ui, &url, now);
        }
        if ui.button("QR Code").clicked() {
            state.show_qr = !state.show_qr;
            if state.show_qr {
                state.ctx.dispatch::<FetchQrCodeCommand>();
            }
        }
        if ui.button("Share").clicked() {
            match ShareAction::choose(platform::native_share_available()) {
                ShareAction::Native => platform::native_share(&url),
                ShareAction::Clipboard => copy(state, ui, &url, now),
            }
        }
        if link.copied_recently(now) {
            ui.label(RichText::new(COPIED_NOTICE).color(COLOR_GREEN));
        }
    });

    if state.show_qr {
        ui.add_space(8.0);
        qr_code(state, ui, &url);
    }
}

fn copy(state: &mut State, ui: &Ui, url: &str, now: DateTime<Utc>) {
    ui.ctx().copy_text(url.to_owned());
    state.ctx.update::<ShareLink>(|link| link.mark_copied(now));
}

fn qr_code(state: &mut State, ui: &mut Ui, link_url: &str) {
    let Some(qr_url) = state
        .ctx
        .cached::<QrCodeUrlCompute>()
        .and_then(|compute| compute.url.clone())
    else {
        ui.spinner();
        return;
    };

    if let Some(cached) = &state.qr_texture
        && cached.url == qr_url
    {
        ui.image(SizedTexture::from_handle(&cached.texture));
        return;
    }

    let status = state
        .ctx
        .cached::<QrImageCompute>()
        .map(|compute| compute.status.clone())
        .unwrap_or_default();

    let image = match status {
        QrImageStatus::Loaded { url, png } if url == qr_url => {
            qr::decode_png(&png).or_else(|| qr::generate_qr_image(link_url, QR_CODE_SIZE as usize))
        }
        QrImageStatus::Failed(err) => {
            log::info!("Rendering QR code locally: {err}");
            qr::generate_qr_image(link_url, QR_CODE_SIZE as usize)
        }
        QrImageStatus::Idle | QrImageStatus::Loading | QrImageStatus::Loaded { .. } => {
            ui.spinner();
            return;
        }
    };

    let Some(image) = image else {
        ui.label("QR code unavailable");
        return;
    };

    let texture = ui
        .ctx()
        .load_texture("share_link_qr", image, TextureOptions::NEAREST);
    ui.image(SizedTexture::from_handle(&texture));
    state.qr_texture = Some(QrTexture {
        url: qr_url,
        texture,
    });
}
