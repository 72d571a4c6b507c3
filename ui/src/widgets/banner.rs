use egui::{RichText, Ui};
use utl_business::{Banner, BannerStyle};

use crate::utils::colors::{COLOR_EMPHASIZED_RED, COLOR_GREEN, COLOR_RED};

/// The message line above a panel's fields.
pub fn banner(ui: &mut Ui, banner: Option<&Banner>) {
    let Some(banner) = banner else {
        return;
    };

    let text = RichText::new(&banner.message);
    let text = match banner.style {
        BannerStyle::Plain => text.color(COLOR_RED),
        BannerStyle::Emphasized => text.color(COLOR_EMPHASIZED_RED).italics(),
        BannerStyle::Success => text.color(COLOR_GREEN),
    };
    ui.label(text);
    ui.add_space(8.0);
}
