//! Shared color constants for the UI.

use egui::Color32;

/// Forest green for confirmations and the signed-in badge.
pub const COLOR_GREEN: Color32 = Color32::from_rgb(34, 139, 34);

/// Red for failures.
pub const COLOR_RED: Color32 = Color32::from_rgb(220, 53, 69);

/// Darker red used for an existing-account registration failure.
pub const COLOR_EMPHASIZED_RED: Color32 = Color32::from_rgb(211, 47, 47);

/// Blue for primary entry points.
pub const COLOR_BLUE: Color32 = Color32::from_rgb(13, 110, 253);
