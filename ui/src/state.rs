use utl_business::{BusinessConfig, build_state_ctx};
use utl_states::StateCtx;

/// A texture uploaded for one QR code URL.
pub struct QrTexture {
    pub url: String,
    pub texture: egui::TextureHandle,
}

/// The main application state.
pub struct State {
    /// The state context for business logic.
    pub ctx: StateCtx,
    /// Whether the QR code of the share link is shown.
    pub show_qr: bool,
    /// The share link `show_qr` refers to.
    pub shown_link: Option<String>,
    pub qr_texture: Option<QrTexture>,
}

impl Default for State {
    fn default() -> Self {
        Self::new(BusinessConfig::default())
    }
}

impl State {
    pub fn new(config: BusinessConfig) -> Self {
        Self {
            ctx: build_state_ctx(config),
            show_qr: false,
            shown_link: None,
            qr_texture: None,
        }
    }

    /// State against a test server, with the modal opening without delay.
    pub fn test(base_url: String) -> Self {
        let mut config = BusinessConfig::new(base_url);
        config.modal_open_delay_ms = 0;
        Self::new(config)
    }
}
