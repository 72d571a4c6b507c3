use std::any::Any;

use chrono::Duration;
use log::info;
use serde::Deserialize;
use utl_states::{State, state_assign_impl};
use ustr::Ustr;

/// Delay between switching the panel and showing the dialog, so the switch
/// settles before the dialog appears.
pub const DEFAULT_MODAL_OPEN_DELAY_MS: u64 = 230;

const MAX_MODAL_OPEN_DELAY_MS: u64 = 60_000;

pub const DEFAULT_DASHBOARD_PATH: &str = "/dashboard";

const ENV_PREFIX: &str = "UTL_";

/// What a successful OTP verification leads to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OtpSuccess {
    /// Leave the page for the given path (the account is signed in by the backend).
    Redirect(String),
    /// Go back to the login panel with a confirmation notice.
    ReturnToLogin,
}

impl Default for OtpSuccess {
    fn default() -> Self {
        Self::Redirect(DEFAULT_DASHBOARD_PATH.to_owned())
    }
}

impl OtpSuccess {
    /// Parses `login`, `redirect`, or an absolute path such as `/home`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "login" => Some(Self::ReturnToLogin),
            "redirect" => Some(Self::default()),
            path if path.starts_with('/') => Some(Self::Redirect(path.to_owned())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BusinessConfig {
    pub api_base_url: String,
    pub modal_open_delay_ms: u64,
    pub otp_success: OtpSuccess,
}

/// Environment overrides, read from `UTL_*` variables.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    api_base_url: Option<String>,
    modal_open_delay_ms: Option<u64>,
    otp_success: Option<String>,
}

impl BusinessConfig {
    pub fn new(base_url: String) -> Self {
        Self {
            api_base_url: base_url,
            ..Self::default()
        }
    }

    /// Defaults overridden by `UTL_API_BASE_URL`, `UTL_MODAL_OPEN_DELAY_MS`
    /// and `UTL_OTP_SUCCESS`.
    pub fn from_env() -> anyhow::Result<Self> {
        let vars = std::env::vars().filter_map(|(key, value)| {
            key.strip_prefix(ENV_PREFIX)
                .map(|key| (key.to_owned(), value))
        });
        Self::from_vars(vars)
    }

    pub fn from_vars<I, S>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let raw: RawConfig = serde_env::from_iter(vars)?;
        let mut config = Self::default();

        if let Some(base_url) = raw.api_base_url {
            info!("Using UTL_API_BASE_URL: {base_url}");
            config.api_base_url = base_url.trim_end_matches('/').to_owned();
        }
        if let Some(delay) = raw.modal_open_delay_ms {
            config.modal_open_delay_ms = delay;
        }
        if let Some(raw_success) = raw.otp_success {
            config.otp_success = OtpSuccess::parse(&raw_success).ok_or_else(|| {
                anyhow::anyhow!(
                    "UTL_OTP_SUCCESS must be `login`, `redirect` or a path, got `{raw_success}`"
                )
            })?;
        }

        Ok(config)
    }

    pub fn api_url(&self) -> Ustr {
        if self.api_base_url.is_empty() {
            Ustr::from("/api")
        } else {
            Ustr::from(&format!("{}/api", self.api_base_url))
        }
    }

    /// The shortener endpoint, served next to `/api` rather than under it.
    pub fn shorten_url(&self) -> Ustr {
        Ustr::from(&format!("{}/shorten", self.api_base_url))
    }

    /// Capped at one minute.
    pub fn modal_open_delay(&self) -> Duration {
        Duration::milliseconds(self.modal_open_delay_ms.min(MAX_MODAL_OPEN_DELAY_MS) as i64)
    }
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            api_base_url: if cfg!(target_arch = "wasm32") {
                // Same origin as the page serving the app.
                String::new()
            } else {
                "http://localhost:8080".to_owned()
            },
            modal_open_delay_ms: DEFAULT_MODAL_OPEN_DELAY_MS,
            otp_success: OtpSuccess::default(),
        }
    }
}

impl State for BusinessConfig {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        state_assign_impl(self, new_self);
    }
}
