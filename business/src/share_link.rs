//! Actions on a shortened link: copy, QR code and share.
//!
//! The QR code is rendered by the backend (`/api/qrcode`); its URL is derived
//! from the link and the API base, and `FetchQrCodeCommand` downloads the PNG.

use std::{
    any::{Any, TypeId},
    sync::Arc,
};

use chrono::{DateTime, Duration, Utc};
use log::{error, info, warn};
use utl_states::{
    Command, CommandFuture, CommandSnapshot, Compute, ComputeDeps, Dep, State, Updater,
    assign_impl, state_assign_impl,
};

use crate::{BusinessConfig, FlowError, http::Client};

/// Edge length in pixels requested from the backend.
pub const QR_CODE_SIZE: u32 = 150;

pub const COPIED_NOTICE: &str = "Copied!";
const COPIED_NOTICE_MS: i64 = 2000;

/// The shortened link currently offered to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShareLink {
    pub url: Option<String>,
    copied_at: Option<DateTime<Utc>>,
}

impl ShareLink {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            copied_at: None,
        }
    }

    pub fn mark_copied(&mut self, now: DateTime<Utc>) {
        self.copied_at = Some(now);
    }

    /// Whether the "Copied!" notice should still be shown.
    pub fn copied_recently(&self, now: DateTime<Utc>) -> bool {
        self.copied_at
            .is_some_and(|at| now >= at && now - at < Duration::milliseconds(COPIED_NOTICE_MS))
    }
}

impl State for ShareLink {
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

/// `{api_url}/qrcode?data=<percent-encoded link>&size=<px>`.
pub fn qr_code_url(api_url: &str, data: &str, size: u32) -> String {
    format!(
        "{api_url}/qrcode?data={}&size={size}",
        urlencoding::encode(data)
    )
}

/// QR image URL for the current `ShareLink`, derived from it and `BusinessConfig`.
#[derive(Debug, Clone, Default)]
pub struct QrCodeUrlCompute {
    pub url: Option<String>,
}

impl Compute for QrCodeUrlCompute {
    fn deps(&self) -> ComputeDeps {
        vec![TypeId::of::<ShareLink>(), TypeId::of::<BusinessConfig>()]
    }

    fn compute(&self, deps: Dep<'_>, updater: Updater) {
        let (link, config) = match (deps.state::<ShareLink>(), deps.state::<BusinessConfig>()) {
            (Ok(link), Ok(config)) => (link, config),
            (Err(err), _) | (_, Err(err)) => {
                error!("QrCodeUrlCompute: {err}");
                return;
            }
        };

        let url = link
            .url
            .as_deref()
            .filter(|url| !url.is_empty())
            .map(|url| qr_code_url(&config.api_url(), url, QR_CODE_SIZE));

        if url != self.url {
            updater.set(Self { url });
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum QrImageStatus {
    #[default]
    Idle,
    Loading,
    /// PNG bytes as served for `url`.
    Loaded {
        url: String,
        png: Arc<[u8]>,
    },
    /// The UI falls back to rendering the code itself.
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct QrImageCompute {
    pub status: QrImageStatus,
}

impl QrImageCompute {
    /// PNG bytes, only if they were fetched for `url`.
    pub fn png_for(&self, url: &str) -> Option<&[u8]> {
        match &self.status {
            QrImageStatus::Loaded { url: loaded, png } if loaded == url => Some(&png[..]),
            _ => None,
        }
    }
}

impl Compute for QrImageCompute {
    fn deps(&self) -> ComputeDeps {
        Vec::new()
    }

    fn compute(&self, _deps: Dep<'_>, _updater: Updater) {}

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}

/// `GET` a QR code PNG.
pub async fn fetch_qr_code(url: &str) -> Result<Vec<u8>, FlowError> {
    let response = Client::get(url).send().await?;
    if !response.is_success() {
        let message = crate::api::body_text_message(&response.body)
            .unwrap_or_else(|| format!("QR code request failed ({})", response.status));
        return Err(FlowError::Backend {
            status: response.status,
            message,
        });
    }
    if response
        .header("content-type")
        .is_some_and(|kind| !kind.starts_with("image/"))
    {
        return Err(FlowError::Transport("QR code response is not an image".to_owned()));
    }
    Ok(response.body)
}

/// Downloads the QR code for the current `QrCodeUrlCompute`.
#[derive(Default, Debug)]
pub struct FetchQrCodeCommand;

impl Command for FetchQrCodeCommand {
    fn run(&self, snap: CommandSnapshot, updater: Updater) -> CommandFuture {
        let url = match snap.compute::<QrCodeUrlCompute>() {
            Ok(compute) => compute.url.clone(),
            Err(err) => {
                error!("FetchQrCodeCommand: {err}");
                return Box::pin(async {});
            }
        };

        let Some(url) = url else {
            warn!("FetchQrCodeCommand: no link to encode");
            updater.set(QrImageCompute::default());
            return Box::pin(async {});
        };

        updater.set(QrImageCompute {
            status: QrImageStatus::Loading,
        });

        Box::pin(async move {
            let status = match fetch_qr_code(&url).await {
                Ok(png) => {
                    info!("FetchQrCodeCommand: {} bytes", png.len());
                    QrImageStatus::Loaded {
                        url,
                        png: png.into(),
                    }
                }
                Err(err) => {
                    warn!("FetchQrCodeCommand: {err}");
                    QrImageStatus::Failed(err.to_string())
                }
            };
            updater.set(QrImageCompute { status });
        })
    }
}

/// How the share button delivers the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareAction {
    /// The platform share sheet (`navigator.share`).
    Native,
    Clipboard,
}

impl ShareAction {
    pub fn choose(native_share_available: bool) -> Self {
        if native_share_available {
            Self::Native
        } else {
            Self::Clipboard
        }
    }
}
