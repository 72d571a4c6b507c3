//! Shortening a URL and listing the links made so far.
//!
//! `ShortenCommand` posts `ShortenInput` to `/shorten` and puts the returned
//! short URL into `ShareLink`, where the copy, QR and share actions pick it up.
//! `HistoryCommand` loads `/api/history`, newest first.

use std::any::Any;

use log::{debug, error, info, warn};
use utl_states::{
    Command, CommandFuture, CommandSnapshot, Compute, ComputeDeps, Dep, State, StateCtx, Updater,
    assign_impl, state_assign_impl,
};
use ustr::Ustr;

use crate::{
    BusinessConfig, FlowError, FlowStatus, QrImageCompute, ShareLink,
    api::{HistoryEntry, ShortenRequest, ShortenResponse, backend_error},
    http::Client,
};

pub const URL_REQUIRED: &str = "Please enter a URL to shorten.";
pub const SHORTEN_FAILED: &str = "Could not shorten the URL";
pub const HISTORY_FAILED: &str = "Failed to fetch history";

/// The long URL typed into the shorten form.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct ShortenInput {
    pub original_url: String,
}

impl ShortenInput {
    pub fn validate(&self) -> Result<ShortenRequest, FlowError> {
        let original_url = self.original_url.trim();
        if original_url.is_empty() {
            return Err(FlowError::validation(URL_REQUIRED));
        }
        Ok(ShortenRequest {
            original_url: original_url.to_owned(),
        })
    }
}

impl State for ShortenInput {
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

#[derive(Default, Debug, Clone)]
pub struct ShortenCompute {
    pub status: FlowStatus,
}

impl ShortenCompute {
    pub fn is_pending(&self) -> bool {
        self.status.is_pending()
    }
}

impl Compute for ShortenCompute {
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

/// `POST {base}/shorten`. Errors come back as plain text.
pub async fn shorten(shorten_url: &str, request: &ShortenRequest) -> Result<String, FlowError> {
    let response = Client::post(shorten_url)
        .json(request)
        .map_err(|e| FlowError::Transport(e.to_string()))?
        .send()
        .await?;

    if !response.is_success() {
        return Err(backend_error(&response, true, SHORTEN_FAILED));
    }

    let body: ShortenResponse = response
        .json()
        .map_err(|e| FlowError::Transport(format!("Invalid shorten response: {e}")))?;
    if body.short_url.is_empty() {
        return Err(FlowError::Transport("Empty short URL".to_owned()));
    }
    Ok(body.short_url)
}

/// Manual-only command submitting the shorten form.
#[derive(Default, Debug)]
pub struct ShortenCommand;

impl ShortenCommand {
    fn read(snap: &CommandSnapshot) -> Result<(ShortenInput, Ustr, bool), utl_states::Error> {
        let input = snap.state::<ShortenInput>()?.clone();
        let url = snap.state::<BusinessConfig>()?.shorten_url();
        let pending = snap.compute::<ShortenCompute>()?.is_pending();
        Ok((input, url, pending))
    }
}

impl Command for ShortenCommand {
    fn run(&self, snap: CommandSnapshot, updater: Updater) -> CommandFuture {
        let (input, shorten_url, pending) = match Self::read(&snap) {
            Ok(read) => read,
            Err(err) => {
                error!("ShortenCommand: {err}");
                return Box::pin(async {});
            }
        };

        if pending {
            debug!("ShortenCommand: already in flight, ignoring");
            return Box::pin(async {});
        }

        let request = match input.validate() {
            Ok(request) => request,
            Err(err) => {
                info!("ShortenCommand: {err}");
                updater.set(ShortenCompute {
                    status: FlowStatus::Failed(err),
                });
                return Box::pin(async {});
            }
        };

        updater.set(ShortenCompute {
            status: FlowStatus::Pending,
        });

        Box::pin(async move {
            match shorten(&shorten_url, &request).await {
                Ok(short_url) => {
                    info!("ShortenCommand: {} -> {short_url}", request.original_url);
                    let entry = HistoryEntry {
                        original_url: request.original_url,
                        short_url: short_url.clone(),
                        ..HistoryEntry::default()
                    };
                    updater.update::<HistoryCompute>(move |history| history.prepend(entry));
                    updater.set(ShareLink::new(short_url));
                    updater.set(QrImageCompute::default());
                    updater.set(ShortenCompute {
                        status: FlowStatus::Succeeded,
                    });
                }
                Err(err) => {
                    warn!("ShortenCommand: {err}");
                    updater.set(ShortenCompute {
                        status: FlowStatus::Failed(err),
                    });
                }
            }
        })
    }
}

/// Clears the form and the current link, ready for another URL.
pub fn start_new_link(ctx: &mut StateCtx) {
    ctx.update::<ShortenInput>(|input| *input = ShortenInput::default());
    ctx.update::<ShareLink>(|link| *link = ShareLink::default());
    let updater = ctx.updater();
    updater.set(ShortenCompute::default());
    updater.set(QrImageCompute::default());
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HistoryStatus {
    #[default]
    Idle,
    Loading,
    Loaded(Vec<HistoryEntry>),
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct HistoryCompute {
    pub status: HistoryStatus,
}

impl HistoryCompute {
    pub fn entries(&self) -> &[HistoryEntry] {
        match &self.status {
            HistoryStatus::Loaded(entries) => entries,
            _ => &[],
        }
    }

    /// Puts a freshly shortened link on top of the list. A fetch still
    /// running already includes it.
    pub fn prepend(&mut self, entry: HistoryEntry) {
        if let HistoryStatus::Loaded(entries) = &mut self.status {
            entries.insert(0, entry);
        } else if self.status != HistoryStatus::Loading {
            self.status = HistoryStatus::Loaded(vec![entry]);
        }
    }
}

impl Compute for HistoryCompute {
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

/// `GET {api_url}/history`.
pub async fn fetch_history(api_url: &str) -> Result<Vec<HistoryEntry>, FlowError> {
    let response = Client::get(format!("{api_url}/history")).send().await?;
    if !response.is_success() {
        return Err(backend_error(&response, true, HISTORY_FAILED));
    }
    response
        .json()
        .map_err(|e| FlowError::Transport(format!("Invalid history response: {e}")))
}

#[derive(Default, Debug)]
pub struct HistoryCommand;

impl Command for HistoryCommand {
    fn run(&self, snap: CommandSnapshot, updater: Updater) -> CommandFuture {
        let api_url = match snap.state::<BusinessConfig>() {
            Ok(config) => config.api_url(),
            Err(err) => {
                error!("HistoryCommand: {err}");
                return Box::pin(async {});
            }
        };

        updater.set(HistoryCompute {
            status: HistoryStatus::Loading,
        });

        Box::pin(async move {
            let status = match fetch_history(&api_url).await {
                Ok(entries) => {
                    debug!("HistoryCommand: {} links", entries.len());
                    HistoryStatus::Loaded(entries)
                }
                Err(err) => {
                    warn!("HistoryCommand: {err}");
                    HistoryStatus::Failed(err.to_string())
                }
            };
            updater.set(HistoryCompute { status });
        })
    }
}
