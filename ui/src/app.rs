use chrono::Utc;
use log::info;
use utl_business::{
    CheckSessionCommand, HistoryCommand, HistoryCompute, HistoryStatus, LoginCompute, ModalView,
    Navigation, OtpCompute, QrImageCompute, QrImageStatus, RegisterCompute, SessionCompute,
    SessionStatus, ShortenCompute,
};
use utl_states::Time;

use crate::{state::State, utils::platform, widgets};

pub struct UtlApp {
    state: State,
    session_requested: bool,
    /// Path of the last redirect on targets without a page to leave.
    location: Option<String>,
}

impl UtlApp {
    /// Called once before the first frame.
    pub fn new(state: State) -> Self {
        Self {
            state,
            session_requested: false,
            location: None,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Whether a command result may still arrive. On wasm tasks are not
    /// tracked, so the flow statuses are checked too.
    fn awaiting_results(&self) -> bool {
        let ctx = &self.state.ctx;
        ctx.task_count() > 0
            || ctx.cached::<LoginCompute>().is_some_and(LoginCompute::is_pending)
            || ctx
                .cached::<RegisterCompute>()
                .is_some_and(RegisterCompute::is_pending)
            || ctx.cached::<OtpCompute>().is_some_and(OtpCompute::is_pending)
            || ctx
                .cached::<SessionCompute>()
                .is_some_and(|session| session.status == SessionStatus::Checking)
            || ctx
                .cached::<QrImageCompute>()
                .is_some_and(|qr| qr.status == QrImageStatus::Loading)
            || ctx
                .cached::<ShortenCompute>()
                .is_some_and(ShortenCompute::is_pending)
            || ctx
                .cached::<HistoryCompute>()
                .is_some_and(|history| history.status == HistoryStatus::Loading)
    }

    /// Session and history both depend on who is signed in.
    fn refresh_account(&mut self) {
        self.state.ctx.dispatch::<CheckSessionCommand>();
        self.state.ctx.dispatch::<HistoryCommand>();
    }

    fn apply_navigation(&mut self) {
        let request = self.state.ctx.state_mut::<Navigation>().take();
        match request {
            Navigation::Stay => {}
            Navigation::Reload => {
                if !platform::reload() {
                    // No page to reload: ask the backend again instead.
                    self.refresh_account();
                }
            }
            Navigation::Redirect(path) => {
                if !platform::redirect(&path) {
                    info!("Now at {path}");
                    self.location = Some(path);
                    self.refresh_account();
                }
            }
        }
    }
}

impl eframe::App for UtlApp {
    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Utc::now();
        self.state.ctx.update::<Time>(|time| *time = Time::new(now));

        // Sync Compute for render
        self.state.ctx.sync_computes();
        self.state.ctx.reap_tasks();
        self.state.ctx.update::<ModalView>(|view| view.tick(now));

        if !self.session_requested {
            self.session_requested = true;
            self.refresh_account();
        }

        self.apply_navigation();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                widgets::account_bar(&mut self.state.ctx, ui);
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("UseThisLink");
            if let Some(location) = &self.location {
                ui.label(format!("You are at {location}"));
            }
            ui.separator();
            widgets::shorten_form(&mut self.state.ctx, ui);
            ui.add_space(8.0);
            widgets::link_actions(&mut self.state, ui);
            ui.separator();
            widgets::link_history(&mut self.state.ctx, ui);
        });

        widgets::auth_modal(ctx, &mut self.state.ctx);

        // Run background jobs
        self.state.ctx.run_computed();

        let view = self.state.ctx.state::<ModalView>();
        if self.awaiting_results() || view.is_opening() || view.is_shaking() {
            ctx.request_repaint_after(std::time::Duration::from_millis(16));
        }
    }
}
