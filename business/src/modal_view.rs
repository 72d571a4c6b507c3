//! View state of the account modal.
//!
//! The modal holds three panels (login, register, OTP). `ModalView::panel` is a
//! single enum value, so exactly one panel is visible at any time, and every
//! panel switch clears the banner.

use std::any::Any;

use chrono::{DateTime, Duration, Utc};
use utl_states::{State, state_assign_impl};

/// Length of the failed-login shake.
pub const SHAKE_DURATION_MS: i64 = 1000;

const SHAKE_AMPLITUDE: f32 = 10.0;
const SHAKE_OSCILLATIONS: f32 = 4.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Panel {
    #[default]
    Login,
    Register,
    Otp,
}

impl Panel {
    /// Dialog title while this panel is shown. The OTP step belongs to registration.
    pub fn title(self) -> &'static str {
        match self {
            Self::Login => "Login with",
            Self::Register | Self::Otp => "Register with",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BannerStyle {
    #[default]
    Plain,
    /// Distinguished failure, e.g. registering an email that already has an account.
    Emphasized,
    /// Confirmation, e.g. after a verified registration.
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub message: String,
    pub style: BannerStyle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Shake {
    #[default]
    Still,
    /// Requested from a command; starts on the next `tick`.
    Requested,
    Since(DateTime<Utc>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalView {
    panel: Panel,
    open: bool,
    open_at: Option<DateTime<Utc>>,
    banner: Option<Banner>,
    shake: Shake,
}

impl ModalView {
    pub fn panel(&self) -> Panel {
        self.panel
    }

    pub fn is_visible(&self, panel: Panel) -> bool {
        self.panel == panel
    }

    pub fn title(&self) -> &'static str {
        self.panel.title()
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Opening was requested but the delay has not elapsed yet.
    pub fn is_opening(&self) -> bool {
        self.open_at.is_some()
    }

    pub fn opens_at(&self) -> Option<DateTime<Utc>> {
        self.open_at
    }

    pub fn show_login(&mut self) {
        self.switch_to(Panel::Login);
    }

    pub fn show_register(&mut self) {
        self.switch_to(Panel::Register);
    }

    /// Only reached from a successful registration.
    pub fn show_otp(&mut self) {
        self.switch_to(Panel::Otp);
    }

    pub fn open_login_modal(&mut self, now: DateTime<Utc>, delay: Duration) {
        self.show_login();
        self.schedule_open(now, delay);
    }

    pub fn open_register_modal(&mut self, now: DateTime<Utc>, delay: Duration) {
        self.show_register();
        self.schedule_open(now, delay);
    }

    /// Advances time-based transitions: delayed opening and the shake start.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if let Some(at) = self.open_at
            && now >= at
        {
            self.open = true;
            self.open_at = None;
        }

        match self.shake {
            Shake::Requested => self.shake = Shake::Since(now),
            Shake::Since(start) if now - start >= Duration::milliseconds(SHAKE_DURATION_MS) => {
                self.shake = Shake::Still;
            }
            Shake::Still | Shake::Since(_) => {}
        }
    }

    pub fn close(&mut self) {
        self.open = false;
        self.open_at = None;
        self.banner = None;
        self.shake = Shake::Still;
    }

    pub fn show_error(&mut self, message: impl Into<String>, style: BannerStyle) {
        self.banner = Some(Banner {
            message: message.into(),
            style,
        });
    }

    pub fn show_notice(&mut self, message: impl Into<String>) {
        self.show_error(message, BannerStyle::Success);
    }

    pub fn clear_banner(&mut self) {
        self.banner = None;
    }

    pub fn start_shake(&mut self) {
        self.shake = Shake::Requested;
    }

    pub fn is_shaking(&self) -> bool {
        !matches!(self.shake, Shake::Still)
    }

    /// Horizontal dialog offset for the shake, decaying to zero.
    pub fn shake_offset(&self, now: DateTime<Utc>) -> f32 {
        let Shake::Since(start) = self.shake else {
            return 0.0;
        };
        let elapsed = (now - start).num_milliseconds();
        if !(0..SHAKE_DURATION_MS).contains(&elapsed) {
            return 0.0;
        }

        let progress = elapsed as f32 / SHAKE_DURATION_MS as f32;
        let phase = progress * SHAKE_OSCILLATIONS * std::f32::consts::TAU;
        phase.sin() * SHAKE_AMPLITUDE * (1.0 - progress)
    }

    fn switch_to(&mut self, panel: Panel) {
        self.panel = panel;
        self.banner = None;
    }

    fn schedule_open(&mut self, now: DateTime<Utc>, delay: Duration) {
        if delay <= Duration::zero() {
            self.open = true;
            self.open_at = None;
        } else {
            self.open_at = Some(now + delay);
        }
    }
}

impl State for ModalView {
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
