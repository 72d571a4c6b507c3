mod account_bar;
mod auth_modal;
mod banner;
mod link_actions;
mod link_history;
mod login_panel;
mod otp_panel;
mod register_panel;
mod shorten_form;

pub use account_bar::account_bar;
pub use auth_modal::auth_modal;
pub use banner::banner;
pub use link_actions::link_actions;
pub use link_history::link_history;
pub use login_panel::login_panel;
pub use otp_panel::otp_panel;
pub use register_panel::register_panel;
pub use shorten_form::shorten_form;
