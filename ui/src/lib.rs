#![warn(clippy::all, rust_2018_idioms)]

//! egui client for the UseThisLink account modal.

pub mod app;
pub mod state;
pub mod utils;
pub mod widgets;

pub use app::UtlApp;
