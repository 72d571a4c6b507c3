pub mod colors;
pub mod platform;
pub mod qr;
