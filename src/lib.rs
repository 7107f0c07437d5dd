#![allow(clippy::uninlined_format_args)]

pub mod app;
pub mod channel;
pub mod config;
pub mod event;
pub mod format;
pub mod linked;
pub mod progress;
pub mod replies;
pub mod session;
pub mod stats;
pub mod thread;
pub mod view;
pub mod youtube;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use app::run;
pub use session::SessionController;
