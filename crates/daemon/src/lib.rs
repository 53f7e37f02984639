//! The lacquer daemon.
//!
//! [`Settings`] describe where themes live and how the background loop is
//! timed; [`App`] wires the theme registry, the remote catalog and the
//! reconciliation loop together and exposes the command interface.

pub mod app;
pub mod settings;

pub use app::App;
pub use settings::{Settings, SettingsError};
