//! Core model for lacquer.
//!
//! A theme is a tree of style fragments bound to render surfaces ("targets").
//! This crate owns everything that decides *what* is applied *where*:
//!
//! - [`Unit`]: one fragment, tracking its live [`InjectionHandle`]s per target.
//! - [`Patch`]: a mutually exclusive option group, plus derived [`Component`]s.
//! - [`Theme`]: top-level units, patches, dependency declarations and the
//!   persisted enabled flag.
//! - [`resolve`]: dependency scoring and activation order.
//! - [`TargetIndex`]: the flattened target/unit view used for reconciliation.
//! - [`ThemeRegistry`]: the loaded theme set and every mutation command.
//!
//! The mechanism that actually injects fragments is abstracted behind [`Host`].

pub mod error;
pub mod handle;
pub mod host;
pub mod manifest;
pub mod outcome;
pub mod patch;
pub mod persist;
pub mod record;
pub mod registry;
pub mod resolve;
pub mod targets;
pub mod theme;
pub mod unit;
pub mod value;

pub use error::{Error, Result};
pub use handle::{InjectionHandle, Target};
pub use host::{Host, HostError, MemoryHost};
pub use outcome::Outcome;
pub use patch::{Component, ComponentKind, Patch, PatchEncoding, PatchKind};
pub use persist::{ConfigScope, ThemeConfig};
pub use record::{ComponentRecord, PatchRecord, ThemeRecord};
pub use registry::{ThemeLocations, ThemeRegistry};
pub use targets::{TargetIndex, UnitRef, UnitSlot};
pub use theme::Theme;
pub use unit::{Unit, UnitSource};
pub use value::PatchValue;

/// Protocol version reported to the presentation layer.
///
/// Theme manifests declaring a higher `manifest_version` are rejected.
pub const BACKEND_VERSION: u32 = 2;
