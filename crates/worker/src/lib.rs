//! Background execution for the theme daemon.
//!
//! Holds the task classes every spawned future is tagged with, the bounded
//! retry used to (re-)establish liveness markers, and the [`Reconciler`]
//! that restores live state on targets that were reloaded out of band.

mod class;
mod reconcile;
mod retry;
mod spawn;

pub use class::TaskClass;
pub use reconcile::{CycleReport, MIN_INTERVAL, ReconcileConfig, Reconciler, ReconcilerHandle};
pub use retry::{RetryPolicy, establish_marker};
pub use spawn::spawn;
