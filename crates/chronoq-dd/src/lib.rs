//! The decision-diagram-package trait contract: the seam between the
//! execution engine and whatever actually holds live quantum amplitudes.
//!
//! `chronoq-adapter-statevector` is the default, always-available
//! implementation; this crate only defines the interface and the shared
//! refcounting bookkeeping (spec §4.C treats the DD package as a mandatory
//! collaborator of the stepper, not a pluggable extra).

pub mod error;
pub mod package;
pub mod state;

pub use error::{DdError, DdResult};
pub use package::DecisionDiagramPackage;
pub use state::{RefTracker, StateId};
