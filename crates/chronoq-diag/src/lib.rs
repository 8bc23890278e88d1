//! Static and combining diagnostics (spec §4.H).
//!
//! Runtime-only observations (zero/non-zero control sightings gathered while
//! actually stepping a program) live in `chronoq-engine`'s `diagnostics`
//! module; this crate covers the static half — data-dependency slicing,
//! qubit-interaction slicing — plus the logic that combines a runtime
//! observation map with a static scan into a ranked list of error causes.

pub mod causes;
pub mod dependencies;
pub mod error;
pub mod interactions;

pub use causes::{potential_error_causes, zero_control_instructions, ErrorCause};
pub use dependencies::data_dependencies;
pub use error::{DiagError, DiagResult};
pub use interactions::get_interactions;
