//! va-core: stable foundation for the VSPAERO driver.
//!
//! Contains:
//! - aero (flow conditions and solver enums shared by every layer)
//! - ids (stable compact IDs for groups, disks and results)
//! - numeric (C-compatible number formatting and prefix parsing)
//! - error (shared error types)

pub mod aero;
pub mod error;
pub mod ids;
pub mod numeric;

// Re-exports for downstream crates
pub use aero::*;
pub use error::{CoreError, CoreResult};
pub use ids::*;
pub use numeric::*;
