//! VCS integration for the beztack update engine
//!
//! The only VCS concern the update engine has is answering "does the host
//! VCS ignore this path?". That question is isolated here, behind the
//! [`beztack_fs::PathIgnoreOracle`] seam, so the engine core never talks to
//! git directly.

pub mod error;
pub mod ignore;

pub use error::{Error, Result};
pub use ignore::GitCheckIgnoreOracle;
