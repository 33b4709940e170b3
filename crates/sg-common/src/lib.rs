//! Shared infrastructure for Signet services.
//!
//! Currently this is just the logging bootstrap; anything needed by more
//! than one binary lands here.

pub mod logging;
