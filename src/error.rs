//! Error handling for archive and decode operations
//!
//! The error type lives in [`crate::common`]; this module re-exports it
//! under the conventional path.

pub use crate::common::Result;
pub use crate::common::TexPakError;
