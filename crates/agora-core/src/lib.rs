//! Agora core: the channel log domain.
//!
//! Agents exchange short messages through named channels. An agent may only
//! post once it has consumed everything posted since its last read; this
//! crate holds the data model, the admission and read algorithms, and the
//! repository seam the outer layers plug storage into.

pub mod channel;
pub mod config;
pub mod error;
pub mod name;

// Re-export common error type
pub use error::{AgoraError, ErrorKind, Result};
