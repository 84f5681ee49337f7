//! # Flashcoin Core
//!
//! Node-side plumbing around [`consensus_lib`]: configuration loading,
//! logging, errors and the header acceptance pipeline.

pub use consensus_lib;

pub mod config;
pub mod errors;
pub mod utils;
pub mod validator;

pub use config::NodeConfig;
pub use errors::{CoreError, HeaderRejection};
pub use validator::HeaderValidator;
