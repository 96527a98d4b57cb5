//! Core types and helpers for agentmem
//!
//! Domain records shared by every other crate, boundary validation,
//! environment-driven configuration and small vector/text utilities.

mod alias;
mod config;
mod constants;
mod env_config;
mod error;
mod observation;
mod search;
mod session;
mod summary;
mod text;
pub mod validation;
mod vector;

pub use alias::*;
pub use config::*;
pub use constants::*;
pub use env_config::*;
pub use error::*;
pub use observation::*;
pub use search::*;
pub use session::*;
pub use summary::*;
pub use text::*;
pub use vector::*;
