//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the relay.
//! Business crates depend on this crate only, reverse dependencies are prohibited.
//!
//! ## Collaborators
//! - Printer devices are reached through [`PrintDevice`]
//! - Line-oriented sources (files, fixtures) implement [`LineSource`]
//! - Chat bridges hand [`ChatMessage`]s to a [`MessageConsumer`]
//! - Every dispatch ends in a [`DeliveryOutcome`]

mod blueprint;
mod chat;
mod delivery;
mod device;
mod error;
mod line_source;

pub use blueprint::*;
pub use chat::*;
pub use delivery::*;
pub use device::*;
pub use error::*;
pub use line_source::{LineSource, LocalLineSource};
