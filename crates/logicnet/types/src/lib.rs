#![deny(unsafe_code)]
//! # logicnet-types
//!
//! Value types shared by every logicnet crate.
//!
//! ## Key Types
//!
//! - [`NodeName`]: globally unique identity of a node in the rule service
//! - [`Rule`]: the boolean rule a node is created with
//! - [`NodeState`]: the evaluated state reported by the rule service
//! - [`Register`]: an 8-bit unsigned value as 8 booleans

pub mod error;
pub mod name;
pub mod register;
pub mod rule;
pub mod state;

pub use error::NameError;
pub use name::NodeName;
pub use register::{Register, REGISTER_WIDTH};
pub use rule::Rule;
pub use state::NodeState;
