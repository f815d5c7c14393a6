#![deny(unsafe_code)]
//! # logicnet-circuit
//!
//! Adder circuits composed from boolean rule nodes held in a
//! [`RuleService`](logicnet_service::RuleService).
//!
//! A circuit is a naming scheme plus a set of rules. Each circuit describes
//! the nodes it owns as a [`Blueprint`]; the [`engine`] turns blueprints into
//! service calls in an order the service accepts.
//!
//! ## Key Components
//!
//! - [`HalfAdder`], [`FullAdder`], [`RippleCarryAdder`]: the circuits
//! - [`Blueprint`]: local mirror of a circuit's dependency graph
//! - [`exercise`](exercise::exercise): one random addition with bounded retry
//! - [`SettlePolicy`]: settle delay and retry schedule for reads

pub mod blueprint;
pub mod engine;
pub mod error;
pub mod exercise;
pub mod full_adder;
pub mod half_adder;
pub mod ripple_carry;
pub mod settle;

pub use blueprint::Blueprint;
pub use engine::{BuildStrategy, GraphTrace, ServiceTopology, Topology};
pub use error::{CircuitError, Direction, Result};
pub use exercise::{exercise, random_operands, ExerciseReport};
pub use full_adder::FullAdder;
pub use half_adder::HalfAdder;
pub use ripple_carry::RippleCarryAdder;
pub use settle::SettlePolicy;
