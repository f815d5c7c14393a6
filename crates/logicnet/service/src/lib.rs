#![deny(unsafe_code)]
//! # logicnet-service
//!
//! The rule evaluation service is the system of record for every node of a
//! circuit. It stores one boolean rule per named node, evaluates derived rules
//! asynchronously, and answers child/parent queries over the references
//! between rules.
//!
//! ## Service constraints
//!
//! - A rule may only reference nodes that already exist.
//! - A node may not be deleted while another node's rule references it.
//! - Batched state queries answer in the service's own order.
//!
//! ## Key Components
//!
//! - [`RuleService`]: the contract circuits are written against
//! - [`HttpRuleService`]: JSON-over-HTTP client for a remote service
//! - [`InMemoryRuleService`]: in-process service for tests and offline runs
//! - [`ServiceConfig`]: connection parameters and request decoration
//! - [`Credentials`]: profile-keyed access tokens

pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod memory;
pub mod traits;
pub mod wire;

pub use config::{ServiceConfig, DEFAULT_ENDPOINT, DEFAULT_REGION, REGION_HEADER};
pub use credentials::Credentials;
pub use error::{Result, ServiceError};
pub use http::HttpRuleService;
pub use memory::InMemoryRuleService;
pub use traits::RuleService;
