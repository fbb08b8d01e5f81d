//! Intermediate representation consumed by the strata host-kernel emitter.
//!
//! This crate defines the node model that the code generator lowers into
//! elemental loops.
//!
//! # Module Organization
//!
//! - [`types`] - Element types stored in arrays
//! - [`opcode`] - Closed set of node operation kinds
//! - [`shape`] - Static array and tuple shapes
//! - [`node`] - Immutable IR node with operands and backend configuration
//! - [`backend_config`] - Serialized backend configuration and the parallel partition directive
//! - [`error`] - Error types and result handling

pub mod backend_config;
pub mod error;
pub mod node;
pub mod opcode;
pub mod shape;
pub mod types;


pub use backend_config::{BackendConfig, ParallelConfig, parallel_config};
pub use error::{Error, Result};
pub use node::Node;
pub use opcode::Opcode;
pub use shape::{ArrayShape, Dims, Shape};
pub use types::ElementType;
