//! Core types for the shoetag footwear ledger.
//!
//! - [`registry`]: model and color name/code bijections.
//! - [`codec`]: the 11-digit identifier, encoded and decoded.
//! - [`ledger`]: labels, stock and departures over any [`store::LedgerStore`].
//!
//! This crate is free of database and CLI dependencies.

pub mod codec;
pub mod error;
pub mod identifier;
pub mod ledger;
pub mod locks;
pub mod record;
pub mod registry;
pub mod store;

pub use error::{Error, Result};
pub use identifier::{AttributeInput, Attributes, Identifier};
pub use ledger::Ledger;
pub use registry::Registry;
