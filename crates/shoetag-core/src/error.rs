//! Error types for `shoetag-core`.

use std::fmt;

use serde::Serialize;
use strum::Display;
use thiserror::Error;

use crate::{
  identifier::Identifier,
  record::Location,
  registry::Category,
};

// ─── Validation ──────────────────────────────────────────────────────────────

/// The input field a [`ValidationError`] refers to.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Field {
  Length,
  Digits,
  SchemeYear,
  Size,
  PairCount,
  Model,
  Color,
  Date,
  ManufacturingOrder,
  Quantity,
  Location,
}

/// A malformed or out-of-range input, naming the offending field so the
/// operator scanning a bad label sees why it was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
  pub field:  Field,
  pub reason: String,
}

impl ValidationError {
  pub fn new(field: Field, reason: impl Into<String>) -> Self {
    Self { field, reason: reason.into() }
  }
}

// ─── Registry ────────────────────────────────────────────────────────────────

/// A registry lookup miss.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no {category} registered for {key:?}")]
pub struct NotFound {
  pub category: Category,
  pub key:      String,
}

/// Raised while building a [`crate::registry::Registry`] from entries that
/// would break the name/code bijection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
  #[error("{category} name must not be empty")]
  EmptyName { category: Category },

  #[error("{category} code {code:?} must be exactly {width} digits")]
  BadCode { category: Category, code: String, width: usize },

  #[error("{category} name {name:?} is registered twice")]
  DuplicateName { category: Category, name: String },

  #[error("{category} code {code:?} is shared by {first:?} and {second:?}")]
  DuplicateCode {
    category: Category,
    code:     String,
    first:    String,
    second:   String,
  },
}

// ─── Ledger ──────────────────────────────────────────────────────────────────

/// Why a departure could not be covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Shortage {
  /// Nothing of this identifier is held at the location.
  NoRecord,
  Short { available: u32 },
}

impl fmt::Display for Shortage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::NoRecord => f.write_str("no stock record"),
      Self::Short { available } => write!(f, "{available} pairs available"),
    }
  }
}

impl Shortage {
  pub fn available(self) -> u32 {
    match self {
      Self::NoRecord => 0,
      Self::Short { available } => available,
    }
  }
}

// ─── Ledger errors ───────────────────────────────────────────────────────────

/// Every way a ledger command can be refused. A refused command leaves the
/// three record sets untouched.
#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid label: {0}")]
  InvalidLabel(ValidationError),

  #[error("invalid identifier: {0}")]
  InvalidIdentifier(ValidationError),

  #[error("invalid storage location: {0}")]
  InvalidLocation(ValidationError),

  #[error("invalid date: {0}")]
  InvalidDate(ValidationError),

  #[error("invalid quantity: {0}")]
  InvalidQuantity(ValidationError),

  #[error(
    "insufficient stock for {identifier} at {location}: {shortage}, {requested} requested"
  )]
  InsufficientStock {
    identifier: Identifier,
    location:   Location,
    shortage:   Shortage,
    requested:  u32,
  },

  #[error("invalid batch: {0}")]
  InvalidBatch(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
