//! The 11-digit footwear identifier and the attributes it carries.
//!
//! Layout, left to right:
//!
//! | field       | width | domain                  |
//! |-------------|-------|-------------------------|
//! | scheme year | 2     | always [`SCHEME_YEAR`]  |
//! | size        | 2     | [`SIZES`]               |
//! | pair count  | 2     | [`PAIR_COUNTS`], padded |
//! | model code  | 2     | model registry          |
//! | color code  | 3     | color registry          |

use std::{fmt, ops::RangeInclusive, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{Field, ValidationError};

pub const SCHEME_YEAR: &str = "25";
pub const IDENTIFIER_LEN: usize = 11;
pub const SIZES: RangeInclusive<u8> = 28..=45;
pub const PAIR_COUNTS: RangeInclusive<u8> = 1..=99;

// ─── Identifier ──────────────────────────────────────────────────────────────

/// A syntactically valid identifier: exactly [`IDENTIFIER_LEN`] ASCII
/// digits. Whether its fields resolve against a registry is the codec's
/// concern, see [`crate::codec::decode`].
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
  pub fn as_str(&self) -> &str { &self.0 }

  /// Check length then digits, reporting whichever fails first.
  pub(crate) fn check_shape(raw: &str) -> Result<(), ValidationError> {
    let len = raw.chars().count();
    if len != IDENTIFIER_LEN {
      return Err(ValidationError::new(
        Field::Length,
        format!("expected {IDENTIFIER_LEN} characters, got {len}"),
      ));
    }
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
      return Err(ValidationError::new(
        Field::Digits,
        "every character must be a digit",
      ));
    }
    Ok(())
  }

  pub(crate) fn from_checked(raw: String) -> Self { Self(raw) }

  pub(crate) fn year(&self) -> &str { &self.0[0..2] }
  pub(crate) fn size(&self) -> &str { &self.0[2..4] }
  pub(crate) fn pair_count(&self) -> &str { &self.0[4..6] }
  pub(crate) fn model_code(&self) -> &str { &self.0[6..8] }
  pub(crate) fn color_code(&self) -> &str { &self.0[8..11] }
}

impl fmt::Display for Identifier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl AsRef<str> for Identifier {
  fn as_ref(&self) -> &str { &self.0 }
}

impl FromStr for Identifier {
  type Err = ValidationError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::check_shape(s)?;
    Ok(Self(s.to_owned()))
  }
}

impl TryFrom<String> for Identifier {
  type Error = ValidationError;

  fn try_from(s: String) -> Result<Self, Self::Error> {
    Self::check_shape(&s)?;
    Ok(Self(s))
  }
}

impl From<Identifier> for String {
  fn from(id: Identifier) -> Self { id.0 }
}

// ─── Attributes ──────────────────────────────────────────────────────────────

/// The structured content of an identifier, with model and color given by
/// their registry names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attributes {
  pub model:      String,
  pub size:       u8,
  pub pair_count: u8,
  pub color:      String,
}

/// Raw operator input for [`crate::codec::encode`], as typed on a form.
#[derive(Debug, Clone, Copy)]
pub struct AttributeInput<'a> {
  pub model:      &'a str,
  pub size:       &'a str,
  pub pair_count: &'a str,
  pub color:      &'a str,
}
