//! The three record sets owned by the ledger, plus the closed set of storage
//! locations and the calendar-date format shared by every date field.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::{
  error::{Field, ValidationError},
  identifier::Identifier,
};

/// The only accepted date layout.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date. Anything else is refused outright; there is no
/// fallback to other layouts.
pub fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
  let bytes = raw.as_bytes();
  let shaped = bytes.len() == 10
    && bytes[4] == b'-'
    && bytes[7] == b'-'
    && bytes
      .iter()
      .enumerate()
      .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());

  if !shaped {
    return Err(ValidationError::new(
      Field::Date,
      format!("{raw:?} is not in YYYY-MM-DD format"),
    ));
  }

  NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| {
    ValidationError::new(Field::Date, format!("{raw:?} is not a calendar date: {e}"))
  })
}

pub fn format_date(date: NaiveDate) -> String { date.format(DATE_FORMAT).to_string() }

// ─── Locations ───────────────────────────────────────────────────────────────

/// Where stock can be held. Extending the set means adding a variant.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Display,
  EnumString,
  EnumIter,
  Serialize,
  Deserialize,
)]
pub enum Location {
  /// The workshop warehouse.
  #[strum(serialize = "Imbert-Mnif")]
  #[serde(rename = "Imbert-Mnif")]
  ImbertMnif,
  /// The distribution point; departures always debit from here.
  #[strum(serialize = "Decathlon")]
  #[serde(rename = "Decathlon")]
  Decathlon,
}

impl Location {
  pub const DISTRIBUTION: Self = Self::Decathlon;
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A printed label. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRecord {
  pub identifier:          Identifier,
  pub model:               String,
  pub size:                u8,
  pub pair_count:          u8,
  pub reception_date:      NaiveDate,
  pub color:               String,
  /// The manufacturing order ("OF") the batch was produced under.
  pub manufacturing_order: String,
}

/// Pairs of one identifier held at one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
  pub identifier:     Identifier,
  /// Model name.
  pub designation:    String,
  pub color:          String,
  pub size:           u8,
  pub pair_count:     u32,
  pub reception_date: NaiveDate,
  pub location:       Location,
}

/// An append-only log entry for pairs that left the distribution location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartureRecord {
  pub identifier:     Identifier,
  pub designation:    String,
  pub color:          String,
  pub size:           u8,
  /// The quantity requested, not what remained on hand.
  pub pair_count:     u32,
  pub departure_date: NaiveDate,
}

// ─── Write outcomes ──────────────────────────────────────────────────────────

/// Whether an insert-if-absent actually wrote a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
  Inserted,
  /// A row already existed under the same key; the first writer wins and the
  /// existing row is returned.
  DuplicateIgnored,
}

/// A record returned from an insert-if-absent write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recorded<T> {
  pub record:  T,
  pub outcome: Outcome,
}

impl<T> Recorded<T> {
  pub fn inserted(record: T) -> Self { Self { record, outcome: Outcome::Inserted } }

  pub fn ignored(record: T) -> Self {
    Self { record, outcome: Outcome::DuplicateIgnored }
  }

  pub fn is_inserted(&self) -> bool { self.outcome == Outcome::Inserted }
}
