//! Encoding and decoding helpers between domain types and the plain values
//! stored in SQLite columns.
//!
//! Dates are stored as `YYYY-MM-DD` text, locations by their display name,
//! quantities as integers.

use chrono::NaiveDate;
use shoetag_core::{
  Identifier,
  record::{DATE_FORMAT, DepartureRecord, LabelRecord, Location, StockRecord, format_date},
};

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_date(date: NaiveDate) -> String { format_date(date) }

pub fn decode_date(column: &'static str, s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::Decode { column, reason: e.to_string() })
}

pub fn encode_location(location: Location) -> String { location.to_string() }

pub fn decode_location(s: &str) -> Result<Location> {
  s.parse().map_err(|_| Error::Decode {
    column: "location",
    reason: format!("unknown location {s:?}"),
  })
}

pub fn decode_identifier(s: String) -> Result<Identifier> {
  Identifier::try_from(s)
    .map_err(|e| Error::Decode { column: "identifier", reason: e.to_string() })
}

fn decode_small(column: &'static str, n: i64) -> Result<u8> {
  u8::try_from(n).map_err(|e| Error::Decode { column, reason: e.to_string() })
}

fn decode_count(column: &'static str, n: i64) -> Result<u32> {
  u32::try_from(n).map_err(|e| Error::Decode { column, reason: e.to_string() })
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `labels` row.
pub struct RawLabel {
  pub identifier:          String,
  pub model:               String,
  pub size:                i64,
  pub pair_count:          i64,
  pub reception_date:      String,
  pub color:               String,
  pub manufacturing_order: String,
}

impl RawLabel {
  pub const COLUMNS: &'static str = "identifier, model, size, pair_count, \
                                     reception_date, color, manufacturing_order";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      identifier:          row.get(0)?,
      model:               row.get(1)?,
      size:                row.get(2)?,
      pair_count:          row.get(3)?,
      reception_date:      row.get(4)?,
      color:               row.get(5)?,
      manufacturing_order: row.get(6)?,
    })
  }

  pub fn into_label(self) -> Result<LabelRecord> {
    Ok(LabelRecord {
      identifier:          decode_identifier(self.identifier)?,
      model:               self.model,
      size:                decode_small("size", self.size)?,
      pair_count:          decode_small("pair_count", self.pair_count)?,
      reception_date:      decode_date("reception_date", &self.reception_date)?,
      color:               self.color,
      manufacturing_order: self.manufacturing_order,
    })
  }
}

/// Raw values read directly from a `stock` row.
pub struct RawStock {
  pub identifier:     String,
  pub designation:    String,
  pub color:          String,
  pub size:           i64,
  pub pair_count:     i64,
  pub reception_date: String,
  pub location:       String,
}

impl RawStock {
  pub const COLUMNS: &'static str = "identifier, designation, color, size, \
                                     pair_count, reception_date, location";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      identifier:     row.get(0)?,
      designation:    row.get(1)?,
      color:          row.get(2)?,
      size:           row.get(3)?,
      pair_count:     row.get(4)?,
      reception_date: row.get(5)?,
      location:       row.get(6)?,
    })
  }

  pub fn into_stock(self) -> Result<StockRecord> {
    Ok(StockRecord {
      identifier:     decode_identifier(self.identifier)?,
      designation:    self.designation,
      color:          self.color,
      size:           decode_small("size", self.size)?,
      pair_count:     decode_count("pair_count", self.pair_count)?,
      reception_date: decode_date("reception_date", &self.reception_date)?,
      location:       decode_location(&self.location)?,
    })
  }
}

/// Raw values read directly from a `departures` row.
pub struct RawDeparture {
  pub identifier:     String,
  pub designation:    String,
  pub color:          String,
  pub size:           i64,
  pub pair_count:     i64,
  pub departure_date: String,
}

impl RawDeparture {
  pub const COLUMNS: &'static str =
    "identifier, designation, color, size, pair_count, departure_date";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      identifier:     row.get(0)?,
      designation:    row.get(1)?,
      color:          row.get(2)?,
      size:           row.get(3)?,
      pair_count:     row.get(4)?,
      departure_date: row.get(5)?,
    })
  }

  pub fn into_departure(self) -> Result<DepartureRecord> {
    Ok(DepartureRecord {
      identifier:     decode_identifier(self.identifier)?,
      designation:    self.designation,
      color:          self.color,
      size:           decode_small("size", self.size)?,
      pair_count:     decode_count("pair_count", self.pair_count)?,
      departure_date: decode_date("departure_date", &self.departure_date)?,
    })
  }
}
