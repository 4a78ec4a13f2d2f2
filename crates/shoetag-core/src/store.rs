//! The `LedgerStore` trait: the persistence substrate under the ledger.
//!
//! Implemented by storage backends (e.g. `shoetag-store-sqlite`). The store
//! enforces key uniqueness and the atomicity of a departure; all input
//! validation happens in [`crate::ledger::Ledger`] before a store is called.

use std::future::Future;

use crate::{
  identifier::Identifier,
  record::{DepartureRecord, LabelRecord, Location, Recorded, StockRecord},
};

/// Result of an atomic stock debit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Debit {
  /// Stock was debited and the departure logged in the same transaction.
  Departed {
    departure: DepartureRecord,
    /// Pairs left on hand; `0` means the stock row was deleted.
    remaining: u32,
  },
  /// No stock row exists for the key. Nothing was written.
  NoStock,
  /// Fewer pairs are on hand than requested. Nothing was written.
  Insufficient { available: u32 },
}

/// Abstraction over a ledger storage backend.
///
/// All methods return `Send` futures so a ledger can be shared across tasks
/// of a multi-threaded runtime.
pub trait LedgerStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Insert a label unless one with the same identifier exists, in which
  /// case the stored label is returned unchanged.
  fn insert_label(
    &self,
    label: LabelRecord,
  ) -> impl Future<Output = Result<Recorded<LabelRecord>, Self::Error>> + Send + '_;

  /// Insert a stock row unless one exists for `(identifier, location)`, in
  /// which case the stored row is returned unchanged.
  fn insert_stock(
    &self,
    stock: StockRecord,
  ) -> impl Future<Output = Result<Recorded<StockRecord>, Self::Error>> + Send + '_;

  /// Debit `departure.pair_count` from the stock row at `location` and log
  /// `departure`, as one transaction.
  ///
  /// The row is deleted when nothing remains. When the row is missing or
  /// holds too few pairs, nothing is written.
  fn debit_stock(
    &self,
    departure: DepartureRecord,
    location: Location,
  ) -> impl Future<Output = Result<Debit, Self::Error>> + Send + '_;

  /// Delete every record and reset row sequences.
  fn reset(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  fn get_stock<'a>(
    &'a self,
    identifier: &'a Identifier,
    location: Location,
  ) -> impl Future<Output = Result<Option<StockRecord>, Self::Error>> + Send + 'a;

  /// All labels in insertion order.
  fn list_labels(
    &self,
  ) -> impl Future<Output = Result<Vec<LabelRecord>, Self::Error>> + Send + '_;

  /// All stock rows in insertion order.
  fn list_stock(
    &self,
  ) -> impl Future<Output = Result<Vec<StockRecord>, Self::Error>> + Send + '_;

  /// All departures in insertion order.
  fn list_departures(
    &self,
  ) -> impl Future<Output = Result<Vec<DepartureRecord>, Self::Error>> + Send + '_;
}
