//! [`SqliteStore`] — the SQLite implementation of [`LedgerStore`].

use std::path::Path;

use rusqlite::{OptionalExtension as _, TransactionBehavior};

use shoetag_core::{
  Identifier,
  record::{DepartureRecord, LabelRecord, Location, Recorded, StockRecord},
  store::{Debit, LedgerStore},
};

use crate::{
  encode::{
    RawDeparture, RawLabel, RawStock, encode_date, encode_location,
  },
  schema::{RESET, SCHEMA},
  Error, Result,
};

/// What happened inside a debit transaction, before decoding.
enum RawDebit {
  Departed { remaining: i64 },
  NoStock,
  Insufficient { available: i64 },
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A ledger store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted, and every
/// clone feeds the same background thread, which serialises writers.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── LedgerStore impl ────────────────────────────────────────────────────────

impl LedgerStore for SqliteStore {
  type Error = Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn insert_label(&self, label: LabelRecord) -> Result<Recorded<LabelRecord>> {
    let identifier = label.identifier.to_string();
    let model      = label.model.clone();
    let size       = i64::from(label.size);
    let pair_count = i64::from(label.pair_count);
    let date       = encode_date(label.reception_date);
    let color      = label.color.clone();
    let order      = label.manufacturing_order.clone();

    let (inserted, raw) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let inserted = tx.execute(
          "INSERT OR IGNORE INTO labels (
             identifier, model, size, pair_count,
             reception_date, color, manufacturing_order
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![identifier, model, size, pair_count, date, color, order],
        )? == 1;
        let raw = tx.query_row(
          &format!("SELECT {} FROM labels WHERE identifier = ?1", RawLabel::COLUMNS),
          rusqlite::params![identifier],
          RawLabel::from_row,
        )?;
        tx.commit()?;
        Ok((inserted, raw))
      })
      .await?;

    if inserted {
      Ok(Recorded::inserted(label))
    } else {
      Ok(Recorded::ignored(raw.into_label()?))
    }
  }

  async fn insert_stock(&self, stock: StockRecord) -> Result<Recorded<StockRecord>> {
    let identifier  = stock.identifier.to_string();
    let designation = stock.designation.clone();
    let color       = stock.color.clone();
    let size        = i64::from(stock.size);
    let pair_count  = i64::from(stock.pair_count);
    let date        = encode_date(stock.reception_date);
    let location    = encode_location(stock.location);

    let (inserted, raw) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let inserted = tx.execute(
          "INSERT OR IGNORE INTO stock (
             identifier, designation, color, size,
             pair_count, reception_date, location
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            identifier,
            designation,
            color,
            size,
            pair_count,
            date,
            location,
          ],
        )? == 1;
        let raw = tx.query_row(
          &format!(
            "SELECT {} FROM stock WHERE identifier = ?1 AND location = ?2",
            RawStock::COLUMNS
          ),
          rusqlite::params![identifier, location],
          RawStock::from_row,
        )?;
        tx.commit()?;
        Ok((inserted, raw))
      })
      .await?;

    if inserted {
      Ok(Recorded::inserted(stock))
    } else {
      Ok(Recorded::ignored(raw.into_stock()?))
    }
  }

  async fn debit_stock(
    &self,
    departure: DepartureRecord,
    location:  Location,
  ) -> Result<Debit> {
    let identifier  = departure.identifier.to_string();
    let designation = departure.designation.clone();
    let color       = departure.color.clone();
    let size        = i64::from(departure.size);
    let requested   = i64::from(departure.pair_count);
    let date        = encode_date(departure.departure_date);
    let location    = encode_location(location);

    let raw = self
      .conn
      .call(move |conn| {
        // Take the write lock up front so the read below cannot go stale.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let available: Option<i64> = tx
          .query_row(
            "SELECT pair_count FROM stock WHERE identifier = ?1 AND location = ?2",
            rusqlite::params![identifier, location],
            |row| row.get(0),
          )
          .optional()?;

        // Returning early drops `tx`, which rolls back.
        let Some(available) = available else {
          return Ok(RawDebit::NoStock);
        };
        if available < requested {
          return Ok(RawDebit::Insufficient { available });
        }

        let remaining = available - requested;
        if remaining == 0 {
          tx.execute(
            "DELETE FROM stock WHERE identifier = ?1 AND location = ?2",
            rusqlite::params![identifier, location],
          )?;
        } else {
          tx.execute(
            "UPDATE stock SET pair_count = ?3 WHERE identifier = ?1 AND location = ?2",
            rusqlite::params![identifier, location, remaining],
          )?;
        }

        tx.execute(
          "INSERT INTO departures (
             identifier, designation, color, size, pair_count, departure_date
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![identifier, designation, color, size, requested, date],
        )?;

        tx.commit()?;
        Ok(RawDebit::Departed { remaining })
      })
      .await?;

    let count = |column: &'static str, n: i64| {
      u32::try_from(n).map_err(|e| Error::Decode { column, reason: e.to_string() })
    };

    match raw {
      RawDebit::Departed { remaining } => Ok(Debit::Departed {
        departure,
        remaining: count("pair_count", remaining)?,
      }),
      RawDebit::NoStock => Ok(Debit::NoStock),
      RawDebit::Insufficient { available } => Ok(Debit::Insufficient {
        available: count("pair_count", available)?,
      }),
    }
  }

  async fn reset(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        let tx = conn.transaction()?;
        tx.execute_batch(RESET)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_stock(
    &self,
    identifier: &Identifier,
    location:   Location,
  ) -> Result<Option<StockRecord>> {
    let identifier = identifier.to_string();
    let location   = encode_location(location);

    let raw: Option<RawStock> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {} FROM stock WHERE identifier = ?1 AND location = ?2",
              RawStock::COLUMNS
            ),
            rusqlite::params![identifier, location],
            RawStock::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawStock::into_stock).transpose()
  }

  async fn list_labels(&self) -> Result<Vec<LabelRecord>> {
    let raws: Vec<RawLabel> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare(&format!("SELECT {} FROM labels ORDER BY id", RawLabel::COLUMNS))?;
        let rows = stmt
          .query_map([], RawLabel::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLabel::into_label).collect()
  }

  async fn list_stock(&self) -> Result<Vec<StockRecord>> {
    let raws: Vec<RawStock> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare(&format!("SELECT {} FROM stock ORDER BY id", RawStock::COLUMNS))?;
        let rows = stmt
          .query_map([], RawStock::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawStock::into_stock).collect()
  }

  async fn list_departures(&self) -> Result<Vec<DepartureRecord>> {
    let raws: Vec<RawDeparture> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM departures ORDER BY id",
          RawDeparture::COLUMNS
        ))?;
        let rows = stmt
          .query_map([], RawDeparture::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDeparture::into_departure).collect()
  }
}
