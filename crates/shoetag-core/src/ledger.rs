//! [`Ledger`] — the command and query surface over a [`LedgerStore`].
//!
//! Every identifier moves through `Unregistered -> Labeled ->
//! InStock(location) -> Departed`. The ledger validates operator input,
//! serialises work on each `(identifier, location)` key and leaves the
//! transactional bookkeeping to the store.

use std::{fmt, ops::RangeInclusive, str::FromStr, sync::Arc};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  codec,
  error::{Field, Shortage, ValidationError},
  identifier::{AttributeInput, Attributes, Identifier, SIZES},
  locks::KeyLocks,
  record::{
    DepartureRecord, LabelRecord, Location, Recorded, StockRecord, parse_date,
  },
  registry::{Category, Registry},
  store::{Debit, LedgerStore},
};

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Everything needed to issue one label, as collected from the operator.
#[derive(Debug, Clone, Copy)]
pub struct LabelInput<'a> {
  pub attributes:          AttributeInput<'a>,
  pub reception_date:      &'a str,
  pub manufacturing_order: &'a str,
}

/// An inclusive run of sizes written `"36-42"`, or `"36"` for a single size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeRange {
  pub start: u8,
  pub end:   u8,
}

impl SizeRange {
  pub fn sizes(self) -> RangeInclusive<u8> { self.start..=self.end }
}

impl FromStr for SizeRange {
  type Err = Error;

  fn from_str(raw: &str) -> Result<Self> {
    let bound = |s: &str| {
      s.trim().parse::<u8>().map_err(|_| {
        Error::InvalidBatch(format!("size range {raw:?} must look like 36-42"))
      })
    };

    let (start, end) = match raw.split_once('-') {
      Some((start, end)) => (bound(start)?, bound(end)?),
      None => {
        let size = bound(raw)?;
        (size, size)
      }
    };

    if start > end {
      return Err(Error::InvalidBatch(format!(
        "size range {raw:?} runs backwards"
      )));
    }
    Ok(Self { start, end })
  }
}

impl fmt::Display for SizeRange {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-{}", self.start, self.end)
  }
}

/// Input to [`Ledger::bulk_register`]: one label per `(model, size)` pair.
#[derive(Debug, Clone)]
pub struct BulkRequest<'a> {
  pub models:              Vec<&'a str>,
  pub color:               &'a str,
  pub sizes:               SizeRange,
  pub pair_count:          &'a str,
  pub manufacturing_order: &'a str,
  pub reception_date:      &'a str,
}

// ─── Reports ─────────────────────────────────────────────────────────────────

/// One item of a batch that was refused.
#[derive(Debug, Clone, Serialize)]
pub struct BulkFailure {
  pub model:  String,
  pub size:   u8,
  pub color:  String,
  pub reason: String,
}

/// The aggregate result of a batch. Partial completion is normal.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkReport {
  /// Labels produced, including ones that already existed.
  pub labels:   Vec<LabelRecord>,
  pub failures: Vec<BulkFailure>,
}

impl BulkReport {
  pub fn failure_count(&self) -> usize { self.failures.len() }
}

// ─── Ledger ──────────────────────────────────────────────────────────────────

/// The inventory ledger: owns the store handle, the registry and the
/// per-key locks. Share it by reference (or `Arc`) across tasks.
pub struct Ledger<S> {
  store:    S,
  registry: Arc<Registry>,
  locks:    KeyLocks<(Identifier, Location)>,
}

impl<S: LedgerStore> Ledger<S> {
  pub fn new(store: S, registry: Arc<Registry>) -> Self {
    Self { store, registry, locks: KeyLocks::new() }
  }

  // ── Labels ────────────────────────────────────────────────────────────

  /// Encode a label and record it. Registering the same attributes twice
  /// returns the first record with [`crate::record::Outcome::DuplicateIgnored`].
  pub async fn register_label(
    &self,
    input: &LabelInput<'_>,
  ) -> Result<Recorded<LabelRecord>> {
    let attrs =
      codec::validate(&self.registry, &input.attributes).map_err(Error::InvalidLabel)?;
    let identifier =
      codec::identify(&self.registry, &attrs).map_err(Error::InvalidLabel)?;
    let (order, reception_date) =
      label_provenance(input.manufacturing_order, input.reception_date)?;

    self.insert_label(identifier, attrs, reception_date, order).await
  }

  /// Record a label from a scanned identifier rather than typed attributes.
  pub async fn scan_label(
    &self,
    identifier: &str,
    reception_date: &str,
    manufacturing_order: &str,
  ) -> Result<Recorded<LabelRecord>> {
    let (identifier, attrs) = self.decode(identifier)?;
    let (order, reception_date) =
      label_provenance(manufacturing_order, reception_date)?;

    self.insert_label(identifier, attrs, reception_date, order).await
  }

  async fn insert_label(
    &self,
    identifier: Identifier,
    attrs: Attributes,
    reception_date: NaiveDate,
    manufacturing_order: &str,
  ) -> Result<Recorded<LabelRecord>> {
    let label = LabelRecord {
      identifier,
      model: attrs.model,
      size: attrs.size,
      pair_count: attrs.pair_count,
      reception_date,
      color: attrs.color,
      manufacturing_order: manufacturing_order.to_owned(),
    };

    let recorded = self.store.insert_label(label).await.map_err(Error::store)?;
    if recorded.is_inserted() {
      info!(identifier = %recorded.record.identifier, "label registered");
    } else {
      debug!(identifier = %recorded.record.identifier, "label already registered");
    }
    Ok(recorded)
  }

  /// Register one label per `(model, size)` pair. Individual failures are
  /// collected and the batch carries on; only a malformed request as a whole
  /// is refused.
  pub async fn bulk_register(&self, request: &BulkRequest<'_>) -> Result<BulkReport> {
    if request.models.is_empty() {
      return Err(Error::InvalidBatch("select at least one model".into()));
    }

    let mut report = BulkReport::default();
    for model in &request.models {
      for size in request.sizes.sizes() {
        self
          .register_into(
            &mut report,
            model,
            size,
            request.color,
            request.pair_count,
            request.reception_date,
            request.manufacturing_order,
          )
          .await;
      }
    }

    info!(
      produced = report.labels.len(),
      failed = report.failure_count(),
      "bulk registration finished"
    );
    Ok(report)
  }

  /// Register one label for every model, size and color the registry knows.
  pub async fn seed_catalog(
    &self,
    pair_count: &str,
    reception_date: &str,
    manufacturing_order: &str,
  ) -> Result<BulkReport> {
    let mut report = BulkReport::default();

    for model in self.registry.entries(Category::Model) {
      for size in SIZES {
        for color in self.registry.entries(Category::Color) {
          self
            .register_into(
              &mut report,
              &model.name,
              size,
              &color.name,
              pair_count,
              reception_date,
              manufacturing_order,
            )
            .await;
        }
      }
    }

    info!(
      produced = report.labels.len(),
      failed = report.failure_count(),
      "catalog seeded"
    );
    Ok(report)
  }

  #[allow(clippy::too_many_arguments)]
  async fn register_into(
    &self,
    report: &mut BulkReport,
    model: &str,
    size: u8,
    color: &str,
    pair_count: &str,
    reception_date: &str,
    manufacturing_order: &str,
  ) {
    let size_text = size.to_string();
    let input = LabelInput {
      attributes: AttributeInput {
        model,
        size: &size_text,
        pair_count,
        color,
      },
      reception_date,
      manufacturing_order,
    };

    match self.register_label(&input).await {
      Ok(recorded) => report.labels.push(recorded.record),
      Err(e) => {
        warn!(model, size, color, error = %e, "skipping label");
        report.failures.push(BulkFailure {
          model:  model.to_owned(),
          size,
          color:  color.to_owned(),
          reason: e.to_string(),
        });
      }
    }
  }

  // ── Stock ─────────────────────────────────────────────────────────────

  /// Record a scanned identifier as stock at `location`.
  ///
  /// A second scan of the same identifier at the same location is ignored
  /// rather than added to the quantity on hand.
  pub async fn receive_stock(
    &self,
    identifier: &str,
    location: &str,
    reception_date: &str,
  ) -> Result<Recorded<StockRecord>> {
    let (identifier, attrs) = self.decode(identifier)?;
    let location = parse_location(location)?;
    let reception_date = parse_date(reception_date).map_err(Error::InvalidDate)?;

    let stock = StockRecord {
      identifier: identifier.clone(),
      designation: attrs.model,
      color: attrs.color,
      size: attrs.size,
      pair_count: u32::from(attrs.pair_count),
      reception_date,
      location,
    };

    let _guard = self.locks.lock((identifier, location)).await;
    let recorded = self.store.insert_stock(stock).await.map_err(Error::store)?;

    if recorded.is_inserted() {
      info!(
        identifier = %recorded.record.identifier,
        %location,
        pairs = recorded.record.pair_count,
        "stock received"
      );
    } else {
      debug!(identifier = %recorded.record.identifier, %location, "stock already recorded");
    }
    Ok(recorded)
  }

  /// Debit `pair_count` pairs from the distribution location and log the
  /// departure. Either both happen or neither does.
  pub async fn issue_departure(
    &self,
    identifier: &str,
    pair_count: i64,
    departure_date: &str,
  ) -> Result<DepartureRecord> {
    let (identifier, attrs) = self.decode(identifier)?;
    let requested = u32::try_from(pair_count)
      .ok()
      .filter(|&n| n > 0)
      .ok_or_else(|| {
        Error::InvalidQuantity(ValidationError::new(
          Field::Quantity,
          format!("must be a positive whole number, got {pair_count}"),
        ))
      })?;
    let departure_date = parse_date(departure_date).map_err(Error::InvalidDate)?;

    let departure = DepartureRecord {
      identifier: identifier.clone(),
      designation: attrs.model,
      color: attrs.color,
      size: attrs.size,
      pair_count: requested,
      departure_date,
    };

    let location = Location::DISTRIBUTION;
    let _guard = self.locks.lock((identifier.clone(), location)).await;

    match self
      .store
      .debit_stock(departure, location)
      .await
      .map_err(Error::store)?
    {
      Debit::Departed { departure, remaining } => {
        info!(%identifier, pairs = requested, remaining, "departure issued");
        Ok(departure)
      }
      Debit::NoStock => {
        warn!(%identifier, %location, "departure refused: no stock record");
        Err(Error::InsufficientStock {
          identifier,
          location,
          shortage: Shortage::NoRecord,
          requested,
        })
      }
      Debit::Insufficient { available } => {
        warn!(%identifier, available, requested, "departure refused: insufficient stock");
        Err(Error::InsufficientStock {
          identifier,
          location,
          shortage: Shortage::Short { available },
          requested,
        })
      }
    }
  }

  /// The stock row for one identifier at one location, if any.
  pub async fn stock_at(
    &self,
    identifier: &str,
    location: &str,
  ) -> Result<Option<StockRecord>> {
    let (identifier, _) = self.decode(identifier)?;
    let location = parse_location(location)?;
    self
      .store
      .get_stock(&identifier, location)
      .await
      .map_err(Error::store)
  }

  // ── Queries ───────────────────────────────────────────────────────────

  pub async fn list_labels(&self) -> Result<Vec<LabelRecord>> {
    self.store.list_labels().await.map_err(Error::store)
  }

  pub async fn list_stock(&self) -> Result<Vec<StockRecord>> {
    self.store.list_stock().await.map_err(Error::store)
  }

  pub async fn list_departures(&self) -> Result<Vec<DepartureRecord>> {
    self.store.list_departures().await.map_err(Error::store)
  }

  /// Clear all three record sets. Irreversible; confirming with the operator
  /// is the caller's job.
  pub async fn reset_all(&self) -> Result<()> {
    self.store.reset().await.map_err(Error::store)?;
    warn!("ledger reset");
    Ok(())
  }

  // ── Helpers ───────────────────────────────────────────────────────────

  fn decode(&self, raw: &str) -> Result<(Identifier, Attributes)> {
    let identifier: Identifier = raw.parse().map_err(Error::InvalidIdentifier)?;
    let attrs = codec::decode_identifier(&self.registry, &identifier)
      .map_err(Error::InvalidIdentifier)?;
    Ok((identifier, attrs))
  }
}

fn parse_location(raw: &str) -> Result<Location> {
  raw
    .parse()
    .map_err(|_| {
      Error::InvalidLocation(ValidationError::new(
        Field::Location,
        format!("{raw:?} is not a known location"),
      ))
    })
}

fn label_provenance<'a>(
  manufacturing_order: &'a str,
  reception_date: &str,
) -> Result<(&'a str, NaiveDate)> {
  if manufacturing_order.is_empty() {
    return Err(Error::InvalidLabel(ValidationError::new(
      Field::ManufacturingOrder,
      "is required",
    )));
  }
  let date = parse_date(reception_date).map_err(Error::InvalidDate)?;
  Ok((manufacturing_order, date))
}
