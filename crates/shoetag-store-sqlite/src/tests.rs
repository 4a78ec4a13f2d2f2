//! Integration tests for the ledger over `SqliteStore` against an in-memory
//! database.

use std::sync::Arc;

use chrono::NaiveDate;
use shoetag_core::{
  AttributeInput, Error, Ledger, Registry,
  error::{Field, Shortage},
  ledger::{BulkRequest, LabelInput},
  record::{Location, Outcome},
};

use crate::SqliteStore;

/// DCDP500, size 36, 5 pairs, BLEU.
const FIVE_PAIRS: &str = "25360501189";
/// DCDP500, size 36, 10 pairs, BLEU.
const TEN_PAIRS: &str = "25361001189";

async fn ledger() -> Ledger<SqliteStore> {
  let store = SqliteStore::open_in_memory()
    .await
    .expect("in-memory store");
  Ledger::new(store, Arc::new(Registry::default()))
}

fn label<'a>(
  model: &'a str,
  size: &'a str,
  pair_count: &'a str,
  color: &'a str,
) -> LabelInput<'a> {
  LabelInput {
    attributes:          AttributeInput { model, size, pair_count, color },
    reception_date:      "2025-05-23",
    manufacturing_order: "OF0001",
  }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

// ─── Labels ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_label_records_encoded_identifier() {
  let l = ledger().await;

  let recorded = l
    .register_label(&label("DCDP500", "36", "5", "BLEU"))
    .await
    .unwrap();
  assert_eq!(recorded.outcome, Outcome::Inserted);

  let rec = &recorded.record;
  assert_eq!(rec.identifier.as_str(), FIVE_PAIRS);
  assert_eq!(rec.model, "DCDP500");
  assert_eq!(rec.size, 36);
  assert_eq!(rec.pair_count, 5);
  assert_eq!(rec.color, "BLEU");
  assert_eq!(rec.reception_date, date(2025, 5, 23));
  assert_eq!(rec.manufacturing_order, "OF0001");

  let all = l.list_labels().await.unwrap();
  assert_eq!(all, vec![recorded.record]);
}

#[tokio::test]
async fn register_label_twice_keeps_first_record() {
  let l = ledger().await;

  l.register_label(&label("MW", "40", "2", "Nougat")).await.unwrap();

  let mut again = label("MW", "40", "2", "Nougat");
  again.manufacturing_order = "OF0002";
  let second = l.register_label(&again).await.unwrap();

  assert_eq!(second.outcome, Outcome::DuplicateIgnored);
  assert_eq!(second.record.manufacturing_order, "OF0001");
  assert_eq!(l.list_labels().await.unwrap().len(), 1);
}

#[tokio::test]
async fn register_label_rejects_out_of_range_size() {
  let l = ledger().await;

  let err = l
    .register_label(&label("MW", "46", "2", "BLEU"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvalidLabel(ref v) if v.field == Field::Size));
  assert!(l.list_labels().await.unwrap().is_empty());
}

#[tokio::test]
async fn register_label_requires_order_and_valid_date() {
  let l = ledger().await;

  let mut no_order = label("MW", "40", "2", "BLEU");
  no_order.manufacturing_order = "";
  let err = l.register_label(&no_order).await.unwrap_err();
  assert!(matches!(err, Error::InvalidLabel(ref v) if v.field == Field::ManufacturingOrder));

  let mut bad_date = label("MW", "40", "2", "BLEU");
  bad_date.reception_date = "23/05/2025";
  let err = l.register_label(&bad_date).await.unwrap_err();
  assert!(matches!(err, Error::InvalidDate(_)));

  assert!(l.list_labels().await.unwrap().is_empty());
}

#[tokio::test]
async fn scan_label_records_decoded_attributes() {
  let l = ledger().await;

  let recorded = l.scan_label("25420303146", "2025-06-01", "OF0042").await.unwrap();
  assert!(recorded.is_inserted());
  assert_eq!(recorded.record.model, "MW");
  assert_eq!(recorded.record.size, 42);
  assert_eq!(recorded.record.pair_count, 3);
  assert_eq!(recorded.record.color, "N07a black");

  // The same label typed in by hand is the same record.
  let typed = l
    .register_label(&label("MW", "42", "3", "N07a black"))
    .await
    .unwrap();
  assert_eq!(typed.outcome, Outcome::DuplicateIgnored);
  assert_eq!(typed.record.manufacturing_order, "OF0042");
}

#[tokio::test]
async fn labels_list_in_insertion_order() {
  let l = ledger().await;
  for size in ["40", "30", "35"] {
    l.register_label(&label("GAS", size, "1", "410NOIR")).await.unwrap();
  }

  let sizes: Vec<u8> = l
    .list_labels()
    .await
    .unwrap()
    .iter()
    .map(|rec| rec.size)
    .collect();
  assert_eq!(sizes, [40, 30, 35]);
}

// ─── Bulk ────────────────────────────────────────────────────────────────────

fn bulk<'a>(models: Vec<&'a str>, sizes: &str) -> BulkRequest<'a> {
  BulkRequest {
    models,
    color: "BLEU",
    sizes: sizes.parse().unwrap(),
    pair_count: "1",
    manufacturing_order: "OF0100",
    reception_date: "2025-05-23",
  }
}

#[tokio::test]
async fn bulk_register_continues_past_failures() {
  let l = ledger().await;

  let report = l
    .bulk_register(&bulk(vec!["DCDP500", "MW"], "44-46"))
    .await
    .unwrap();

  assert_eq!(report.labels.len(), 4);
  assert_eq!(report.failure_count(), 2);
  assert!(report.failures.iter().all(|f| f.size == 46));
  assert_eq!(l.list_labels().await.unwrap().len(), 4);
}

#[tokio::test]
async fn bulk_register_repeats_without_duplicating() {
  let l = ledger().await;
  let request = bulk(vec!["GAS"], "36-38");

  let first = l.bulk_register(&request).await.unwrap();
  let second = l.bulk_register(&request).await.unwrap();

  assert_eq!(first.labels, second.labels);
  assert_eq!(second.failure_count(), 0);
  assert_eq!(l.list_labels().await.unwrap().len(), 3);
}

#[tokio::test]
async fn bulk_register_refuses_empty_model_set() {
  let l = ledger().await;
  let err = l.bulk_register(&bulk(vec![], "36-38")).await.unwrap_err();
  assert!(matches!(err, Error::InvalidBatch(_)));
}

#[tokio::test]
async fn bulk_register_reports_unknown_model_per_item() {
  let l = ledger().await;
  let report = l
    .bulk_register(&bulk(vec!["DCDP500", "NOPE"], "40"))
    .await
    .unwrap();
  assert_eq!(report.labels.len(), 1);
  assert_eq!(report.failures[0].model, "NOPE");
}

#[tokio::test]
async fn seed_catalog_covers_every_combination() {
  let l = ledger().await;
  let report = l.seed_catalog("01", "2025-05-23", "OF0001").await.unwrap();

  // 4 models x 18 sizes x 7 colors.
  assert_eq!(report.labels.len(), 504);
  assert_eq!(report.failure_count(), 0);
  assert_eq!(l.list_labels().await.unwrap().len(), 504);
}

// ─── Stock ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn receive_stock_uses_decoded_attributes() {
  let l = ledger().await;

  let recorded = l
    .receive_stock(FIVE_PAIRS, "Decathlon", "2025-05-23")
    .await
    .unwrap();
  assert!(recorded.is_inserted());

  let stock = recorded.record;
  assert_eq!(stock.designation, "DCDP500");
  assert_eq!(stock.color, "BLEU");
  assert_eq!(stock.size, 36);
  assert_eq!(stock.pair_count, 5);
  assert_eq!(stock.location, Location::Decathlon);
  assert_eq!(stock.reception_date, date(2025, 5, 23));
}

#[tokio::test]
async fn second_scan_at_same_location_is_ignored() {
  let l = ledger().await;

  l.receive_stock(FIVE_PAIRS, "Decathlon", "2025-05-23").await.unwrap();
  let again = l
    .receive_stock(FIVE_PAIRS, "Decathlon", "2025-05-30")
    .await
    .unwrap();

  assert_eq!(again.outcome, Outcome::DuplicateIgnored);
  assert_eq!(again.record.pair_count, 5);
  assert_eq!(again.record.reception_date, date(2025, 5, 23));
  assert_eq!(l.list_stock().await.unwrap().len(), 1);
}

#[tokio::test]
async fn same_identifier_can_be_stocked_at_each_location() {
  let l = ledger().await;

  l.receive_stock(FIVE_PAIRS, "Imbert-Mnif", "2025-05-23").await.unwrap();
  l.receive_stock(FIVE_PAIRS, "Decathlon", "2025-05-24").await.unwrap();

  let stock = l.list_stock().await.unwrap();
  let locations: Vec<_> = stock.iter().map(|s| s.location).collect();
  assert_eq!(locations, [Location::ImbertMnif, Location::Decathlon]);

  let held = l.stock_at(FIVE_PAIRS, "Imbert-Mnif").await.unwrap();
  assert_eq!(held.map(|s| s.pair_count), Some(5));
}

#[tokio::test]
async fn receive_stock_rejections_write_nothing() {
  let l = ledger().await;

  let err = l
    .receive_stock("2536050118", "Decathlon", "2025-05-23")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvalidIdentifier(ref v) if v.field == Field::Length));

  let err = l
    .receive_stock(FIVE_PAIRS, "Entrepot", "2025-05-23")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvalidLocation(ref v) if v.field == Field::Location));
  assert!(err.to_string().contains("\"Entrepot\""));

  let err = l
    .receive_stock(FIVE_PAIRS, "Decathlon", "2025-5-23")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvalidDate(_)));

  assert!(l.list_stock().await.unwrap().is_empty());
}

#[tokio::test]
async fn receive_stock_checks_identifier_before_location() {
  let l = ledger().await;
  let err = l
    .receive_stock("25360501999", "Entrepot", "not a date")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvalidIdentifier(ref v) if v.field == Field::Color));
}

// ─── Departures ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn full_departure_removes_stock_row() {
  let l = ledger().await;

  l.receive_stock(FIVE_PAIRS, "Decathlon", "2025-05-23").await.unwrap();
  let departure = l.issue_departure(FIVE_PAIRS, 5, "2025-05-24").await.unwrap();

  assert_eq!(departure.pair_count, 5);
  assert_eq!(departure.departure_date, date(2025, 5, 24));
  assert_eq!(departure.designation, "DCDP500");

  assert!(l.list_stock().await.unwrap().is_empty());
  assert_eq!(l.list_departures().await.unwrap(), vec![departure]);
}

#[tokio::test]
async fn departures_summing_to_stock_conserve_quantity() {
  let l = ledger().await;
  l.receive_stock(TEN_PAIRS, "Decathlon", "2025-05-23").await.unwrap();

  l.issue_departure(TEN_PAIRS, 3, "2025-05-24").await.unwrap();
  let left = l.stock_at(TEN_PAIRS, "Decathlon").await.unwrap().unwrap();
  assert_eq!(left.pair_count, 7);

  // Same identifier and date twice: both are logged.
  l.issue_departure(TEN_PAIRS, 3, "2025-05-24").await.unwrap();
  l.issue_departure(TEN_PAIRS, 4, "2025-05-25").await.unwrap();

  assert!(l.stock_at(TEN_PAIRS, "Decathlon").await.unwrap().is_none());
  let departed: u32 = l
    .list_departures()
    .await
    .unwrap()
    .iter()
    .map(|d| d.pair_count)
    .sum();
  assert_eq!(departed, 10);
}

#[tokio::test]
async fn oversell_is_refused_and_stock_unchanged() {
  let l = ledger().await;
  l.receive_stock(TEN_PAIRS, "Decathlon", "2025-05-23").await.unwrap();

  let err = l.issue_departure(TEN_PAIRS, 11, "2025-05-24").await.unwrap_err();
  assert!(matches!(
    err,
    Error::InsufficientStock {
      shortage: Shortage::Short { available: 10 },
      requested: 11,
      ..
    }
  ));
  assert!(err.to_string().contains("10 pairs available"));

  let stock = l.stock_at(TEN_PAIRS, "Decathlon").await.unwrap().unwrap();
  assert_eq!(stock.pair_count, 10);
  assert!(l.list_departures().await.unwrap().is_empty());
}

#[tokio::test]
async fn departure_only_debits_distribution_location() {
  let l = ledger().await;
  l.receive_stock(FIVE_PAIRS, "Imbert-Mnif", "2025-05-23").await.unwrap();

  let err = l.issue_departure(FIVE_PAIRS, 1, "2025-05-24").await.unwrap_err();
  assert!(matches!(
    err,
    Error::InsufficientStock {
      location: Location::Decathlon,
      shortage: Shortage::NoRecord,
      ..
    }
  ));

  let warehouse = l.stock_at(FIVE_PAIRS, "Imbert-Mnif").await.unwrap().unwrap();
  assert_eq!(warehouse.pair_count, 5);
}

#[tokio::test]
async fn departure_without_stock_is_insufficient_stock() {
  let l = ledger().await;

  let err = l.issue_departure(FIVE_PAIRS, 1, "2025-05-24").await.unwrap_err();
  match &err {
    Error::InsufficientStock { identifier, location, shortage, requested } => {
      assert_eq!(identifier.as_str(), FIVE_PAIRS);
      assert_eq!(*location, Location::Decathlon);
      assert_eq!(*shortage, Shortage::NoRecord);
      assert_eq!(shortage.available(), 0);
      assert_eq!(*requested, 1);
    }
    other => panic!("unexpected error: {other}"),
  }
  assert!(err.to_string().contains("no stock record"));
  assert!(l.list_departures().await.unwrap().is_empty());
}

#[tokio::test]
async fn departure_rejects_bad_input_in_order() {
  let l = ledger().await;
  l.receive_stock(FIVE_PAIRS, "Decathlon", "2025-05-23").await.unwrap();

  let err = l.issue_departure("2536050118A", 0, "bad").await.unwrap_err();
  assert!(matches!(err, Error::InvalidIdentifier(ref v) if v.field == Field::Digits));

  for quantity in [0, -3, i64::from(u32::MAX) + 1] {
    let err = l.issue_departure(FIVE_PAIRS, quantity, "bad").await.unwrap_err();
    assert!(
      matches!(err, Error::InvalidQuantity(ref v) if v.field == Field::Quantity),
      "{quantity}"
    );
  }

  let err = l.issue_departure(FIVE_PAIRS, 1, "2025-02-30").await.unwrap_err();
  assert!(matches!(err, Error::InvalidDate(_)));

  // The ledger is still usable and untouched.
  assert_eq!(l.list_stock().await.unwrap()[0].pair_count, 5);
  l.issue_departure(FIVE_PAIRS, 1, "2025-05-24").await.unwrap();
  assert_eq!(l.list_stock().await.unwrap()[0].pair_count, 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_departures_never_oversell() {
  let l = Arc::new(ledger().await);
  l.receive_stock(TEN_PAIRS, "Decathlon", "2025-05-23").await.unwrap();

  let tasks: Vec<_> = (0..10)
    .map(|_| {
      let l = Arc::clone(&l);
      tokio::spawn(async move { l.issue_departure(TEN_PAIRS, 2, "2025-05-24").await })
    })
    .collect();

  let mut shipped = 0;
  let mut refused = 0;
  for task in tasks {
    match task.await.unwrap() {
      Ok(_) => shipped += 1,
      Err(Error::InsufficientStock { .. }) => refused += 1,
      Err(e) => panic!("unexpected error: {e}"),
    }
  }

  assert_eq!(shipped, 5);
  assert_eq!(refused, 5);
  assert!(l.list_stock().await.unwrap().is_empty());
  let departed: u32 = l
    .list_departures()
    .await
    .unwrap()
    .iter()
    .map(|d| d.pair_count)
    .sum();
  assert_eq!(departed, 10);
}

// ─── Reset ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn reset_clears_every_record_set() {
  let l = ledger().await;
  l.register_label(&label("DCDP500", "36", "10", "BLEU")).await.unwrap();
  l.receive_stock(TEN_PAIRS, "Decathlon", "2025-05-23").await.unwrap();
  l.issue_departure(TEN_PAIRS, 4, "2025-05-24").await.unwrap();

  l.reset_all().await.unwrap();

  assert!(l.list_labels().await.unwrap().is_empty());
  assert!(l.list_stock().await.unwrap().is_empty());
  assert!(l.list_departures().await.unwrap().is_empty());

  // The identifier can be registered afresh.
  let recorded = l
    .register_label(&label("DCDP500", "36", "10", "BLEU"))
    .await
    .unwrap();
  assert!(recorded.is_inserted());
}
