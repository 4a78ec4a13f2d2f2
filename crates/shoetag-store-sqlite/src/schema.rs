//! SQL schema for the shoetag SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! layout so later migrations can be gated on it.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Issued labels. First writer wins on a repeated identifier.
CREATE TABLE IF NOT EXISTS labels (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    identifier          TEXT    NOT NULL UNIQUE,
    model               TEXT    NOT NULL,
    size                INTEGER NOT NULL,
    pair_count          INTEGER NOT NULL,
    reception_date      TEXT    NOT NULL,   -- YYYY-MM-DD
    color               TEXT    NOT NULL,
    manufacturing_order TEXT    NOT NULL
);

-- Stock on hand, one row per identifier and location.
CREATE TABLE IF NOT EXISTS stock (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    identifier     TEXT    NOT NULL,
    designation    TEXT    NOT NULL,
    color          TEXT    NOT NULL,
    size           INTEGER NOT NULL,
    pair_count     INTEGER NOT NULL CHECK (pair_count > 0),
    reception_date TEXT    NOT NULL,
    location       TEXT    NOT NULL,   -- 'Imbert-Mnif' | 'Decathlon'
    UNIQUE (identifier, location)
);

-- Departures are append-only; rows are only removed by a full reset.
CREATE TABLE IF NOT EXISTS departures (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    identifier     TEXT    NOT NULL,
    designation    TEXT    NOT NULL,
    color          TEXT    NOT NULL,
    size           INTEGER NOT NULL,
    pair_count     INTEGER NOT NULL CHECK (pair_count > 0),
    departure_date TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS departures_identifier_idx ON departures(identifier);

PRAGMA user_version = 1;
";

/// Wipes every record set and restarts the row sequences.
pub const RESET: &str = "
DELETE FROM labels;
DELETE FROM stock;
DELETE FROM departures;
DELETE FROM sqlite_sequence WHERE name IN ('labels', 'stock', 'departures');
";
