//! `shoetag` — operator command line for the footwear label and stock ledger.
//!
//! Reads `shoetag.toml` (or the path given with `--config`), opens the SQLite
//! ledger and runs one command. Results are printed to stdout as JSON so
//! label printers and report renderers can consume them; logs go to stderr.
//!
//! # Usage
//!
//! ```
//! shoetag label --model DCDP500 --size 36 --pairs 5 --color BLEU --of OF0001
//! shoetag receive 25360501189 --location Decathlon --date 2025-05-23
//! shoetag depart 25360501189 --pairs 5 --date 2025-05-24
//! shoetag list stock
//! ```

mod config;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context as _, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;
use shoetag_core::{
  AttributeInput, Ledger, codec,
  ledger::{BulkRequest, LabelInput, SizeRange},
  record::format_date,
  registry::Category,
};
use shoetag_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::{Settings, expand_tilde};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "Footwear label and stock ledger")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "shoetag.toml")]
  config: PathBuf,

  /// Ledger database; overrides `store_path` from the configuration.
  #[arg(long)]
  store: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Print the identifier for a set of attributes without recording it.
  Encode {
    #[command(flatten)]
    attrs: AttrArgs,
  },
  /// Print the attributes carried by an identifier.
  Decode { identifier: String },
  /// Issue and record a label.
  Label {
    #[command(flatten)]
    attrs:      AttrArgs,
    #[command(flatten)]
    provenance: ProvenanceArgs,
  },
  /// Record a label from a scanned identifier.
  Scan {
    identifier: String,
    #[command(flatten)]
    provenance: ProvenanceArgs,
  },
  /// Issue one label per model and size.
  Bulk {
    /// Repeat for several models.
    #[arg(long = "model", required = true)]
    models:     Vec<String>,
    #[arg(long)]
    color:      String,
    /// A size or an inclusive range, e.g. `36-42`.
    #[arg(long)]
    sizes:      String,
    #[arg(long)]
    pairs:      String,
    #[command(flatten)]
    provenance: ProvenanceArgs,
  },
  /// Issue a label for every model, size and color in the catalog.
  Seed {
    #[arg(long, default_value = "01")]
    pairs:      String,
    #[command(flatten)]
    provenance: ProvenanceArgs,
  },
  /// Record a scanned identifier as stock at a location.
  Receive {
    identifier: String,
    #[arg(long)]
    location:   String,
    /// Reception date (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    date:       Option<String>,
  },
  /// Ship pairs out of the distribution location.
  Depart {
    identifier: String,
    #[arg(long, allow_negative_numbers = true)]
    pairs:      i64,
    /// Departure date (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    date:       Option<String>,
  },
  /// Show the stock row for an identifier at a location.
  Stock {
    identifier: String,
    #[arg(long)]
    location:   String,
  },
  /// List one record set.
  List {
    #[arg(value_enum)]
    set: RecordSet,
  },
  /// Print the model and color catalog.
  Catalog,
  /// Delete every label, stock row and departure.
  Reset {
    /// Confirm the irreversible reset.
    #[arg(long)]
    yes: bool,
  },
}

#[derive(clap::Args)]
struct AttrArgs {
  #[arg(long)]
  model: String,
  #[arg(long)]
  size:  String,
  #[arg(long)]
  pairs: String,
  #[arg(long)]
  color: String,
}

impl AttrArgs {
  fn input(&self) -> AttributeInput<'_> {
    AttributeInput {
      model:      &self.model,
      size:       &self.size,
      pair_count: &self.pairs,
      color:      &self.color,
    }
  }
}

#[derive(clap::Args)]
struct ProvenanceArgs {
  /// Manufacturing order the batch was produced under.
  #[arg(long = "of")]
  manufacturing_order: String,
  /// Reception date (YYYY-MM-DD); defaults to today.
  #[arg(long)]
  date:                Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum RecordSet {
  Labels,
  Stock,
  Departures,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;
  let registry = Arc::new(
    settings
      .catalog
      .into_registry()
      .context("invalid catalog configuration")?,
  );

  // Codec-only commands never touch the database.
  match &cli.command {
    Command::Encode { attrs } => {
      let identifier = codec::encode(&registry, &attrs.input())?;
      return print(&json!({ "identifier": identifier }));
    }
    Command::Decode { identifier } => {
      return print(&codec::describe(&registry, identifier)?);
    }
    Command::Catalog => {
      return print(&json!({
        "models": registry.entries(Category::Model),
        "colors": registry.entries(Category::Color),
      }));
    }
    _ => {}
  }

  let store_path = expand_tilde(cli.store.as_deref().unwrap_or(settings.store_path.as_path()));
  if let Some(parent) = store_path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  tracing::debug!(path = %store_path.display(), "ledger opened");

  let ledger = Ledger::new(store, registry);
  run(&ledger, cli.command).await
}

async fn run(ledger: &Ledger<SqliteStore>, command: Command) -> anyhow::Result<()> {
  match command {
    Command::Label { attrs, provenance } => {
      let today = today();
      let recorded = ledger
        .register_label(&LabelInput {
          attributes:          attrs.input(),
          reception_date:      provenance.date.as_deref().unwrap_or(&today),
          manufacturing_order: &provenance.manufacturing_order,
        })
        .await?;
      print(&recorded)
    }
    Command::Scan { identifier, provenance } => {
      let today = today();
      let recorded = ledger
        .scan_label(
          &identifier,
          provenance.date.as_deref().unwrap_or(&today),
          &provenance.manufacturing_order,
        )
        .await?;
      print(&recorded)
    }
    Command::Bulk { models, color, sizes, pairs, provenance } => {
      let today = today();
      let sizes: SizeRange = sizes.parse()?;
      let report = ledger
        .bulk_register(&BulkRequest {
          models: models.iter().map(String::as_str).collect(),
          color: &color,
          sizes,
          pair_count: &pairs,
          manufacturing_order: &provenance.manufacturing_order,
          reception_date: provenance.date.as_deref().unwrap_or(&today),
        })
        .await?;
      print(&report)
    }
    Command::Seed { pairs, provenance } => {
      let today = today();
      let report = ledger
        .seed_catalog(
          &pairs,
          provenance.date.as_deref().unwrap_or(&today),
          &provenance.manufacturing_order,
        )
        .await?;
      print(&report)
    }
    Command::Receive { identifier, location, date } => {
      let date = date.unwrap_or_else(today);
      print(&ledger.receive_stock(&identifier, &location, &date).await?)
    }
    Command::Depart { identifier, pairs, date } => {
      let date = date.unwrap_or_else(today);
      print(&ledger.issue_departure(&identifier, pairs, &date).await?)
    }
    Command::Stock { identifier, location } => {
      print(&ledger.stock_at(&identifier, &location).await?)
    }
    Command::List { set } => match set {
      RecordSet::Labels => print(&ledger.list_labels().await?),
      RecordSet::Stock => print(&ledger.list_stock().await?),
      RecordSet::Departures => print(&ledger.list_departures().await?),
    },
    Command::Reset { yes } => {
      if !yes {
        bail!("refusing to reset the ledger without --yes");
      }
      ledger.reset_all().await?;
      print(&json!({ "reset": true }))
    }
    Command::Encode { .. } | Command::Decode { .. } | Command::Catalog => Ok(()),
  }
}

fn today() -> String { format_date(chrono::Local::now().date_naive()) }

fn print<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}
