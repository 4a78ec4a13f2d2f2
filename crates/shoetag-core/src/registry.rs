//! The attribute registry: fixed bijections between human-readable model and
//! color names and the short numeric codes embedded in identifiers.
//!
//! A [`Registry`] is built once at startup, either from the built-in catalog
//! or from configuration, and is immutable afterwards.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::error::{NotFound, RegistryError};

// ─── Category ────────────────────────────────────────────────────────────────

/// Which registry a name or code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Category {
  Model,
  Color,
}

impl Category {
  /// Number of digits a short code occupies inside an identifier.
  pub const fn code_width(self) -> usize {
    match self {
      Self::Model => 2,
      Self::Color => 3,
    }
  }
}

// ─── Entries ─────────────────────────────────────────────────────────────────

/// One `(name, code)` pair as written in the catalog configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
  pub name: String,
  pub code: String,
}

impl Entry {
  pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
    Self { name: name.into(), code: code.into() }
  }
}

const DEFAULT_MODELS: &[(&str, &str)] = &[
  ("DCDP500", "01"),
  ("DCDP900", "02"),
  ("MW", "03"),
  ("GAS", "04"),
];

const DEFAULT_COLORS: &[(&str, &str)] = &[
  ("410NOIR", "012"),
  ("L07A PINK", "025"),
  ("BLEU", "189"),
  ("Nougat", "962"),
  ("N07ablanc", "364"),
  ("N07a black", "146"),
  ("GR GRIS", "397"),
];

// ─── Table ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Table {
  category: Category,
  /// Declaration order, kept for listings and catalog seeding.
  entries:  Vec<Entry>,
  by_name:  HashMap<String, usize>,
  by_code:  HashMap<String, usize>,
}

impl Table {
  fn build(
    category: Category,
    entries: impl IntoIterator<Item = Entry>,
  ) -> Result<Self, RegistryError> {
    let width = category.code_width();
    let mut table = Self {
      category,
      entries: Vec::new(),
      by_name: HashMap::new(),
      by_code: HashMap::new(),
    };

    for entry in entries {
      if entry.name.is_empty() {
        return Err(RegistryError::EmptyName { category });
      }
      if entry.code.len() != width
        || !entry.code.bytes().all(|b| b.is_ascii_digit())
      {
        return Err(RegistryError::BadCode {
          category,
          code: entry.code,
          width,
        });
      }
      if table.by_name.contains_key(&entry.name) {
        return Err(RegistryError::DuplicateName {
          category,
          name: entry.name,
        });
      }
      if let Some(&idx) = table.by_code.get(&entry.code) {
        return Err(RegistryError::DuplicateCode {
          category,
          first: table.entries[idx].name.clone(),
          code: entry.code,
          second: entry.name,
        });
      }

      let idx = table.entries.len();
      table.by_name.insert(entry.name.clone(), idx);
      table.by_code.insert(entry.code.clone(), idx);
      table.entries.push(entry);
    }

    Ok(table)
  }

  fn code_of(&self, name: &str) -> Result<&str, NotFound> {
    self
      .by_name
      .get(name)
      .map(|&idx| self.entries[idx].code.as_str())
      .ok_or_else(|| NotFound { category: self.category, key: name.to_owned() })
  }

  fn name_of(&self, code: &str) -> Result<&str, NotFound> {
    self
      .by_code
      .get(code)
      .map(|&idx| self.entries[idx].name.as_str())
      .ok_or_else(|| NotFound { category: self.category, key: code.to_owned() })
  }
}

// ─── Registry ────────────────────────────────────────────────────────────────

/// The model and color registries. Each is a bijection between names and
/// fixed-width numeric codes.
#[derive(Debug, Clone)]
pub struct Registry {
  models: Table,
  colors: Table,
}

impl Registry {
  /// Build a registry, rejecting any entry set that is not a bijection of
  /// non-empty names onto correctly sized numeric codes.
  pub fn new(
    models: impl IntoIterator<Item = Entry>,
    colors: impl IntoIterator<Item = Entry>,
  ) -> Result<Self, RegistryError> {
    Ok(Self {
      models: Table::build(Category::Model, models)?,
      colors: Table::build(Category::Color, colors)?,
    })
  }

  pub fn code_of(&self, category: Category, name: &str) -> Result<&str, NotFound> {
    self.table(category).code_of(name)
  }

  pub fn name_of(&self, category: Category, code: &str) -> Result<&str, NotFound> {
    self.table(category).name_of(code)
  }

  /// Entries of one category in declaration order.
  pub fn entries(&self, category: Category) -> &[Entry] {
    &self.table(category).entries
  }

  fn table(&self, category: Category) -> &Table {
    match category {
      Category::Model => &self.models,
      Category::Color => &self.colors,
    }
  }
}

impl Default for Registry {
  /// The production catalog.
  fn default() -> Self {
    fn entries(pairs: &[(&str, &str)]) -> Vec<Entry> {
      pairs.iter().map(|(name, code)| Entry::new(*name, *code)).collect()
    }

    Self {
      models: Table::build(Category::Model, entries(DEFAULT_MODELS))
        .expect("built-in model catalog is a bijection"),
      colors: Table::build(Category::Color, entries(DEFAULT_COLORS))
        .expect("built-in color catalog is a bijection"),
    }
  }
}
