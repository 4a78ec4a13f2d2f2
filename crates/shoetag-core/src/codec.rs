//! Encoding attributes into identifiers and decoding identifiers back.
//!
//! Both directions are pure: no state, no I/O, and every failure names the
//! offending field.

use std::ops::RangeInclusive;

use serde::Serialize;

use crate::{
  error::{Field, ValidationError},
  identifier::{
    AttributeInput, Attributes, Identifier, PAIR_COUNTS, SCHEME_YEAR, SIZES,
  },
  registry::{Category, Registry},
};

/// Validate raw operator input into [`Attributes`].
///
/// Checks run in a fixed order and the first failure wins: presence of all
/// four fields, model then color membership, size range, pair-count range.
pub fn validate(
  registry: &Registry,
  input: &AttributeInput<'_>,
) -> Result<Attributes, ValidationError> {
  for (field, value) in [
    (Field::Model, input.model),
    (Field::Size, input.size),
    (Field::PairCount, input.pair_count),
    (Field::Color, input.color),
  ] {
    if value.is_empty() {
      return Err(ValidationError::new(field, "is required"));
    }
  }

  lookup_code(registry, Category::Model, input.model)?;
  lookup_code(registry, Category::Color, input.color)?;
  let size = parse_in_range(Field::Size, input.size, SIZES)?;
  let pair_count = parse_in_range(Field::PairCount, input.pair_count, PAIR_COUNTS)?;

  Ok(Attributes {
    model: input.model.to_owned(),
    size,
    pair_count,
    color: input.color.to_owned(),
  })
}

/// Encode raw operator input. Deterministic: identical input always yields
/// the identical identifier.
pub fn encode(
  registry: &Registry,
  input: &AttributeInput<'_>,
) -> Result<Identifier, ValidationError> {
  identify(registry, &validate(registry, input)?)
}

/// Encode already-structured attributes, re-checking them against the
/// registry and the numeric ranges.
pub fn identify(
  registry: &Registry,
  attrs: &Attributes,
) -> Result<Identifier, ValidationError> {
  let model_code = lookup_code(registry, Category::Model, &attrs.model)?;
  let color_code = lookup_code(registry, Category::Color, &attrs.color)?;
  check_range(Field::Size, attrs.size, SIZES)?;
  check_range(Field::PairCount, attrs.pair_count, PAIR_COUNTS)?;

  Ok(Identifier::from_checked(format!(
    "{SCHEME_YEAR}{:02}{:02}{model_code}{color_code}",
    attrs.size, attrs.pair_count,
  )))
}

/// Decode an identifier string into its attributes.
///
/// Checks, in order: length, digits, scheme year, size range, pair-count
/// range, model code, color code.
pub fn decode(registry: &Registry, raw: &str) -> Result<Attributes, ValidationError> {
  let id: Identifier = raw.parse()?;
  decode_identifier(registry, &id)
}

/// A decoded identifier as reported to operators: the attributes plus the
/// scheme year they were printed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decoded {
  pub year:       &'static str,
  #[serde(flatten)]
  pub attributes: Attributes,
}

/// [`decode`], keeping the scheme year in the result.
pub fn describe(registry: &Registry, raw: &str) -> Result<Decoded, ValidationError> {
  Ok(Decoded { year: SCHEME_YEAR, attributes: decode(registry, raw)? })
}

/// Decode an already shape-checked [`Identifier`].
pub fn decode_identifier(
  registry: &Registry,
  id: &Identifier,
) -> Result<Attributes, ValidationError> {
  if id.year() != SCHEME_YEAR {
    return Err(ValidationError::new(
      Field::SchemeYear,
      format!("must start with {SCHEME_YEAR:?}, got {:?}", id.year()),
    ));
  }
  let size = parse_in_range(Field::Size, id.size(), SIZES)?;
  let pair_count = parse_in_range(Field::PairCount, id.pair_count(), PAIR_COUNTS)?;
  let model = lookup_name(registry, Category::Model, id.model_code())?;
  let color = lookup_name(registry, Category::Color, id.color_code())?;

  Ok(Attributes {
    model: model.to_owned(),
    size,
    pair_count,
    color: color.to_owned(),
  })
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn category_field(category: Category) -> Field {
  match category {
    Category::Model => Field::Model,
    Category::Color => Field::Color,
  }
}

fn lookup_code<'r>(
  registry: &'r Registry,
  category: Category,
  name: &str,
) -> Result<&'r str, ValidationError> {
  registry
    .code_of(category, name)
    .map_err(|e| ValidationError::new(category_field(category), e.to_string()))
}

fn lookup_name<'r>(
  registry: &'r Registry,
  category: Category,
  code: &str,
) -> Result<&'r str, ValidationError> {
  registry
    .name_of(category, code)
    .map_err(|e| ValidationError::new(category_field(category), e.to_string()))
}

fn parse_in_range(
  field: Field,
  raw: &str,
  range: RangeInclusive<u8>,
) -> Result<u8, ValidationError> {
  let value: u8 = raw.parse().map_err(|_| {
    ValidationError::new(field, format!("{raw:?} is not a whole number"))
  })?;
  check_range(field, value, range)?;
  Ok(value)
}

fn check_range(
  field: Field,
  value: u8,
  range: RangeInclusive<u8>,
) -> Result<(), ValidationError> {
  if range.contains(&value) {
    Ok(())
  } else {
    Err(ValidationError::new(
      field,
      format!("must be between {} and {}, got {value}", range.start(), range.end()),
    ))
  }
}
