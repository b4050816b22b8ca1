//! Reply captions.
//!
//! A caption always starts with the original resolution and then lists the
//! capture settings that could be read, in a fixed order:
//!
//! ```text
//! Original resolution: 6000x4000 | Canon Canon EOS R5 | ISO 400 | 50mm | f/2.8 | 1/500s
//! Original resolution: 1920x1080 | No metadata available
//! ```
//!
//! Each clause is built by its own function returning `Option<String>`. A
//! missing or unparseable field yields `None` and is skipped; it never stops
//! the clauses after it.

use crate::imaging::Dimensions;
use crate::metadata::{Fraction, MetadataFieldSet};

pub const DELIMITER: &str = " | ";
pub const NO_METADATA: &str = "No metadata available";

/// Exposures whose reduced denominator is above this render as decimals.
const FRACTION_DENOMINATOR_LIMIT: u64 = 1000;

type Clause = fn(&MetadataFieldSet) -> Option<String>;

/// Clause builders in display order.
const CLAUSES: &[Clause] = &[
    camera_clause,
    iso_clause,
    focal_length_clause,
    aperture_clause,
    exposure_clause,
];

/// Build the caption for an image.
///
/// `fields` is `None` when the file had no readable metadata block. Never
/// fails and never returns an empty string.
pub fn summarize(dimensions: Dimensions, fields: Option<&MetadataFieldSet>) -> String {
    let mut parts = vec![resolution_clause(dimensions)];
    let clauses: Vec<String> = fields
        .map(|f| CLAUSES.iter().filter_map(|clause| clause(f)).collect())
        .unwrap_or_default();

    if clauses.is_empty() {
        parts.push(NO_METADATA.to_string());
    } else {
        parts.extend(clauses);
    }
    parts.join(DELIMITER)
}

pub fn resolution_clause(dimensions: Dimensions) -> String {
    format!(
        "Original resolution: {}x{}",
        dimensions.width, dimensions.height
    )
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

fn fraction(value: Option<&String>) -> Option<Fraction> {
    non_empty(value)?.parse().ok()
}

/// Make and model, emitted only when the model is known.
fn camera_clause(fields: &MetadataFieldSet) -> Option<String> {
    let model = non_empty(fields.model.as_ref())?;
    Some(match non_empty(fields.make.as_ref()) {
        Some(make) => format!("{make} {model}"),
        None => model.to_string(),
    })
}

fn iso_clause(fields: &MetadataFieldSet) -> Option<String> {
    let iso: u32 = non_empty(fields.iso.as_ref())?.parse().ok()?;
    Some(format!("ISO {iso}"))
}

/// Focal length rounded to the nearest millimetre.
fn focal_length_clause(fields: &MetadataFieldSet) -> Option<String> {
    let mm = fraction(fields.focal_length.as_ref())?.to_f64().round();
    Some(format!("{mm}mm"))
}

fn aperture_clause(fields: &MetadataFieldSet) -> Option<String> {
    let f_number = fraction(fields.f_number.as_ref())?.to_f64();
    Some(format!("f/{f_number}"))
}

/// Fast shutter speeds stay fractional (`1/500s`); exposures with a
/// denominator above 1000 become decimals rounded to 3 places.
fn exposure_clause(fields: &MetadataFieldSet) -> Option<String> {
    let exposure = fraction(fields.exposure_time.as_ref())?;
    if exposure.denominator() > FRACTION_DENOMINATOR_LIMIT {
        let secs = (exposure.to_f64() * 1000.0).round() / 1000.0;
        Some(format!("{secs}s"))
    } else {
        Some(format!("{exposure}s"))
    }
}
