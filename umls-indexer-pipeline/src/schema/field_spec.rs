//! Declarative field table and the decoder that interprets it.

use std::num::ParseIntError;
use std::sync::Arc;

use crate::errors::FieldDecodeError;
use crate::schema::record::{FieldValue, ParsedRecord};
use crate::source::RawLine;

/// How a column is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Kept as text.
    Text,
    /// True iff the column equals the given marker, ignoring ASCII case.
    Flag(&'static str),
    /// Signed integer; surrounding whitespace is ignored.
    Integer,
}

impl FieldKind {
    /// Decode a non-empty column.
    pub fn decode(&self, raw: &str) -> Result<FieldValue, ParseIntError> {
        match self {
            Self::Text => Ok(FieldValue::Text(raw.to_string())),
            Self::Flag(marker) => Ok(FieldValue::Flag(raw.eq_ignore_ascii_case(marker))),
            Self::Integer => raw.trim().parse::<i64>().map(FieldValue::Integer),
        }
    }
}

/// A named column of the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: Arc<str>,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: Arc::from(name),
            kind,
        }
    }

    pub fn text(name: &str) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn flag(name: &str, marker: &'static str) -> Self {
        Self::new(name, FieldKind::Flag(marker))
    }

    pub fn integer(name: &str) -> Self {
        Self::new(name, FieldKind::Integer)
    }
}

/// Ordered column layout of an RRF file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    /// Build a schema from fields in column order.
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// The 18-column layout of `MRCONSO.RRF`.
    pub fn mrconso() -> Self {
        Self::new(vec![
            FieldSpec::text("CUI"),
            FieldSpec::text("LAT"),
            FieldSpec::flag("TS", "P"),
            FieldSpec::text("LUI"),
            FieldSpec::text("STT"),
            FieldSpec::text("SUI"),
            FieldSpec::flag("ISPREF", "Y"),
            FieldSpec::text("AUI"),
            FieldSpec::text("SAUI"),
            FieldSpec::text("SCUI"),
            FieldSpec::text("SDUI"),
            FieldSpec::text("SAB"),
            FieldSpec::text("TTY"),
            FieldSpec::text("CODE"),
            FieldSpec::text("STR"),
            FieldSpec::integer("SRL"),
            FieldSpec::text("SUPPRESS"),
            FieldSpec::integer("CFV"),
        ])
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Decode `line` into a record.
    ///
    /// Columns are paired with fields by position; pairing stops at whichever
    /// runs out first, so short lines give partial records and extra columns
    /// are ignored. Empty columns decode to no value.
    pub fn parse(&self, line: &RawLine) -> Result<ParsedRecord, FieldDecodeError> {
        let mut fields = Vec::with_capacity(self.fields.len());

        for (spec, raw) in self.fields.iter().zip(line.columns()) {
            let value = if raw.is_empty() {
                None
            } else {
                let value = spec
                    .kind
                    .decode(raw)
                    .map_err(|e| FieldDecodeError::new(&*spec.name, raw, e))?;
                Some(value)
            };
            fields.push((spec.name.clone(), value));
        }

        Ok(ParsedRecord::new(fields, self.fields.len()))
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::mrconso()
    }
}
