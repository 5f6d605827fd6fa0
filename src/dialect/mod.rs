pub mod grasp;
pub mod p2rank;

use crate::domain::{Method, PocketRecord};
use crate::error::DecodeWarning;
use crate::structure::ResidueIndex;

pub use grasp::GraspDialect;
pub use p2rank::P2rankDialect;

pub trait PocketDialect {
    fn method(&self) -> Method;

    fn parse(&self, csv: &str, index: &ResidueIndex) -> DialectOutput;
}

// pocket `n` is `pockets[n - 1]`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DialectOutput {
    pub records: Vec<PocketRecord>,
    pub pockets: Vec<Vec<i64>>,
    pub warnings: Vec<DecodeWarning>,
}

impl DialectOutput {
    pub(crate) fn push(&mut self, record: PocketRecord, residue_numbers: Vec<i64>) {
        self.records.push(record);
        self.pockets.push(residue_numbers);
    }
}

pub(crate) struct RowContext<'a> {
    method: Method,
    row: usize,
    warnings: &'a mut Vec<DecodeWarning>,
}

impl<'a> RowContext<'a> {
    pub(crate) fn new(method: Method, row: usize, warnings: &'a mut Vec<DecodeWarning>) -> Self {
        Self {
            method,
            row,
            warnings,
        }
    }

    pub(crate) fn warn(&mut self, reason: impl Into<String>) {
        let warning = DecodeWarning::RowParse {
            method: self.method,
            row: self.row,
            reason: reason.into(),
        };
        tracing::warn!("{warning}");
        self.warnings.push(warning);
    }

    pub(crate) fn lookup_miss(&mut self, token: &str) {
        let warning = DecodeWarning::StructureLookupMiss {
            token: token.to_string(),
        };
        tracing::debug!("{warning}");
        self.warnings.push(warning);
    }

    // blank is a silent 0.0, garbage is 0.0 plus a warning
    pub(crate) fn number(&mut self, column: &str, raw: Option<&str>) -> f64 {
        let value = raw.map(str::trim).unwrap_or_default();
        if value.is_empty() {
            return 0.0;
        }
        match value.parse::<f64>() {
            Ok(parsed) if parsed.is_finite() => parsed,
            _ => {
                self.warn(format!("column {column}: invalid number {value:?}"));
                0.0
            }
        }
    }
}

// "15A" (insertion code) reads as 15
pub(crate) fn leading_int(value: &str) -> Option<i64> {
    let value = value.trim_start();
    let digits_start = usize::from(value.starts_with(['-', '+']));
    let digits_len = value[digits_start..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return None;
    }
    value[..digits_start + digits_len].parse().ok()
}
