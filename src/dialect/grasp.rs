use std::collections::HashSet;
use std::sync::LazyLock;

use csv::{ReaderBuilder, StringRecord, Trim};
use regex::Regex;
use serde_json::Value;

use crate::dialect::{DialectOutput, PocketDialect, RowContext};
use crate::domain::{Center, Method, PocketRecord};
use crate::structure::ResidueIndex;

static RESIDUE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Residue (\w+), (\d+)").expect("residue pattern is valid"));

const SCORE: &str = "prob";
const X: &str = "x";
const Y: &str = "y";
const Z: &str = "z";
const RESIDUES: &str = "resid_id";
const ATOMS: &str = "atom_indexes";

#[derive(Debug, Clone, Copy, Default)]
pub struct GraspDialect;

impl PocketDialect for GraspDialect {
    fn method(&self) -> Method {
        Method::Grasp
    }

    /// Every non-blank row becomes a record; pocket `n` is the `n`-th data
    /// row even when that row could not be read at all.
    fn parse(&self, csv: &str, _index: &ResidueIndex) -> DialectOutput {
        let mut output = DialectOutput::default();
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::Headers)
            .from_reader(csv.as_bytes());

        let headers = match reader.headers() {
            Ok(headers) => headers.clone(),
            Err(err) => {
                RowContext::new(Method::Grasp, 0, &mut output.warnings)
                    .warn(format!("unreadable header: {err}"));
                return output;
            }
        };
        let column = |name: &str| headers.iter().position(|header| header == name);
        let positions = GraspPositions {
            score: column(SCORE),
            x: column(X),
            y: column(Y),
            z: column(Z),
            residues: column(RESIDUES),
            atoms: column(ATOMS),
        };

        let mut row = 0usize;
        for result in reader.records() {
            if matches!(&result, Ok(record) if is_blank(record)) {
                continue;
            }
            row += 1;
            let mut ctx = RowContext::new(Method::Grasp, row, &mut output.warnings);
            let record = result
                .map_err(|err| ctx.warn(format!("unreadable row: {err}")))
                .ok();
            let (pocket, numbers) = parse_row(record.as_ref(), &positions, row, &mut ctx);
            output.push(pocket, numbers);
        }

        tracing::debug!(pockets = output.records.len(), "parsed GrASP table");
        output
    }
}

struct GraspPositions {
    score: Option<usize>,
    x: Option<usize>,
    y: Option<usize>,
    z: Option<usize>,
    residues: Option<usize>,
    atoms: Option<usize>,
}

fn parse_row(
    record: Option<&StringRecord>,
    positions: &GraspPositions,
    row: usize,
    ctx: &mut RowContext<'_>,
) -> (PocketRecord, Vec<i64>) {
    let field = |position: Option<usize>| {
        record
            .zip(position)
            .and_then(|(record, position)| record.get(position))
    };

    let (residues, numbers) = extract_residues(field(positions.residues).unwrap_or_default(), ctx);
    let atoms = match field(positions.atoms) {
        Some(raw) if !raw.trim().is_empty() => parse_atom_list(raw).unwrap_or_else(|err| {
            ctx.warn(format!("column {ATOMS}: {err}"));
            Vec::new()
        }),
        _ => Vec::new(),
    };

    let score = ctx.number(SCORE, field(positions.score));
    let center = Center([
        ctx.number(X, field(positions.x)),
        ctx.number(Y, field(positions.y)),
        ctx.number(Z, field(positions.z)),
    ]);

    let pocket = PocketRecord {
        label: format!("Pocket {row}"),
        score,
        center,
        residues,
        atoms,
    };
    (pocket, numbers)
}

/// First occurrence of each `<name><number>`, ordered by number. A number too
/// large to read stays in the labels, sorted last, and is left out of the map.
fn extract_residues(text: &str, ctx: &mut RowContext<'_>) -> (Vec<String>, Vec<i64>) {
    let mut seen = HashSet::new();
    let mut residues = Vec::new();
    for captures in RESIDUE_PATTERN.captures_iter(text) {
        let name = &captures[1];
        let digits = &captures[2];
        let label = format!("{name}{digits}");
        if !seen.insert(label.clone()) {
            continue;
        }
        let number = digits.parse::<i64>().ok();
        if number.is_none() {
            ctx.warn(format!("residue number {digits} out of range"));
        }
        residues.push((number, label));
    }
    residues.sort_by_key(|(number, _)| number.unwrap_or(i64::MAX));
    let numbers = residues.iter().filter_map(|(number, _)| *number).collect();
    let labels = residues.into_iter().map(|(_, label)| label).collect();
    (labels, numbers)
}

fn parse_atom_list(raw: &str) -> Result<Vec<String>, serde_json::Error> {
    let values: Vec<Value> = serde_json::from_str(raw)?;
    Ok(values
        .into_iter()
        .map(|value| match value {
            Value::String(text) => text,
            Value::Null => String::new(),
            other => other.to_string(),
        })
        .collect())
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|field| field.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeWarning;

    fn parse(csv: &str) -> DialectOutput {
        GraspDialect::default().parse(csv, &ResidueIndex::default())
    }

    #[test]
    fn residues_are_deduplicated_and_sorted() {
        let csv = "prob,x,y,z,resid_id,atom_indexes\n\
                   0.5,0,0,0,\"Residue GLY, 11Residue ALA, 2Residue GLY, 11\",[]\n";
        let output = parse(csv);
        assert_eq!(output.records[0].residues, vec!["ALA2", "GLY11"]);
        assert_eq!(output.pockets[0], vec![2, 11]);
    }

    #[test]
    fn oversized_residue_numbers_keep_their_label() {
        let csv = "prob,resid_id\n\
                   0.5,\"Residue ALA, 3000000000Residue GLY, 5Residue SER, 99999999999999999999\"\n";
        let output = parse(csv);
        assert_eq!(
            output.records[0].residues,
            vec!["GLY5", "ALA3000000000", "SER99999999999999999999"]
        );
        assert_eq!(output.pockets[0], vec![5, 3_000_000_000]);
        assert_eq!(output.warnings.len(), 1);
    }

    #[test]
    fn bad_atom_json_keeps_the_row() {
        let csv = "prob,x,y,z,resid_id,atom_indexes\n0.9,1,2,3,,not-json\n";
        let output = parse(csv);
        assert_eq!(output.records.len(), 1);
        assert!(output.records[0].atoms.is_empty());
        assert_eq!(output.records[0].score, 0.9);
        assert!(matches!(
            output.warnings.as_slice(),
            [DecodeWarning::RowParse { row: 1, .. }]
        ));
    }

    #[test]
    fn atom_values_render_as_text() {
        let csv = "prob,atom_indexes\n0.1,\"[1, \"\"CA\"\", 3]\"\n";
        let output = parse(csv);
        assert_eq!(output.records[0].atoms, vec!["1", "CA", "3"]);
    }

    #[test]
    fn short_rows_default_missing_fields() {
        let csv = "prob,x,y,z,resid_id,atom_indexes\n0.4,7\n\n0.3,1,1,1,\"Residue SER, 5\",[9]\n";
        let output = parse(csv);
        assert_eq!(output.records.len(), 2);
        assert_eq!(output.records[0].center, Center([7.0, 0.0, 0.0]));
        assert_eq!(output.records[1].label, "Pocket 2");
        assert_eq!(output.pockets[0], Vec::<i64>::new());
        assert_eq!(output.pockets[1], vec![5]);
    }

    #[test]
    fn empty_table_yields_nothing() {
        assert_eq!(parse("prob,x,y,z\n"), DialectOutput::default());
        assert_eq!(parse(""), DialectOutput::default());
    }
}
