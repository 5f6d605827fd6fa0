use std::collections::HashMap;

use crate::dialect::{DialectOutput, PocketDialect, RowContext, leading_int};
use crate::domain::{Center, Method, PocketRecord};
use crate::structure::ResidueIndex;

const NAME: &str = "name";
const SCORE: &str = "probability";
const X: &str = "center_x";
const Y: &str = "center_y";
const Z: &str = "center_z";
const RESIDUES: &str = "residue_ids";
const ATOMS: &str = "surf_atom_ids";

#[derive(Debug, Clone, Copy, Default)]
pub struct P2rankDialect;

impl PocketDialect for P2rankDialect {
    fn method(&self) -> Method {
        Method::P2rank
    }

    /// Rows with fewer fields than the header are dropped; pockets are
    /// numbered over the rows that survive.
    fn parse(&self, csv: &str, index: &ResidueIndex) -> DialectOutput {
        let mut output = DialectOutput::default();
        let mut lines = csv.split('\n').filter(|line| !line.trim().is_empty());
        let Some(header_line) = lines.next() else {
            return output;
        };
        let headers: Vec<&str> = header_line.split(',').map(str::trim).collect();

        for (line_no, line) in lines.enumerate() {
            let values = split_quoted(line);
            if values.len() < headers.len() {
                RowContext::new(Method::P2rank, line_no + 1, &mut output.warnings).warn(format!(
                    "skipped: {} values for {} columns",
                    values.len(),
                    headers.len()
                ));
                continue;
            }
            let row: HashMap<&str, &str> = headers
                .iter()
                .copied()
                .zip(values.into_iter().map(clean_value))
                .collect();

            let pocket_no = output.records.len() + 1;
            let mut ctx = RowContext::new(Method::P2rank, pocket_no, &mut output.warnings);
            let (pocket, numbers) = parse_row(&row, pocket_no, index, &mut ctx);
            output.push(pocket, numbers);
        }

        tracing::debug!(pockets = output.records.len(), "parsed P2Rank table");
        output
    }
}

fn parse_row(
    row: &HashMap<&str, &str>,
    pocket_no: usize,
    index: &ResidueIndex,
    ctx: &mut RowContext<'_>,
) -> (PocketRecord, Vec<i64>) {
    let field = |column: &str| row.get(column).copied();

    let label = match field(NAME) {
        Some(name) if !name.is_empty() => name.replacen("pocket", "Pocket ", 1),
        _ => format!("Pocket {pocket_no}"),
    };

    let tokens: Vec<&str> = field(RESIDUES).unwrap_or_default().split_whitespace().collect();
    let mut numbers = Vec::with_capacity(tokens.len());
    let mut residues = Vec::with_capacity(tokens.len());
    for token in tokens {
        let seq = token.split('_').nth(1);
        match seq.and_then(leading_int) {
            Some(number) => numbers.push(number),
            None => ctx.warn(format!("residue token {token:?} has no number")),
        }
        residues.push(residue_label(token, seq, index, ctx));
    }

    let atoms = field(ATOMS)
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_string)
        .collect();

    let score = ctx.number(SCORE, field(SCORE));
    let center = Center([
        ctx.number(X, field(X)),
        ctx.number(Y, field(Y)),
        ctx.number(Z, field(Z)),
    ]);

    let pocket = PocketRecord {
        label,
        score,
        center,
        residues,
        atoms,
    };
    (pocket, numbers)
}

fn residue_label(
    token: &str,
    seq: Option<&str>,
    index: &ResidueIndex,
    ctx: &mut RowContext<'_>,
) -> String {
    match index.name(token) {
        Some(name) => format!("{name}{}", seq.unwrap_or_default()),
        None => {
            ctx.lookup_miss(token);
            format!("Unknown_{token}")
        }
    }
}

pub fn split_quoted(line: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (idx, ch) in line.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(&line[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    fields.push(&line[start..]);
    fields
}

fn clean_value(value: &str) -> &str {
    let value = value.trim();
    let value = value.strip_prefix('"').unwrap_or(value);
    value.strip_suffix('"').unwrap_or(value)
}
