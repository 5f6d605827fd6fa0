use std::fs;
use std::path::Path;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Serialize;

use crate::domain::Method;
use crate::error::PocketError;

pub fn default_filename(method: Method) -> &'static str {
    match method {
        Method::Grasp => "grasp_pockets.csv",
        Method::P2rank => "p2rank_pockets.csv",
    }
}

/// No records means no output at all, not even a header.
pub fn to_csv<T: Serialize>(records: &[T]) -> Result<String, PocketError> {
    if records.is_empty() {
        return Ok(String::new());
    }
    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    for record in records {
        writer
            .serialize(record)
            .map_err(|err| PocketError::Export(err.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| PocketError::Export(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| PocketError::Export(err.to_string()))
}

pub fn write_csv<T: Serialize>(path: &Path, records: &[T]) -> Result<(), PocketError> {
    let content = to_csv(records)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| PocketError::Filesystem(err.to_string()))?;
    }
    fs::write(path, content)
        .map_err(|err| PocketError::Filesystem(format!("write {}: {err}", path.display())))?;
    tracing::info!(path = %path.display(), rows = records.len(), "exported CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Center, PocketRecord};

    #[test]
    fn header_follows_record_fields() {
        let record = PocketRecord {
            label: "Pocket 1".to_string(),
            score: 0.5,
            center: Center([1.0, 2.0, 3.0]),
            residues: vec!["ALA10".to_string(), "GLY11".to_string()],
            atoms: vec![],
        };
        let csv = to_csv(&[record]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Pockets,score,Pocket center,Residues,Atoms"));
        assert_eq!(
            lines.next(),
            Some(r#"Pocket 1,0.5,"(1.000, 2.000, 3.000)","ALA10, GLY11","#)
        );
    }

    #[test]
    fn export_filenames_per_method() {
        assert_eq!(default_filename(Method::Grasp), "grasp_pockets.csv");
        assert_eq!(default_filename(Method::P2rank), "p2rank_pockets.csv");
    }

    #[test]
    fn empty_export_is_empty() {
        assert_eq!(to_csv::<PocketRecord>(&[]).unwrap(), "");
    }
}
