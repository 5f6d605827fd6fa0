use std::collections::HashMap;

const RECORD_TAGS: [&str; 2] = ["ATOM  ", "HETATM"];

/// `"<chain>_<seq>"` to three-letter residue name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResidueIndex {
    names: HashMap<String, String>,
}

impl ResidueIndex {
    pub fn from_pdb(text: &str) -> Self {
        let mut names = HashMap::new();
        for line in text.lines() {
            if !RECORD_TAGS.iter().any(|tag| line.starts_with(tag)) {
                continue;
            }
            let Some((chain, residue_name, seq)) = residue_fields(line) else {
                tracing::trace!(line, "skipping short coordinate record");
                continue;
            };
            // every atom of a residue repeats its name, so the last write is as good as any
            names.insert(Self::key(chain, seq), residue_name.to_string());
        }
        tracing::debug!(residues = names.len(), "indexed structure residues");
        Self { names }
    }

    pub fn key(chain: &str, seq: &str) -> String {
        format!("{chain}_{seq}")
    }

    pub fn name(&self, token: &str) -> Option<&str> {
        self.names.get(token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// chain: col 22, residue name: cols 18-20, sequence number: cols 23-26
fn residue_fields(line: &str) -> Option<(&str, &str, &str)> {
    let residue_name = line.get(17..20)?.trim();
    let chain = line.get(21..22)?.trim();
    let seq = line.get(22..26)?.trim();
    if residue_name.is_empty() || seq.is_empty() {
        return None;
    }
    Some((chain, residue_name, seq))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PDB: &str = "\
HEADER    HYDROLASE                               01-JAN-00   1ABC
ATOM      1  N   ALA A  10      11.104   6.134  -6.504  1.00  0.00           N
ATOM      2  CA  ALA A  10      11.639   6.071  -5.147  1.00  0.00           C
ATOM      3  N   GLY A  11      12.000   7.000  -4.000  1.00  0.00           N
HETATM    4  O   HOH B 101      20.000  20.000  20.000  1.00  0.00           O
ATOM      5  N   SER A
TER
END
";

    #[test]
    fn indexes_atom_and_hetatm_records() {
        let index = ResidueIndex::from_pdb(PDB);
        assert_eq!(index.len(), 3);
        assert_eq!(index.name("A_10"), Some("ALA"));
        assert_eq!(index.name("A_11"), Some("GLY"));
        assert_eq!(index.name("B_101"), Some("HOH"));
    }

    #[test]
    fn short_records_are_skipped() {
        let index = ResidueIndex::from_pdb(PDB);
        assert!(index.name("A_").is_none());
        assert!(!index.names.values().any(|name| name == "SER"));
    }

    #[test]
    fn blank_chain_keeps_leading_underscore() {
        let line = "ATOM      1  CA  LYS    42      0.000   0.000   0.000  1.00  0.00           C";
        let index = ResidueIndex::from_pdb(line);
        assert_eq!(index.name("_42"), Some("LYS"));
    }

    #[test]
    fn empty_text_gives_empty_index() {
        assert!(ResidueIndex::from_pdb("").is_empty());
    }
}
