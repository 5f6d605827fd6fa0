use crate::config::DecoderConfig;
use crate::dialect::{DialectOutput, GraspDialect, P2rankDialect, PocketDialect};
use crate::domain::{DecodedResponse, PocketMap};
use crate::error::PocketError;
use crate::multipart::{ResponseParts, extract_parts};
use crate::structure::ResidueIndex;

// Holds configuration only, so one decoder can serve concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn decode(&self, content_type: &str, body: &[u8]) -> Result<DecodedResponse, PocketError> {
        let parts = extract_parts(
            content_type,
            body,
            &self.config.expected_content_type,
            &self.config.markers,
        )?;
        Ok(self.decode_parts(parts))
    }

    pub fn decode_parts(&self, parts: ResponseParts) -> DecodedResponse {
        let structure_text = parts.structure.unwrap_or_default();
        let index = ResidueIndex::from_pdb(&structure_text);

        let grasp = run_dialect(&GraspDialect, parts.grasp_csv.as_deref(), &index);
        let p2rank = run_dialect(&P2rankDialect, parts.p2rank_csv.as_deref(), &index);

        tracing::info!(
            grasp = grasp.records.len(),
            p2rank = p2rank.records.len(),
            residues = index.len(),
            warnings = grasp.warnings.len() + p2rank.warnings.len(),
            "decoded pocket predictions"
        );

        let mut warnings = grasp.warnings;
        warnings.extend(p2rank.warnings);
        DecodedResponse {
            grasp: grasp.records,
            p2rank: p2rank.records,
            structure_text,
            grasp_pockets: PocketMap::from_ordered(grasp.pockets),
            p2rank_pockets: PocketMap::from_ordered(p2rank.pockets),
            warnings,
        }
    }
}

fn run_dialect(dialect: &dyn PocketDialect, csv: Option<&str>, index: &ResidueIndex) -> DialectOutput {
    match csv {
        Some(csv) => dialect.parse(csv, index),
        None => {
            tracing::debug!(method = %dialect.method(), "no table in response");
            DialectOutput::default()
        }
    }
}

pub fn decode(content_type: &str, body: &[u8]) -> Result<DecodedResponse, PocketError> {
    Decoder::default().decode(content_type, body)
}
