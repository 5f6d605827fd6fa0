use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{DecodeWarning, PocketError};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProteinId(String);

impl ProteinId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProteinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProteinId {
    type Err = PocketError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_uppercase();
        let is_valid =
            normalized.len() == 4 && normalized.chars().all(|ch| ch.is_ascii_alphanumeric());
        if !is_valid {
            return Err(PocketError::InvalidProteinId(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Grasp,
    P2rank,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Grasp => write!(f, "GrASP"),
            Method::P2rank => write!(f, "P2Rank"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Center(pub [f64; 3]);

impl fmt::Display for Center {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z] = self.0.map(round_thousandths);
        write!(f, "({x:.3}, {y:.3}, {z:.3})")
    }
}

/// Rounds halfway cases away from zero; `{:.3}` alone would round them to even.
fn round_thousandths(value: f64) -> f64 {
    // -0.0 + 0.0 == +0.0, keeps "-0.000" out of the output
    let value = value + 0.0;
    // a value exactly halfway between two thousandths is an odd multiple of 1/16
    let sixteenths = value * 16.0;
    if sixteenths.fract() == 0.0 && sixteenths % 2.0 != 0.0 {
        (value * 1000.0).round() / 1000.0
    } else {
        value
    }
}

impl Serialize for Center {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PocketRecord {
    #[serde(rename = "Pockets")]
    pub label: String,
    pub score: f64,
    #[serde(rename = "Pocket center")]
    pub center: Center,
    #[serde(rename = "Residues", serialize_with = "join_list")]
    pub residues: Vec<String>,
    #[serde(rename = "Atoms", serialize_with = "join_list")]
    pub atoms: Vec<String>,
}

fn join_list<S: Serializer>(values: &[String], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&values.join(", "))
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PocketMap {
    entries: Vec<(usize, Vec<i64>)>,
}

impl PocketMap {
    pub fn from_ordered(pockets: Vec<Vec<i64>>) -> Self {
        let entries = pockets
            .into_iter()
            .enumerate()
            .map(|(idx, residues)| (idx + 1, residues))
            .collect();
        Self { entries }
    }

    pub fn key(number: usize) -> String {
        format!("pocket{number}")
    }

    pub fn get(&self, number: usize) -> Option<&[i64]> {
        self.entries
            .iter()
            .find(|(n, _)| *n == number)
            .map(|(_, residues)| residues.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// An unknown pocket number selects an empty residue list, not an error.
    pub fn select(&self, selection: PocketSelection) -> PocketMap {
        match selection {
            PocketSelection::All => self.clone(),
            PocketSelection::Single(number) => {
                let residues = self.get(number).map(<[i64]>::to_vec).unwrap_or_default();
                PocketMap {
                    entries: vec![(number, residues)],
                }
            }
        }
    }
}

impl Serialize for PocketMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (number, residues) in &self.entries {
            map.serialize_entry(&Self::key(*number), residues)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PocketSelection {
    #[default]
    All,
    Single(usize),
}

impl fmt::Display for PocketSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PocketSelection::All => write!(f, "All Pockets"),
            PocketSelection::Single(number) => write!(f, "Pocket {number}"),
        }
    }
}

impl FromStr for PocketSelection {
    type Err = PocketError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let lower = trimmed.to_lowercase();
        if lower == "all" || lower == "all pockets" {
            return Ok(PocketSelection::All);
        }
        let digits = lower.strip_prefix("pocket").unwrap_or(&lower).trim();
        match digits.parse::<usize>() {
            Ok(number) if number >= 1 => Ok(PocketSelection::Single(number)),
            _ => Err(PocketError::InvalidSelection(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DecodedResponse {
    #[serde(rename = "graspData")]
    pub grasp: Vec<PocketRecord>,
    #[serde(rename = "p2rankData")]
    pub p2rank: Vec<PocketRecord>,
    #[serde(rename = "pdbContent")]
    pub structure_text: String,
    #[serde(rename = "graspPockets")]
    pub grasp_pockets: PocketMap,
    #[serde(rename = "p2rankPockets")]
    pub p2rank_pockets: PocketMap,
    #[serde(skip)]
    pub warnings: Vec<DecodeWarning>,
}

impl DecodedResponse {
    pub fn records(&self, method: Method) -> &[PocketRecord] {
        match method {
            Method::Grasp => &self.grasp,
            Method::P2rank => &self.p2rank,
        }
    }

    pub fn pockets(&self, method: Method) -> &PocketMap {
        match method {
            Method::Grasp => &self.grasp_pockets,
            Method::P2rank => &self.p2rank_pockets,
        }
    }

    pub fn default_method(&self) -> Option<Method> {
        if !self.grasp.is_empty() {
            Some(Method::Grasp)
        } else if !self.p2rank.is_empty() {
            Some(Method::P2rank)
        } else {
            None
        }
    }
}
