use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// One precedent pattern found in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchRecord {
    pub match_id: String,
}

impl MatchRecord {
    pub fn new(match_id: impl Into<String>) -> Self {
        Self {
            match_id: match_id.into(),
        }
    }
}

/// Mechanism granularity, from loosest to strictest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MechanismTier {
    #[serde(rename = "C")]
    Chemical,
    #[serde(rename = "N")]
    Natural,
    #[default]
    #[serde(rename = "E")]
    Enzymatic,
}

impl MechanismTier {
    /// Classification order after the formula tier.
    pub const LADDER: [MechanismTier; 3] = [Self::Chemical, Self::Natural, Self::Enzymatic];

    /// Dataset code understood by the chemistry package.
    pub fn code(self) -> &'static str {
        match self {
            Self::Chemical => "C",
            Self::Natural => "N",
            Self::Enzymatic => "E",
        }
    }

    /// Stage reported when this tier is the first to miss.
    pub(crate) fn level_on_miss(self) -> Level {
        match self {
            Self::Chemical => Level::FormulaOnly,
            Self::Natural => Level::ReactiveGroup,
            Self::Enzymatic => Level::PartialMechanism,
        }
    }
}

impl fmt::Display for MechanismTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for MechanismTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "C" => Ok(Self::Chemical),
            "N" => Ok(Self::Natural),
            "E" => Ok(Self::Enzymatic),
            other => Err(format!("Unknown operator type '{other}' (expected E, C or N)")),
        }
    }
}

/// How far an evaluation got before stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    SubstrateUnresolved,
    ProductUnresolved,
    NoPrecedent,
    FormulaOnly,
    ReactiveGroup,
    PartialMechanism,
    FullEnzymatic,
}

/// Result of `evaluate_reaction`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationVerdict {
    pub substrate_name: String,
    pub product_name: String,
    /// Empty when the substrate did not resolve.
    pub substrate_smiles: String,
    /// Empty when the product did not resolve or was never looked up.
    pub product_smiles: String,
    pub matches: Vec<MatchRecord>,
    pub level: Level,
    pub conclusion: String,
}

/// One substrate/product pair in a batch request.
///
/// A missing, null or non-string name reads as blank, so the evaluator
/// rejects that one pair instead of the whole request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReactionPair {
    #[serde(default, deserialize_with = "name_or_blank")]
    pub substrate_name: String,
    #[serde(default, deserialize_with = "name_or_blank")]
    pub product_name: String,
}

impl ReactionPair {
    /// Lenient conversion of one batch item; anything but an object is a
    /// pair of blank names.
    pub fn from_item(item: serde_json::Value) -> Self {
        serde_json::from_value(item).unwrap_or_default()
    }
}

fn name_or_blank<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        _ => String::new(),
    })
}

/// A batch slot: the verdict, or the fault that stopped this one pair.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BatchEntry {
    Verdict(EvaluationVerdict),
    Failed {
        substrate_name: String,
        product_name: String,
        error: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        };
        f.write_str(label)
    }
}

/// Single-tier check of a reaction SMILES: formula match plus one operator set.
#[derive(Debug, Clone, Serialize)]
pub struct ReactionAssessment {
    pub reaction: String,
    pub operator_type: MechanismTier,
    pub formula_id: Option<String>,
    pub matched_operators: Vec<String>,
    pub is_plausible: bool,
    pub confidence: Confidence,
}
