use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

/// Characters that may appear in a SMILES string: atoms, bonds, branches,
/// ring closures, charges, chirality and the dot disconnection.
static SMILES_ALPHABET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9@+\-\[\]()=#$:/\\%.*~]+$").unwrap());

/// Separator between substrate and product in a reaction SMILES.
pub const REACTION_ARROW: &str = ">>";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SmilesError {
    #[error("SMILES string is empty")]
    Empty,

    #[error("Not a SMILES string: {0}")]
    InvalidCharacters(String),

    #[error("Reaction must have the form 'substrate>>product': {0}")]
    MalformedReaction(String),
}

/// A single compound in SMILES line notation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CompoundSmiles(String);

impl CompoundSmiles {
    pub fn parse(raw: &str) -> Result<Self, SmilesError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SmilesError::Empty);
        }
        if !SMILES_ALPHABET.is_match(trimmed) {
            return Err(SmilesError::InvalidCharacters(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompoundSmiles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CompoundSmiles {
    type Error = SmilesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CompoundSmiles> for String {
    fn from(value: CompoundSmiles) -> Self {
        value.0
    }
}

/// A substrate-to-product transformation, rendered as `substrate>>product`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReactionSmiles {
    substrate: CompoundSmiles,
    product: CompoundSmiles,
    joined: String,
}

impl ReactionSmiles {
    pub fn new(substrate: CompoundSmiles, product: CompoundSmiles) -> Self {
        let joined = format!("{substrate}{REACTION_ARROW}{product}");
        Self {
            substrate,
            product,
            joined,
        }
    }

    /// Parse a reaction string. Exactly one `>>` is accepted; agent slots
    /// (`a>b>c`) are not.
    pub fn parse(raw: &str) -> Result<Self, SmilesError> {
        let trimmed = raw.trim();
        let mut sides = trimmed.split(REACTION_ARROW);
        let (Some(left), Some(right), None) = (sides.next(), sides.next(), sides.next()) else {
            return Err(SmilesError::MalformedReaction(trimmed.to_string()));
        };
        if left.contains('>') || right.contains('>') {
            return Err(SmilesError::MalformedReaction(trimmed.to_string()));
        }
        Ok(Self::new(CompoundSmiles::parse(left)?, CompoundSmiles::parse(right)?))
    }

    pub fn substrate(&self) -> &CompoundSmiles {
        &self.substrate
    }

    pub fn product(&self) -> &CompoundSmiles {
        &self.product
    }

    pub fn as_str(&self) -> &str {
        &self.joined
    }
}

impl fmt::Display for ReactionSmiles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined)
    }
}
