#![allow(dead_code)]

use rxn_common::{CompoundSmiles, ReactionSmiles};
use rxn_eval::{ChemistryEngine, EvalError, MatchRecord, MechanismTier};
use rxn_resolve::{LookupError, NameLookup, ResolverChain};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Lookup backed by a name → SMILES table, recording every name it is asked.
pub struct TableLookup {
    pub label: &'static str,
    pub table: HashMap<String, String>,
    pub fail: bool,
    pub asked: Arc<Mutex<Vec<String>>>,
}

#[async_trait::async_trait]
impl NameLookup for TableLookup {
    fn name(&self) -> &str {
        self.label
    }

    async fn lookup(&self, compound: &str) -> Result<Option<CompoundSmiles>, LookupError> {
        self.asked.lock().unwrap().push(compound.to_string());
        if self.fail {
            return Err(LookupError::Status {
                service: self.label.into(),
                status: 500,
            });
        }
        Ok(self
            .table
            .get(compound)
            .map(|s| CompoundSmiles::parse(s).unwrap()))
    }
}

pub fn resolver(entries: &[(&str, &str)]) -> (ResolverChain, Arc<Mutex<Vec<String>>>) {
    let asked = Arc::new(Mutex::new(Vec::new()));
    let lookup = TableLookup {
        label: "table",
        table: entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        fail: false,
        asked: asked.clone(),
    };
    (ResolverChain::with_lookups(vec![Box::new(lookup)]), asked)
}

/// Catalog engine: per reaction SMILES, a formula id and per-tier ids.
/// Reactions listed in `faulty` raise an engine error.
#[derive(Default)]
pub struct CatalogEngine {
    pub formula: HashMap<String, String>,
    pub mechanisms: HashMap<(String, MechanismTier), Vec<String>>,
    pub faulty: Vec<String>,
}

impl CatalogEngine {
    pub fn with_formula(mut self, reaction: &str, id: &str) -> Self {
        self.formula.insert(reaction.into(), id.into());
        self
    }

    pub fn with_tier(mut self, reaction: &str, tier: MechanismTier, ids: &[&str]) -> Self {
        self.mechanisms.insert(
            (reaction.into(), tier),
            ids.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    pub fn with_fault(mut self, reaction: &str) -> Self {
        self.faulty.push(reaction.into());
        self
    }

    pub fn into_arc(self) -> Arc<dyn ChemistryEngine> {
        Arc::new(self)
    }

    fn check(&self, reaction: &ReactionSmiles) -> Result<(), EvalError> {
        if self.faulty.iter().any(|r| r == reaction.as_str()) {
            return Err(EvalError::Engine(format!("cannot parse {reaction}")));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ChemistryEngine for CatalogEngine {
    fn name(&self) -> &str {
        "catalog"
    }

    async fn formula_match(
        &self,
        reaction: &ReactionSmiles,
    ) -> Result<Option<MatchRecord>, EvalError> {
        self.check(reaction)?;
        Ok(self.formula.get(reaction.as_str()).map(MatchRecord::new))
    }

    async fn mechanism_match(
        &self,
        reaction: &ReactionSmiles,
        tier: MechanismTier,
    ) -> Result<Vec<MatchRecord>, EvalError> {
        self.check(reaction)?;
        Ok(self
            .mechanisms
            .get(&(reaction.as_str().to_string(), tier))
            .map(|ids| ids.iter().map(MatchRecord::new).collect())
            .unwrap_or_default())
    }
}

/// Alcohol oxidations known at every tier, plus one formula-only entry.
pub fn oxidation_catalog() -> CatalogEngine {
    CatalogEngine::default()
        .with_formula("CCCO>>CCC=O", "EVODEX.1-F13")
        .with_tier("CCCO>>CCC=O", MechanismTier::Chemical, &["EVODEX.1-C5"])
        .with_tier("CCCO>>CCC=O", MechanismTier::Natural, &["EVODEX.1-N4"])
        .with_tier(
            "CCCO>>CCC=O",
            MechanismTier::Enzymatic,
            &["EVODEX.1-E2", "EVODEX.1-E31"],
        )
        .with_formula("CCO>>CCCC", "EVODEX.1-F99")
}
