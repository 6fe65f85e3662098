use crate::engine::ChemistryEngine;
use crate::error::EvalError;
use crate::types::{Level, MatchRecord, MechanismTier};
use rxn_common::ReactionSmiles;
use std::sync::Arc;

/// Outcome of the tier ladder for one reaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub level: Level,
    /// Matches from every tier that passed, in tier order, without repeats.
    pub matches: Vec<MatchRecord>,
    /// Size of the enzymatic tier's match set; zero unless that tier passed.
    pub enzymatic_mechanisms: usize,
}

impl Classification {
    pub fn conclusion(&self) -> String {
        match self.level {
            Level::NoPrecedent => {
                "No precedent at any level: no known reaction shares this formula change.".into()
            }
            Level::FormulaOnly => {
                "Precedent for the formula change only; the mechanism is unprecedented.".into()
            }
            Level::ReactiveGroup => {
                "Precedent for reactive-group similarity only; no natural mechanism matches."
                    .into()
            }
            Level::PartialMechanism => "Partial mechanistic match; the full electronic pattern \
                 of a known enzymatic mechanism is absent."
                .into(),
            Level::FullEnzymatic => format!(
                "Full enzymatic match found: {} enzymatic mechanism(s) matched.",
                self.enzymatic_mechanisms
            ),
            // Resolution levels never come out of the ladder.
            Level::SubstrateUnresolved | Level::ProductUnresolved => String::new(),
        }
    }
}

/// Ladder: formula → chemical → natural → enzymatic. Stops at the first tier
/// without a match; no tier is retried and engine faults propagate.
#[derive(Clone)]
pub struct PlausibilityClassifier {
    engine: Arc<dyn ChemistryEngine>,
}

impl PlausibilityClassifier {
    pub fn new(engine: Arc<dyn ChemistryEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<dyn ChemistryEngine> {
        &self.engine
    }

    pub async fn classify(&self, reaction: &ReactionSmiles) -> Result<Classification, EvalError> {
        let mut matches = Vec::new();

        // Tier 0: formula difference
        let Some(formula) = self.engine.formula_match(reaction).await? else {
            tracing::info!("{}: no formula precedent", reaction);
            return Ok(Classification {
                level: Level::NoPrecedent,
                matches,
                enzymatic_mechanisms: 0,
            });
        };
        matches.push(formula);

        // Tiers 1-3: mechanisms at increasing strictness
        let mut last_tier_count = 0;
        for tier in MechanismTier::LADDER {
            let found = self.engine.mechanism_match(reaction, tier).await?;
            if found.is_empty() {
                tracing::info!("{}: stopped at tier {}", reaction, tier);
                return Ok(Classification {
                    level: tier.level_on_miss(),
                    matches,
                    enzymatic_mechanisms: 0,
                });
            }
            last_tier_count = found.len();
            for record in found {
                if !matches.contains(&record) {
                    matches.push(record);
                }
            }
        }

        Ok(Classification {
            level: Level::FullEnzymatic,
            matches,
            enzymatic_mechanisms: last_tier_count,
        })
    }
}
