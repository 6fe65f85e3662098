use crate::classifier::PlausibilityClassifier;
use crate::engine::ChemistryEngine;
use crate::error::EvalError;
use crate::types::{BatchEntry, EvaluationVerdict, Level, ReactionPair};
use rxn_common::ReactionSmiles;
use rxn_resolve::ResolverChain;
use std::sync::Arc;

/// Names in, verdict out: resolve substrate, resolve product, classify.
pub struct Evaluator {
    resolver: ResolverChain,
    classifier: PlausibilityClassifier,
}

impl Evaluator {
    pub fn new(resolver: ResolverChain, engine: Arc<dyn ChemistryEngine>) -> Self {
        tracing::info!(
            "Evaluator ready: lookups [{}], chemistry engine '{}'",
            resolver.lookup_names().join(" -> "),
            engine.name()
        );
        Self {
            resolver,
            classifier: PlausibilityClassifier::new(engine),
        }
    }

    pub fn resolver(&self) -> &ResolverChain {
        &self.resolver
    }

    pub fn classifier(&self) -> &PlausibilityClassifier {
        &self.classifier
    }

    pub fn engine_name(&self) -> &str {
        self.classifier.engine().name()
    }

    /// Resolution misses and tier misses come back as a verdict; only
    /// missing names and chemistry faults are errors.
    pub async fn evaluate(
        &self,
        substrate_name: &str,
        product_name: &str,
    ) -> Result<EvaluationVerdict, EvalError> {
        let substrate_name = required("substrate_name", substrate_name)?;
        let product_name = required("product_name", product_name)?;

        let mut verdict = EvaluationVerdict {
            substrate_name: substrate_name.to_string(),
            product_name: product_name.to_string(),
            substrate_smiles: String::new(),
            product_smiles: String::new(),
            matches: Vec::new(),
            level: Level::SubstrateUnresolved,
            conclusion: String::new(),
        };

        let Some(substrate) = self.resolver.resolve(substrate_name).await else {
            verdict.conclusion =
                format!("Substrate not resolved: no structure found for '{substrate_name}'.");
            return Ok(verdict);
        };
        verdict.substrate_smiles = substrate.to_string();

        let Some(product) = self.resolver.resolve(product_name).await else {
            verdict.level = Level::ProductUnresolved;
            verdict.conclusion =
                format!("Product not resolved: no structure found for '{product_name}'.");
            return Ok(verdict);
        };
        verdict.product_smiles = product.to_string();

        let reaction = ReactionSmiles::new(substrate, product);
        tracing::info!(
            "Classifying {} -> {} as {}",
            substrate_name,
            product_name,
            reaction
        );

        let classification = self.classifier.classify(&reaction).await?;
        verdict.conclusion = classification.conclusion();
        verdict.level = classification.level;
        verdict.matches = classification.matches;
        Ok(verdict)
    }

    /// Evaluate pairs one after another, in input order. A fault in one pair
    /// becomes that pair's entry and does not stop the rest.
    pub async fn evaluate_batch(&self, pairs: &[ReactionPair]) -> Vec<BatchEntry> {
        let mut entries = Vec::with_capacity(pairs.len());
        for (i, pair) in pairs.iter().enumerate() {
            match self.evaluate(&pair.substrate_name, &pair.product_name).await {
                Ok(verdict) => entries.push(BatchEntry::Verdict(verdict)),
                Err(e) => {
                    tracing::warn!("Batch item {} failed: {e}", i + 1);
                    entries.push(BatchEntry::Failed {
                        substrate_name: pair.substrate_name.clone(),
                        product_name: pair.product_name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        entries
    }
}

fn required<'a>(param: &str, value: &'a str) -> Result<&'a str, EvalError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EvalError::MissingParameter(param.into()));
    }
    Ok(trimmed)
}
