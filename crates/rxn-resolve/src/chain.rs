use crate::config::ResolverConfig;
use crate::error::LookupError;
use crate::lookups::cactus::CactusLookup;
use crate::lookups::chemspider::ChemSpiderLookup;
use crate::lookups::pubchem::PubChemLookup;
use crate::lookups::NameLookup;
use rxn_common::CompoundSmiles;
use serde::Serialize;

/// A resolved compound and the service that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub smiles: CompoundSmiles,
    pub source: String,
}

/// Ordered fallback over lookup services: first structure wins.
pub struct ResolverChain {
    lookups: Vec<Box<dyn NameLookup>>,
}

impl ResolverChain {
    /// PubChem, then CACTUS, then ChemSpider (only when an API key is set).
    pub fn from_config(config: &ResolverConfig) -> Result<Self, LookupError> {
        let mut lookups: Vec<Box<dyn NameLookup>> = Vec::new();
        lookups.push(Box::new(PubChemLookup::new(
            &config.pubchem_url,
            config.timeout,
        )?));
        lookups.push(Box::new(CactusLookup::new(
            &config.cactus_url,
            config.timeout,
        )?));

        match &config.chemspider_api_key {
            Some(key) if !key.trim().is_empty() => {
                lookups.push(Box::new(ChemSpiderLookup::new(
                    &config.chemspider_url,
                    key.trim(),
                    config.timeout,
                    config.settle_delay,
                )?));
            }
            _ => tracing::warn!("No ChemSpider API key configured; ChemSpider lookups disabled"),
        }

        Ok(Self::with_lookups(lookups))
    }

    pub fn with_lookups(lookups: Vec<Box<dyn NameLookup>>) -> Self {
        Self { lookups }
    }

    pub fn lookup_names(&self) -> Vec<&str> {
        self.lookups.iter().map(|l| l.name()).collect()
    }

    pub async fn resolve(&self, name: &str) -> Option<CompoundSmiles> {
        self.resolve_with_source(name).await.map(|r| r.smiles)
    }

    /// Try each service in order. Failures are logged and skipped; `None`
    /// only when every service missed.
    pub async fn resolve_with_source(&self, name: &str) -> Option<Resolution> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        for lookup in &self.lookups {
            match lookup.lookup(name).await {
                Ok(Some(smiles)) => {
                    tracing::info!("Resolved '{}' via {}: {}", name, lookup.name(), smiles);
                    return Some(Resolution {
                        smiles,
                        source: lookup.name().to_string(),
                    });
                }
                Ok(None) => {
                    tracing::debug!("{} has no structure for '{}'", lookup.name(), name);
                }
                Err(e) => {
                    tracing::warn!("{} lookup for '{}' failed: {e}", lookup.name(), name);
                }
            }
        }

        tracing::info!("Could not resolve '{}' with any service", name);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    enum Outcome {
        Hit(&'static str),
        Miss,
        Fail,
    }

    struct ScriptedLookup {
        name: &'static str,
        outcome: Outcome,
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait::async_trait]
    impl NameLookup for ScriptedLookup {
        fn name(&self) -> &str {
            self.name
        }

        async fn lookup(&self, _compound: &str) -> Result<Option<CompoundSmiles>, LookupError> {
            self.calls.lock().unwrap().push(self.name);
            match self.outcome {
                Outcome::Hit(s) => Ok(Some(CompoundSmiles::parse(s).unwrap())),
                Outcome::Miss => Ok(None),
                Outcome::Fail => Err(LookupError::Status {
                    service: self.name.into(),
                    status: 503,
                }),
            }
        }
    }

    fn chain(outcomes: Vec<(&'static str, Outcome)>) -> (ResolverChain, Arc<Mutex<Vec<&'static str>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let lookups = outcomes
            .into_iter()
            .map(|(name, outcome)| {
                Box::new(ScriptedLookup {
                    name,
                    outcome,
                    calls: calls.clone(),
                }) as Box<dyn NameLookup>
            })
            .collect();
        (ResolverChain::with_lookups(lookups), calls)
    }

    #[tokio::test]
    async fn test_first_hit_wins_and_stops() {
        let (chain, calls) = chain(vec![
            ("primary", Outcome::Hit("CCO")),
            ("secondary", Outcome::Hit("OCC")),
            ("tertiary", Outcome::Hit("C(O)C")),
        ]);
        let resolved = chain.resolve_with_source("ethanol").await.unwrap();
        assert_eq!(resolved.smiles.as_str(), "CCO");
        assert_eq!(resolved.source, "primary");
        assert_eq!(*calls.lock().unwrap(), vec!["primary"]);
    }

    #[tokio::test]
    async fn test_falls_through_to_tertiary_in_order() {
        let (chain, calls) = chain(vec![
            ("primary", Outcome::Fail),
            ("secondary", Outcome::Miss),
            ("tertiary", Outcome::Hit("CCC=O")),
        ]);
        let resolved = chain.resolve_with_source("propanal").await.unwrap();
        assert_eq!(resolved.source, "tertiary");
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["primary", "secondary", "tertiary"]
        );
    }

    #[tokio::test]
    async fn test_all_miss_is_none_not_error() {
        let (chain, calls) = chain(vec![
            ("primary", Outcome::Fail),
            ("secondary", Outcome::Fail),
            ("tertiary", Outcome::Miss),
        ]);
        assert!(chain.resolve("unobtainium").await.is_none());
        assert_eq!(calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_blank_name_skips_every_service() {
        let (chain, calls) = chain(vec![("primary", Outcome::Hit("CCO"))]);
        assert!(chain.resolve("   ").await.is_none());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_chemspider_needs_a_key() {
        let chain = ResolverChain::from_config(&ResolverConfig::default()).unwrap();
        assert_eq!(chain.lookup_names(), vec!["pubchem", "cactus"]);

        let chain = ResolverChain::from_config(&ResolverConfig {
            chemspider_api_key: Some("key".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(chain.lookup_names(), vec!["pubchem", "cactus", "chemspider"]);
    }
}
