use std::fmt;
use std::time::Duration;

pub const PUBCHEM_BASE_URL: &str = "https://pubchem.ncbi.nlm.nih.gov";
pub const CACTUS_BASE_URL: &str = "https://cactus.nci.nih.gov";
pub const CHEMSPIDER_BASE_URL: &str = "https://api.rsc.org";

/// Endpoints, credentials and timing for the three lookup services.
#[derive(Clone)]
pub struct ResolverConfig {
    pub pubchem_url: String,
    pub cactus_url: String,
    pub chemspider_url: String,
    /// ChemSpider is skipped entirely when no key is configured.
    pub chemspider_api_key: Option<String>,
    /// Per-request timeout for every lookup service.
    pub timeout: Duration,
    /// Pause between submitting a ChemSpider query and fetching its results.
    pub settle_delay: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            pubchem_url: PUBCHEM_BASE_URL.into(),
            cactus_url: CACTUS_BASE_URL.into(),
            chemspider_url: CHEMSPIDER_BASE_URL.into(),
            chemspider_api_key: None,
            timeout: Duration::from_secs(10),
            settle_delay: Duration::from_secs(1),
        }
    }
}

impl fmt::Debug for ResolverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverConfig")
            .field("pubchem_url", &self.pubchem_url)
            .field("cactus_url", &self.cactus_url)
            .field("chemspider_url", &self.chemspider_url)
            .field(
                "chemspider_api_key",
                &self.chemspider_api_key.as_ref().map(|_| "<REDACTED>"),
            )
            .field("timeout", &self.timeout)
            .field("settle_delay", &self.settle_delay)
            .finish()
    }
}
