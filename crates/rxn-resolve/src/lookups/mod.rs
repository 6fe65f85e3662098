pub mod cactus;
pub mod chemspider;
pub mod pubchem;

use crate::error::LookupError;
use reqwest::Url;
use rxn_common::CompoundSmiles;
use std::time::Duration;

/// One name-to-structure service.
///
/// `Ok(None)` means the service answered but knows no structure for the name.
/// Transport and format problems are `Err`; the chain treats both the same.
#[async_trait::async_trait]
pub trait NameLookup: Send + Sync {
    fn name(&self) -> &str;

    async fn lookup(&self, compound: &str) -> Result<Option<CompoundSmiles>, LookupError>;
}

pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, LookupError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("rxn-resolve/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(LookupError::Client)
}

/// Append path segments to `base`, percent-encoding each one, so compound
/// names with spaces, commas or slashes stay a single segment.
pub(crate) fn endpoint(service: &str, base: &str, segments: &[&str]) -> Result<Url, LookupError> {
    let bad_base = || LookupError::BaseUrl {
        service: service.into(),
        url: base.into(),
    };
    let mut url = Url::parse(base).map_err(|_| bad_base())?;
    url.path_segments_mut()
        .map_err(|_| bad_base())?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_encodes_name_as_one_segment() {
        let url = endpoint(
            "pubchem",
            "https://pubchem.ncbi.nlm.nih.gov/",
            &["rest", "pug", "compound", "name", "2,4-dinitrophenol/x y"],
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://pubchem.ncbi.nlm.nih.gov/rest/pug/compound/name/2,4-dinitrophenol%2Fx%20y"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let url = endpoint("cactus", "http://localhost:8080/proxy", &["chemical"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/proxy/chemical");
    }

    #[test]
    fn test_endpoint_rejects_bad_base() {
        assert!(matches!(
            endpoint("cactus", "not a url", &["x"]),
            Err(LookupError::BaseUrl { .. })
        ));
    }
}
