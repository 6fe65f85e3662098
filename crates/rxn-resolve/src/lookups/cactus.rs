use super::{endpoint, http_client, NameLookup};
use crate::error::LookupError;
use rxn_common::CompoundSmiles;
use std::time::Duration;

const SERVICE: &str = "cactus";

/// NCI/CADD Chemical Identifier Resolver. Plain-text SMILES on success, an
/// HTML page on failure.
pub struct CactusLookup {
    base_url: String,
    client: reqwest::Client,
}

impl CactusLookup {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LookupError> {
        Ok(Self {
            base_url: base_url.to_string(),
            client: http_client(timeout)?,
        })
    }
}

#[async_trait::async_trait]
impl NameLookup for CactusLookup {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn lookup(&self, compound: &str) -> Result<Option<CompoundSmiles>, LookupError> {
        let url = endpoint(
            SERVICE,
            &self.base_url,
            &["chemical", "structure", compound, "smiles"],
        )?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LookupError::http(SERVICE, e))?;

        if !response.status().is_success() {
            tracing::debug!("cactus answered {} for '{}'", response.status(), compound);
            return Ok(None);
        }

        let body = response
            .text()
            .await
            .map_err(|e| LookupError::http(SERVICE, e))?;
        Ok(parse_smiles_body(&body))
    }
}

/// First non-blank line of the body, unless the body is an error page.
pub(crate) fn parse_smiles_body(body: &str) -> Option<CompoundSmiles> {
    let body = body.trim_start();
    if body.starts_with('<') {
        return None;
    }
    let line = body.lines().map(str::trim).find(|l| !l.is_empty())?;
    CompoundSmiles::parse(line).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_smiles() {
        assert_eq!(parse_smiles_body("CCC=O\n").unwrap().as_str(), "CCC=O");
    }

    #[test]
    fn test_multiple_lines_takes_first() {
        assert_eq!(parse_smiles_body("\nCCO\nOCC\n").unwrap().as_str(), "CCO");
    }

    #[test]
    fn test_html_error_page_is_a_miss() {
        let body = "<h1>Page not found (404)</h1>\n<p>Not found</p>";
        assert!(parse_smiles_body(body).is_none());
    }

    #[test]
    fn test_empty_body_is_a_miss() {
        assert!(parse_smiles_body("   \n").is_none());
    }
}
