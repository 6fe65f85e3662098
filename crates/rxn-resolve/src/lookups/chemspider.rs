use super::{endpoint, http_client, NameLookup};
use crate::error::LookupError;
use rxn_common::CompoundSmiles;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const SERVICE: &str = "chemspider";

/// RSC ChemSpider Compounds API (v1).
///
/// A name search is asynchronous on the server side: submit the filter,
/// give it a moment to settle, then read the first record's SMILES.
pub struct ChemSpiderLookup {
    base_url: String,
    api_key: String,
    settle_delay: Duration,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct FilterSubmitted {
    #[serde(rename = "queryId")]
    query_id: Option<String>,
}

#[derive(Deserialize)]
struct FilterResults {
    #[serde(default)]
    results: Vec<u64>,
}

#[derive(Deserialize)]
struct RecordDetails {
    smiles: Option<String>,
}

impl ChemSpiderLookup {
    pub fn new(
        base_url: &str,
        api_key: &str,
        timeout: Duration,
        settle_delay: Duration,
    ) -> Result<Self, LookupError> {
        Ok(Self {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            settle_delay,
            client: http_client(timeout)?,
        })
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, LookupError> {
        let response = request
            .header("apikey", &self.api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| LookupError::http(SERVICE, e))?;

        if !response.status().is_success() {
            return Err(LookupError::Status {
                service: SERVICE.into(),
                status: response.status().as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| LookupError::http(SERVICE, e))?;
        serde_json::from_str(&body).map_err(|e| LookupError::malformed(SERVICE, e.to_string()))
    }
}

#[async_trait::async_trait]
impl NameLookup for ChemSpiderLookup {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn lookup(&self, compound: &str) -> Result<Option<CompoundSmiles>, LookupError> {
        let submit_url = endpoint(SERVICE, &self.base_url, &["compounds", "v1", "filter", "name"])?;
        let submitted: FilterSubmitted = self
            .read_json(self.client.post(submit_url).json(&json!({ "name": compound })))
            .await?;
        let Some(query_id) = submitted.query_id.filter(|q| !q.is_empty()) else {
            return Ok(None);
        };

        tokio::time::sleep(self.settle_delay).await;

        let results_url = endpoint(
            SERVICE,
            &self.base_url,
            &["compounds", "v1", "filter", &query_id, "results"],
        )?;
        let results: FilterResults = self.read_json(self.client.get(results_url)).await?;
        let Some(record_id) = results.results.first() else {
            return Ok(None);
        };

        let mut details_url = endpoint(
            SERVICE,
            &self.base_url,
            &["compounds", "v1", "records", &record_id.to_string(), "details"],
        )?;
        details_url.query_pairs_mut().append_pair("fields", "SMILES");
        let details: RecordDetails = self.read_json(self.client.get(details_url)).await?;

        Ok(details
            .smiles
            .and_then(|raw| CompoundSmiles::parse(&raw).ok()))
    }
}
