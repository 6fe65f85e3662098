use super::{endpoint, http_client, NameLookup};
use crate::error::LookupError;
use reqwest::StatusCode;
use rxn_common::CompoundSmiles;
use serde::Deserialize;
use std::time::Duration;

const SERVICE: &str = "pubchem";

/// PubChem PUG REST, exact name match, first compound's isomeric SMILES.
pub struct PubChemLookup {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct PropertyResponse {
    #[serde(rename = "PropertyTable")]
    property_table: PropertyTable,
}

#[derive(Deserialize)]
struct PropertyTable {
    #[serde(rename = "Properties", default)]
    properties: Vec<CompoundProperties>,
}

#[derive(Deserialize)]
struct CompoundProperties {
    // PubChem renamed IsomericSMILES to SMILES in 2025; older mirrors still
    // send the original column.
    #[serde(rename = "IsomericSMILES", alias = "SMILES", default)]
    isomeric_smiles: Option<String>,
}

impl PubChemLookup {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LookupError> {
        Ok(Self {
            base_url: base_url.to_string(),
            client: http_client(timeout)?,
        })
    }
}

#[async_trait::async_trait]
impl NameLookup for PubChemLookup {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn lookup(&self, compound: &str) -> Result<Option<CompoundSmiles>, LookupError> {
        let url = endpoint(
            SERVICE,
            &self.base_url,
            &[
                "rest",
                "pug",
                "compound",
                "name",
                compound,
                "property",
                "IsomericSMILES",
                "JSON",
            ],
        )?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LookupError::http(SERVICE, e))?;

        // PUG REST answers 404 with a Fault body when the name is unknown.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
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
        parse_property_response(&body)
    }
}

pub(crate) fn parse_property_response(body: &str) -> Result<Option<CompoundSmiles>, LookupError> {
    let parsed: PropertyResponse =
        serde_json::from_str(body).map_err(|e| LookupError::malformed(SERVICE, e.to_string()))?;

    let Some(first) = parsed.property_table.properties.into_iter().next() else {
        return Ok(None);
    };
    match first.isomeric_smiles {
        Some(raw) => CompoundSmiles::parse(&raw)
            .map(Some)
            .map_err(|e| LookupError::malformed(SERVICE, e.to_string())),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_first_compound() {
        let body = r#"{"PropertyTable":{"Properties":[
            {"CID":1031,"IsomericSMILES":"CCCO"},
            {"CID":9999,"IsomericSMILES":"OCCC"}
        ]}}"#;
        let smiles = parse_property_response(body).unwrap().unwrap();
        assert_eq!(smiles.as_str(), "CCCO");
    }

    #[test]
    fn test_parse_renamed_column() {
        let body = r#"{"PropertyTable":{"Properties":[{"CID":527,"SMILES":"CCC=O"}]}}"#;
        let smiles = parse_property_response(body).unwrap().unwrap();
        assert_eq!(smiles.as_str(), "CCC=O");
    }

    #[test]
    fn test_parse_empty_table() {
        let body = r#"{"PropertyTable":{"Properties":[]}}"#;
        assert!(parse_property_response(body).unwrap().is_none());
    }

    #[test]
    fn test_parse_row_without_smiles() {
        let body = r#"{"PropertyTable":{"Properties":[{"CID":527}]}}"#;
        assert!(parse_property_response(body).unwrap().is_none());
    }

    #[test]
    fn test_parse_fault_body_is_malformed() {
        let body = r#"{"Fault":{"Code":"PUGREST.NotFound","Message":"No CID found"}}"#;
        assert!(matches!(
            parse_property_response(body),
            Err(LookupError::Malformed { .. })
        ));
    }
}
