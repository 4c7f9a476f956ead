//! HTTP client for the hosted catalog.
//!
//! Speaks the PostgREST-style row API the catalog backend exposes under
//! `/rest/v1/supplements`: `ilike` containment search, `in.(...)` batch
//! fetches, and embedded `supplement_benefits` rows on single fetches.

use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;

use shared::{CatalogBenefit, CatalogEntry, CatalogHit, NewCatalogEntry};

use super::{CatalogApi, CatalogError, SEARCH_LIMIT};

/// Error code the backend raises for unique-constraint violations.
const UNIQUE_VIOLATION_CODE: &str = "23505";

/// Catalog client over HTTP.
pub struct CatalogClient {
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HitRow {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RatingRow {
    id: String,
    evidence_score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct BenefitRow {
    id: String,
    label: String,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EntryRow {
    id: String,
    name: String,
    what_is_it: Option<String>,
    why_use_it: Option<String>,
    risks_and_interactions: Option<String>,
    evidence: Option<String>,
    evidence_score: Option<f64>,
    #[serde(default)]
    supplement_benefits: Vec<BenefitRow>,
}

/// Error document PostgREST returns on failed requests.
#[derive(Debug, Deserialize)]
struct ErrorRow {
    code: Option<String>,
}

impl CatalogClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn rows_url(&self) -> String {
        format!("{}/rest/v1/supplements", self.base_url)
    }

    fn with_auth(&self, mut request: ureq::Request) -> ureq::Request {
        if let Some(api_key) = &self.api_key {
            request = request
                .set("apikey", api_key)
                .set("Authorization", &format!("Bearer {}", api_key));
        }
        request
    }

    fn get_rows<T: serde::de::DeserializeOwned>(
        &self,
        queries: &[(&str, &str)],
    ) -> Result<Vec<T>, CatalogError> {
        let mut request = self.with_auth(ureq::get(&self.rows_url()));
        for (param, value) in queries {
            request = request.query(param, value);
        }

        let response = request.call().map_err(map_ureq_error)?;
        response
            .into_json::<Vec<T>>()
            .map_err(|e| CatalogError::Decode(e.to_string()))
    }
}

fn map_ureq_error(error: ureq::Error) -> CatalogError {
    match error {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            if let Ok(row) = serde_json::from_str::<ErrorRow>(&body) {
                if row.code.as_deref() == Some(UNIQUE_VIOLATION_CODE) {
                    return CatalogError::DuplicateName;
                }
            }
            CatalogError::Api(status)
        }
        ureq::Error::Transport(transport) => CatalogError::Network(transport.to_string()),
    }
}

impl CatalogApi for CatalogClient {
    fn search(&self, query: &str) -> Result<Vec<CatalogHit>, CatalogError> {
        let limit = SEARCH_LIMIT.to_string();
        let rows: Vec<HitRow> = self.get_rows(&[
            ("select", "id,name"),
            ("name", &format!("ilike.*{}*", query)),
            ("order", "name.asc"),
            ("limit", &limit),
        ])?;

        Ok(rows
            .into_iter()
            .map(|row| CatalogHit {
                id: row.id,
                name: row.name,
            })
            .collect())
    }

    fn ratings_for(&self, ids: &[String]) -> Result<HashMap<String, f64>, CatalogError> {
        let rows: Vec<RatingRow> = self.get_rows(&[
            ("select", "id,evidence_score"),
            ("id", &format!("in.({})", ids.join(","))),
        ])?;

        Ok(rows
            .into_iter()
            .filter_map(|row| row.evidence_score.map(|score| (row.id, score)))
            .collect())
    }

    fn fetch_by_id(&self, id: &str) -> Result<Option<CatalogEntry>, CatalogError> {
        let rows: Vec<EntryRow> = self.get_rows(&[
            (
                "select",
                "id,name,what_is_it,why_use_it,risks_and_interactions,evidence,evidence_score,supplement_benefits(id,label,icon)",
            ),
            ("id", &format!("eq.{}", id)),
            ("limit", "1"),
        ])?;

        Ok(rows.into_iter().next().map(|row| CatalogEntry {
            id: row.id,
            name: row.name,
            what_is_it: row.what_is_it,
            why_use_it: row.why_use_it,
            risks_and_interactions: row.risks_and_interactions,
            evidence: row.evidence,
            evidence_score: row.evidence_score,
            benefits: row
                .supplement_benefits
                .into_iter()
                .map(|b| CatalogBenefit {
                    id: b.id,
                    label: b.label,
                    icon: b.icon,
                })
                .collect(),
        }))
    }

    fn insert_new(&self, entry: &NewCatalogEntry) -> Result<CatalogHit, CatalogError> {
        let request = self
            .with_auth(ureq::post(&self.rows_url()))
            .set("Prefer", "return=representation");

        let response = request
            .send_json(json!({
                "name": entry.name.trim(),
                "what_is_it": entry.what_is_it.trim(),
                "why_use_it": entry.why_use_it.trim(),
                "risks_and_interactions": entry.risks_and_interactions.trim(),
                "evidence": entry.evidence.trim(),
                "evidence_score": entry.evidence_score,
            }))
            .map_err(map_ureq_error)?;

        let mut rows: Vec<HitRow> = response
            .into_json()
            .map_err(|e| CatalogError::Decode(e.to_string()))?;
        let row = rows
            .pop()
            .ok_or_else(|| CatalogError::Decode("insert returned no row".to_string()))?;
        Ok(CatalogHit {
            id: row.id,
            name: row.name,
        })
    }
}
