//! Store backed by a Firestore collection, spoken to over the REST v1 API.
//!
//! Each subscription is one document in the configured collection. The
//! document id is the subscription id; fields keep the record names
//! (`name`, `cost`, `billing`, `category`, `nextPayment`).

use super::util::send_with_retry;
use crate::core::config::RemoteStoreConfig;
use crate::core::store::{StoreError, StoreResult, SubscriptionStore, check_draft};
use crate::core::subscription::{Subscription, SubscriptionDraft, SubscriptionId};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, error};

const PAGE_SIZE: &str = "300";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    string_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    double_value: Option<f64>,
    // Firestore encodes 64-bit integers as JSON strings
    #[serde(skip_serializing_if = "Option::is_none")]
    integer_value: Option<String>,
}

impl FieldValue {
    fn string(value: impl Into<String>) -> Self {
        Self {
            string_value: Some(value.into()),
            ..Default::default()
        }
    }

    fn double(value: f64) -> Self {
        Self {
            double_value: Some(value),
            ..Default::default()
        }
    }

    fn as_f64(&self) -> Option<f64> {
        self.double_value
            .or_else(|| self.integer_value.as_deref().and_then(|v| v.parse().ok()))
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    fields: BTreeMap<String, FieldValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<Document>,
    next_page_token: Option<String>,
}

impl Document {
    fn from_draft(draft: &SubscriptionDraft) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), FieldValue::string(&draft.name));
        fields.insert("cost".to_string(), FieldValue::double(draft.cost));
        fields.insert("billing".to_string(), FieldValue::string(draft.billing.as_str()));
        fields.insert("category".to_string(), FieldValue::string(&draft.category));
        fields.insert(
            "nextPayment".to_string(),
            FieldValue::string(draft.next_payment.format("%Y-%m-%d").to_string()),
        );
        Self { name: None, fields }
    }

    /// Last segment of the resource name, e.g. `.../documents/subscriptions/{id}`.
    fn id(&self) -> Option<SubscriptionId> {
        self.name
            .as_deref()
            .and_then(|name| name.rsplit('/').next())
            .filter(|id| !id.is_empty())
            .map(SubscriptionId::from)
    }

    fn string_field(&self, key: &str) -> StoreResult<&str> {
        self.fields
            .get(key)
            .and_then(|v| v.string_value.as_deref())
            .ok_or_else(|| self.malformed(key))
    }

    fn malformed(&self, key: &str) -> StoreError {
        StoreError::Unavailable(format!(
            "Malformed document {}: missing or invalid field '{key}'",
            self.name.as_deref().unwrap_or("<unnamed>")
        ))
    }

    fn into_subscription(self) -> StoreResult<Subscription> {
        let id = self.id().ok_or_else(|| self.malformed("name"))?;
        let cost = self
            .fields
            .get("cost")
            .and_then(FieldValue::as_f64)
            .ok_or_else(|| self.malformed("cost"))?;
        let next_payment = NaiveDate::parse_from_str(self.string_field("nextPayment")?, "%Y-%m-%d")
            .map_err(|_| self.malformed("nextPayment"))?;

        Ok(Subscription {
            id,
            name: self.string_field("name")?.to_string(),
            cost,
            billing: self.string_field("billing")?.into(),
            category: self.string_field("category")?.to_string(),
            next_payment,
        })
    }
}

pub struct RemoteStore {
    client: Client,
    collection_url: String,
    api_key: Option<String>,
    retries: usize,
    retry_delay_ms: u64,
}

impl RemoteStore {
    pub fn new(config: &RemoteStoreConfig) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(StoreError::unavailable)?;
        let collection_url = format!(
            "{}/projects/{}/databases/(default)/documents/{}",
            config.base_url.trim_end_matches('/'),
            config.project_id,
            config.collection
        );
        Ok(Self {
            client,
            collection_url,
            api_key: config.api_key.clone(),
            retries: config.retries,
            retry_delay_ms: config.retry_delay_ms,
        })
    }

    fn url(&self, id: Option<&SubscriptionId>, query: &[(&str, &str)]) -> StoreResult<Url> {
        let mut url = Url::parse(&self.collection_url)
            .map_err(|e| StoreError::Unavailable(format!("Invalid store URL: {e}")))?;
        if let Some(id) = id {
            url.path_segments_mut()
                .map_err(|_| StoreError::Unavailable("Store URL cannot have a path".into()))?
                .push(id.as_str());
        }
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
            if let Some(api_key) = &self.api_key {
                pairs.append_pair("key", api_key);
            }
        }
        // query_pairs_mut leaves a dangling "?" when nothing was appended
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }

    async fn list_page(&self, page_token: Option<&str>) -> StoreResult<ListResponse> {
        let mut query = vec![("pageSize", PAGE_SIZE)];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }
        let url = self.url(None, &query)?;

        let response = send_with_retry(
            || self.client.get(url.clone()),
            self.retries,
            self.retry_delay_ms,
        )
        .await
        .map_err(StoreError::unavailable)?;
        let response = check_status(response, None).await?;

        let body = response.text().await.map_err(StoreError::unavailable)?;
        serde_json::from_str(&body).map_err(|e| {
            error!(error = ?e, response = %body, "Failed to parse list response");
            StoreError::Unavailable(format!("Failed to parse list response: {e}"))
        })
    }
}

async fn check_status(response: Response, id: Option<&SubscriptionId>) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    debug!(%status, %body, "Store request failed");
    match (status, id) {
        (StatusCode::NOT_FOUND, Some(id)) => Err(StoreError::NotFound(id.clone())),
        (StatusCode::BAD_REQUEST, _) => Err(StoreError::ValidationRejected(body)),
        _ => Err(StoreError::Unavailable(format!("{status}: {body}"))),
    }
}

#[async_trait]
impl SubscriptionStore for RemoteStore {
    async fn list_all(&self) -> StoreResult<Vec<Subscription>> {
        let mut subscriptions = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let page = self.list_page(page_token.as_deref()).await?;
            for document in page.documents {
                subscriptions.push(document.into_subscription()?);
            }
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        debug!("Remote LIST returned {} records", subscriptions.len());
        Ok(subscriptions)
    }

    async fn create(&self, draft: &SubscriptionDraft) -> StoreResult<SubscriptionId> {
        check_draft(draft)?;
        let url = self.url(None, &[])?;
        let response = self
            .client
            .post(url)
            .json(&Document::from_draft(draft))
            .send()
            .await
            .map_err(StoreError::unavailable)?;
        let created: Document = check_status(response, None)
            .await?
            .json()
            .await
            .map_err(StoreError::unavailable)?;

        let id = created
            .id()
            .ok_or_else(|| StoreError::Unavailable("Created document has no name".into()))?;
        debug!("Remote CREATE for id: {}", id);
        Ok(id)
    }

    async fn update(&self, id: &SubscriptionId, draft: &SubscriptionDraft) -> StoreResult<()> {
        check_draft(draft)?;
        let url = self.url(Some(id), &[("currentDocument.exists", "true")])?;
        let document = Document::from_draft(draft);
        let response = send_with_retry(
            || self.client.patch(url.clone()).json(&document),
            self.retries,
            self.retry_delay_ms,
        )
        .await
        .map_err(StoreError::unavailable)?;
        check_status(response, Some(id)).await?;
        debug!("Remote UPDATE for id: {}", id);
        Ok(())
    }

    async fn delete(&self, id: &SubscriptionId) -> StoreResult<()> {
        let url = self.url(Some(id), &[("currentDocument.exists", "true")])?;
        let response = send_with_retry(
            || self.client.delete(url.clone()),
            self.retries,
            self.retry_delay_ms,
        )
        .await
        .map_err(StoreError::unavailable)?;
        check_status(response, Some(id)).await?;
        debug!("Remote DELETE for id: {}", id);
        Ok(())
    }
}
