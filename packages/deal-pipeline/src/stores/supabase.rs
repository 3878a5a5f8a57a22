//! Supabase (PostgREST) approval store, deal-alert source and
//! popular-keywords source.
//!
//! Deals are written to the `deals` table with status `pending`, so nothing
//! goes live until a moderator approves it. Merchants are resolved against
//! the `stores` table and created on first sight. Active rows of
//! `deal_alerts` seed searches ahead of popular keywords.

use std::collections::HashMap;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::{Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::pipeline::keywords::keywords_from_titles;
use crate::pipeline::price::parse_amount;
use crate::security::SupabaseCredentials;
use crate::traits::{
    alerts::{AlertSource, DealAlert},
    approval::{ApprovalStore, StageOutcome},
    keywords::{KeywordFrequency, KeywordSource},
};
use crate::types::deal::Deal;

/// Longest title written to the `deals` table.
pub const MAX_TITLE_CHARS: usize = 200;

const SLUG_BASE_CHARS: usize = 50;
const SLUG_SUFFIX_CHARS: usize = 8;

lazy_static! {
    static ref NON_SLUG: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}

/// Review status of a staged deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DealStatus {
    Pending,
}

/// Row inserted into the `deals` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DealRow {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub original_price: f64,
    pub discounted_price: f64,
    pub discount_percentage: f64,
    pub currency: String,
    pub affiliate_url: String,
    pub image_url: Option<String>,
    pub store_id: Option<String>,
    pub category_id: Option<String>,
    pub posted_by: Option<String>,
    pub status: DealStatus,
}

impl DealRow {
    /// Build the insert row for a deal. Fails when the deal has no link.
    pub fn from_deal(
        deal: &Deal,
        store_id: Option<String>,
        category_id: Option<String>,
    ) -> StoreResult<Self> {
        let affiliate_url = deal.link.clone().ok_or_else(|| StoreError::MissingLink {
            title: deal.title.clone(),
        })?;

        let title: String = deal.title.chars().take(MAX_TITLE_CHARS).collect();

        Ok(Self {
            slug: unique_slug(&title),
            title,
            description: deal.description(),
            original_price: round_cents(deal.list_price()),
            discounted_price: round_cents(deal.current_price),
            discount_percentage: f64::from(deal.discount_percent),
            currency: deal.currency.clone(),
            affiliate_url,
            image_url: deal.thumbnail.clone(),
            store_id,
            category_id,
            posted_by: None,
            status: DealStatus::Pending,
        })
    }
}

#[derive(Debug, Serialize)]
struct NewStore<'a> {
    name: &'a str,
    slug: String,
    is_active: bool,
}

#[derive(Debug, Deserialize)]
struct IdRow {
    id: String,
}

#[derive(Debug, Deserialize)]
struct TitleRow {
    title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NameRow {
    #[serde(default)]
    name: Option<String>,
}

/// `deal_alerts` row with its category and tag embedded.
#[derive(Debug, Default, Deserialize)]
struct AlertRow {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    max_price: Option<Value>,
    #[serde(default)]
    categories: Option<NameRow>,
    #[serde(default)]
    tags: Option<NameRow>,
}

impl AlertRow {
    fn into_alert(self) -> DealAlert {
        DealAlert {
            name: self.name,
            category: self.categories.and_then(|c| c.name),
            tag: self.tags.and_then(|t| t.name),
            max_price: self
                .max_price
                .as_ref()
                .and_then(parse_amount)
                .filter(|p| *p > 0.0),
        }
    }
}

/// Approval store over the Supabase REST API.
pub struct SupabaseStore {
    client: reqwest::Client,
    credentials: SupabaseCredentials,
    posted_by: Option<String>,
}

impl SupabaseStore {
    pub fn new(credentials: SupabaseCredentials) -> Self {
        Self::with_client(reqwest::Client::new(), credentials)
    }

    pub fn with_client(client: reqwest::Client, credentials: SupabaseCredentials) -> Self {
        Self {
            client,
            credentials,
            posted_by: None,
        }
    }

    /// Attribute staged deals to this user id.
    pub fn with_posted_by(mut self, user_id: impl Into<String>) -> Self {
        self.posted_by = Some(user_id.into());
        self
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let key = self.credentials.key.expose();
        self.client
            .request(method, self.credentials.rest_url(table))
            .header("apikey", key)
            .bearer_auth(key)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> StoreResult<Vec<T>> {
        let resp = self.request(Method::GET, table).query(query).send().await?;
        read_rows(resp).await
    }

    async fn insert<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        body: &B,
    ) -> StoreResult<Vec<T>> {
        let resp = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        read_rows(resp).await
    }

    /// Whether a deal with this affiliate URL is already in the table.
    pub async fn deal_exists(&self, affiliate_url: &str) -> StoreResult<bool> {
        let rows: Vec<IdRow> = self
            .select(
                "deals",
                &[
                    ("select", "id".to_string()),
                    ("affiliate_url", format!("eq.{}", affiliate_url)),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(!rows.is_empty())
    }

    /// Merchant id by name, creating the merchant when missing.
    pub async fn get_or_create_store(&self, name: &str) -> StoreResult<String> {
        let name = name.trim();
        let existing: Vec<IdRow> = self
            .select(
                "stores",
                &[("select", "id".to_string()), ("name", format!("eq.{}", name))],
            )
            .await?;
        if let Some(row) = existing.into_iter().next() {
            return Ok(row.id);
        }

        let created: Vec<IdRow> = self
            .insert(
                "stores",
                &NewStore {
                    name,
                    slug: slugify(name),
                    is_active: true,
                },
            )
            .await?;

        let row = created.into_iter().next().ok_or_else(|| {
            StoreError::UnexpectedResponse(format!("store insert for '{}' returned no row", name))
        })?;
        info!(store = %name, id = %row.id, "Created store");
        Ok(row.id)
    }

    /// Category id by partial, case-insensitive name match.
    pub async fn category_id(&self, name: &str) -> StoreResult<Option<String>> {
        let rows: Vec<IdRow> = self
            .select(
                "categories",
                &[
                    ("select", "id".to_string()),
                    ("name", format!("ilike.*{}*", name.trim())),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next().map(|r| r.id))
    }

    async fn stage_one(&self, deal: &Deal, cache: &mut LookupCache) -> StoreResult<StageOutcome> {
        let link = deal.link.as_deref().ok_or_else(|| StoreError::MissingLink {
            title: deal.title.clone(),
        })?;

        if self.deal_exists(link).await? {
            return Ok(StageOutcome::AlreadyStaged);
        }

        let store_id = match cache.stores.get(&deal.source) {
            Some(id) => id.clone(),
            None => {
                let id = self.get_or_create_store(&deal.source).await?;
                cache.stores.insert(deal.source.clone(), id.clone());
                id
            }
        };

        let category_id = match deal.category.as_deref() {
            None => None,
            Some(name) => match cache.categories.get(name) {
                Some(id) => id.clone(),
                None => {
                    let id = self.category_id(name).await?;
                    cache.categories.insert(name.to_string(), id.clone());
                    id
                }
            },
        };

        let mut row = DealRow::from_deal(deal, Some(store_id), category_id)?;
        row.posted_by = self.posted_by.clone();

        let created: Vec<IdRow> = self.insert("deals", &row).await?;
        let id = created
            .into_iter()
            .next()
            .map(|r| r.id)
            .ok_or_else(|| StoreError::UnexpectedResponse("deal insert returned no row".into()))?;

        debug!(title = %row.title, id = %id, "Inserted pending deal");
        Ok(StageOutcome::Staged { id })
    }
}

/// Merchant and category ids resolved during one `stage` call.
#[derive(Default)]
struct LookupCache {
    stores: HashMap<String, String>,
    categories: HashMap<String, Option<String>>,
}

#[async_trait]
impl ApprovalStore for SupabaseStore {
    async fn stage(&self, deals: &[Deal]) -> Vec<StoreResult<StageOutcome>> {
        let mut cache = LookupCache::default();
        let mut outcomes = Vec::with_capacity(deals.len());

        for deal in deals {
            outcomes.push(self.stage_one(deal, &mut cache).await);
        }

        outcomes
    }
}

#[async_trait]
impl KeywordSource for SupabaseStore {
    async fn popular_keywords(&self, limit: usize) -> StoreResult<Vec<KeywordFrequency>> {
        let rows: Vec<TitleRow> = self
            .select(
                "deals",
                &[
                    ("select", "title".to_string()),
                    ("status", "eq.approved".to_string()),
                    ("order", "click_count.desc,votes_total.desc".to_string()),
                    ("limit", (limit * 2).to_string()),
                ],
            )
            .await?;

        let keywords = keywords_from_titles(rows.into_iter().filter_map(|r| r.title), limit);
        debug!(count = keywords.len(), "Derived popular keywords");
        Ok(keywords)
    }
}

#[async_trait]
impl AlertSource for SupabaseStore {
    async fn active_alerts(&self) -> StoreResult<Vec<DealAlert>> {
        let rows: Vec<AlertRow> = self
            .select(
                "deal_alerts",
                &[
                    ("select", "name,max_price,categories(name),tags(name)".to_string()),
                    ("is_active", "eq.true".to_string()),
                ],
            )
            .await?;

        let alerts: Vec<DealAlert> = rows.into_iter().map(AlertRow::into_alert).collect();
        debug!(count = alerts.len(), "Loaded active deal alerts");
        Ok(alerts)
    }
}

async fn read_rows<T: DeserializeOwned>(resp: Response) -> StoreResult<Vec<T>> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(StoreError::Rejected {
            status: status.as_u16(),
            message: body,
        });
    }

    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| StoreError::UnexpectedResponse(e.to_string()))
}

/// Lowercase ASCII slug with dash separators.
pub fn slugify(text: &str) -> String {
    NON_SLUG
        .replace_all(&text.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// Slug of the first characters of the title plus a random suffix.
pub fn unique_slug(title: &str) -> String {
    let base: String = slugify(title).chars().take(SLUG_BASE_CHARS).collect();
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(SLUG_SUFFIX_CHARS)
        .collect();

    let base = base.trim_end_matches('-');
    if base.is_empty() {
        suffix
    } else {
        format!("{}-{}", base, suffix)
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
