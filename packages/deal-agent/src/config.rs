use anyhow::{Context, Result};
use deal_pipeline::{SecretString, SupabaseCredentials};
use dotenvy::dotenv;
use serpapi_client::SerpApiConfig;
use std::env;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

/// Agent configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub serp_api_key: SecretString,
    pub serp: SerpApiConfig,
    /// Absent when neither Supabase key is set
    pub supabase: Option<SupabaseCredentials>,
    /// User id recorded as the poster of staged deals
    pub posted_by: Option<String>,
    pub currency: String,
    pub min_discount: u32,
    pub queries_per_second: NonZeroU32,
}

impl AgentConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through a variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let serp_api_key = var("SERP_API_KEY").context("SERP_API_KEY must be set")?;

        let serp = SerpApiConfig::default()
            .with_locale(
                var("SERP_COUNTRY").unwrap_or_else(|| "tr".to_string()),
                var("SERP_LANGUAGE").unwrap_or_else(|| "tr".to_string()),
                var("SERP_GOOGLE_DOMAIN").unwrap_or_else(|| "google.com.tr".to_string()),
            )
            .with_num_results(parse_or(var("SERP_NUM_RESULTS"), "SERP_NUM_RESULTS", 40)?)
            .with_timeout(Duration::from_secs(parse_or(
                var("SERP_TIMEOUT_SECS"),
                "SERP_TIMEOUT_SECS",
                30,
            )?));

        let supabase = match var("SUPABASE_URL") {
            Some(url) => SupabaseCredentials::from_keys(
                url,
                var("SUPABASE_ANON_KEY"),
                var("SUPABASE_SERVICE_ROLE_KEY"),
            ),
            None => None,
        };

        let queries_per_second: u32 =
            parse_or(var("QUERIES_PER_SECOND"), "QUERIES_PER_SECOND", 1)?;

        Ok(Self {
            serp_api_key: SecretString::new(serp_api_key),
            serp,
            supabase,
            posted_by: var("DEAL_POSTED_BY"),
            currency: var("DEAL_CURRENCY").unwrap_or_else(|| "TRY".to_string()),
            min_discount: parse_or(var("MIN_DISCOUNT"), "MIN_DISCOUNT", 10)?,
            queries_per_second: NonZeroU32::new(queries_per_second)
                .context("QUERIES_PER_SECOND must be positive")?,
        })
    }
}

fn parse_or<T>(value: Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", name)),
        None => Ok(default),
    }
}
