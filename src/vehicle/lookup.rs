//! External vehicle name/rating lookup backed by the War Thunder wiki

use std::future::Future;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::error::{Error, Result};

const WIKI_UNIT_URL: &str = "https://wiki.warthunder.com/unit/";
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

static UNIT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<div[^>]*class="[^"]*\bgame-unit_name\b[^"]*"[^>]*>(.*?)</div>"#)
        .expect("unit name pattern")
});
static FIRST_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<h1[^>]*id="firstHeading"[^>]*>(.*?)</h1>"#).expect("heading pattern")
});
static BR_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)class="[^"]*\bgame-unit_br-item\b[^"]*"[^>]*>.*?class="mode"[^>]*>(.*?)</div>.*?class="value"[^>]*>(.*?)</div>"#,
    )
    .expect("br item pattern")
});
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern"));

/// Name and realistic-battle rating found for a vehicle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResult {
    pub display_name: String,
    pub rating: Option<String>,
}

/// Resolves a canonical vehicle id to its official name. Returns `None` on
/// any failure; callers treat the source as unreliable.
pub trait VehicleLookup: Send + Sync {
    fn lookup(&self, canonical_id: &str) -> impl Future<Output = Option<LookupResult>> + Send;
}

pub struct WikiLookup {
    client: reqwest::Client,
    base_url: String,
}

impl WikiLookup {
    pub fn new() -> Result<Self> {
        Self::with_base_url(WIKI_UNIT_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(LOOKUP_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(Error::HttpClient)?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }
}

impl VehicleLookup for WikiLookup {
    async fn lookup(&self, canonical_id: &str) -> Option<LookupResult> {
        let url = format!("{}{}", self.base_url, canonical_id);
        tracing::info!("Looking up vehicle on wiki: {}", url);

        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Wiki request failed for {}: {}", canonical_id, e);
                return None;
            }
        };

        let body = match response.error_for_status() {
            Ok(r) => r.text().await.ok()?,
            Err(e) => {
                tracing::warn!("Wiki returned an error for {}: {}", canonical_id, e);
                return None;
            }
        };

        let result = parse_unit_page(&body);
        if result.is_none() {
            tracing::warn!("No vehicle name found on wiki page for {}", canonical_id);
        }
        result
    }
}

/// Extracts the unit name and RB battle rating from a wiki unit page.
pub fn parse_unit_page(html: &str) -> Option<LookupResult> {
    let display_name = UNIT_NAME
        .captures(html)
        .or_else(|| FIRST_HEADING.captures(html))
        .map(|c| inner_text(&c[1]))
        .filter(|name| !name.is_empty())?;

    let rating = BR_ITEM
        .captures_iter(html)
        .find(|c| inner_text(&c[1]) == "RB")
        .map(|c| inner_text(&c[2]))
        .filter(|br| !br.is_empty());

    Some(LookupResult {
        display_name,
        rating,
    })
}

fn inner_text(fragment: &str) -> String {
    let text = TAG.replace_all(fragment, "");
    text.replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
