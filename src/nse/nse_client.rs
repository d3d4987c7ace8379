use super::config;
use super::models::{IndexQuote, IndexSnapshot, OptionChain, OptionData};
use crate::error::{preview, FetchError};
use rand::{seq::SliceRandom, thread_rng};
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::debug;

// -----------------------------------------------
// CLIENT WRAPPER WITH SESSION STATE
// -----------------------------------------------
pub struct NSEClient {
    client: Client,
    base_url: String,
    index: String,
    symbol: String,
    warmed_up: RwLock<bool>,
}

impl NSEClient {
    /// Client for the live NSE site
    pub fn new(index: &str, symbol: &str) -> Result<Self, FetchError> {
        Self::with_base_url(config::NSE_BASE_URL, index, symbol)
    }

    /// Client pointed at another host (mock servers in tests)
    pub fn with_base_url(base_url: &str, index: &str, symbol: &str) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            index: index.to_string(),
            symbol: symbol.to_string(),
            warmed_up: RwLock::new(false),
        })
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Load the home page once so the cookie store has a session
    async fn warmup_if_needed(&self) -> Result<(), FetchError> {
        if *self.warmed_up.read().await {
            return Ok(());
        }

        let mut warmed = self.warmed_up.write().await;
        if !*warmed {
            self.load_page("/").await?;
            *warmed = true;
        }

        Ok(())
    }

    /// GET an HTML page for its cookies; the body is discarded
    async fn load_page(&self, path: &str) -> Result<(), FetchError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Loading page for cookies");

        let _ = self
            .client
            .get(&url)
            .header(header::ACCEPT, config::HEADER_ACCEPT_HTML)
            .send()
            .await?
            .bytes()
            .await?;

        Ok(())
    }

    /// Single GET of a JSON endpoint. No retry: the poll loop tries again
    /// on its next cycle.
    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let res = self
            .client
            .get(url)
            .header(header::REFERER, config::HEADER_REFERER)
            .header("X-Requested-With", config::HEADER_X_REQUESTED_WITH)
            .send()
            .await?;

        let status = res.status();
        debug!(url = %url, status = status.as_u16(), "NSE response");

        let text = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                url: url.to_string(),
                preview: preview(&text),
            });
        }

        // NSE answers blocked sessions with an HTML page and a 200
        let trimmed = text.trim();
        if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
            return Err(FetchError::NonJsonResponse(preview(&text)));
        }

        Ok(serde_json::from_str(trimmed)?)
    }

    // -----------------------------------------------
    // INDEX SNAPSHOT
    // -----------------------------------------------
    pub async fn fetch_index_snapshot(&self) -> Result<IndexSnapshot, FetchError> {
        self.warmup_if_needed().await?;

        let url = config::nse_index_url(&self.base_url, &self.index);
        let quote: IndexQuote = self.fetch_json(&url).await?;
        quote.into_snapshot()
    }

    // -----------------------------------------------
    // OPTION CHAIN
    // -----------------------------------------------

    /// Full chain response, all expiries. The option-chain page is loaded
    /// first on every call; the API rejects sessions without its cookies.
    pub async fn fetch_option_chain(&self) -> Result<OptionChain, FetchError> {
        self.load_page(config::OPTION_CHAIN_PAGE).await?;

        let url = config::nse_option_chain_url(&self.base_url, &self.symbol);
        let chain: OptionChain = self.fetch_json(&url).await?;

        if chain.records.data.is_empty() {
            return Err(FetchError::MissingData("option chain data is empty"));
        }

        debug!(
            symbol = %self.symbol,
            strikes = chain.records.data.len(),
            underlying = ?chain.records.underlying_value,
            "Option chain fetched"
        );

        Ok(chain)
    }

    /// Strikes only
    pub async fn fetch_option_data(&self) -> Result<Vec<OptionData>, FetchError> {
        Ok(self.fetch_option_chain().await?.records.data)
    }
}

// -----------------------------------------------
// HTTP CLIENT BUILDER
// -----------------------------------------------
fn build_client() -> Result<Client, FetchError> {
    let mut headers = header::HeaderMap::new();

    if let Some(lang) = config::ACCEPT_LANGUAGES.choose(&mut thread_rng()) {
        headers.insert(
            header::ACCEPT_LANGUAGE,
            header::HeaderValue::from_static(*lang),
        );
    }
    headers.insert(header::ACCEPT, header::HeaderValue::from_static("*/*"));

    Ok(Client::builder()
        .default_headers(headers)
        .cookie_store(true)
        .gzip(true)
        .user_agent(config::USER_AGENT)
        .timeout(config::HTTP_TIMEOUT)
        .build()?)
}
