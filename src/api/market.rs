// ============================================================================
// API Client : Market listings
// ============================================================================
// Récupère les listings de marchés et le catalogue des devises depuis
// l'endpoint REST
//
// CONCEPTS RUST AVANCÉS :
// 1. async fn dans un trait : couture pour injecter une source factice
// 2. Result<T, E> : gestion d'erreurs avec contexte
// 3. Serde : désérialisation JSON automatique des enveloppes {data: ...}
// ============================================================================

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

use crate::models::{CurrencyCatalog, MarketItem};

/// URL de base par défaut de l'API (surchargée par LAZYMARKET_API_URL)
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:9000/";

/// Variable d'environnement pour surcharger l'URL de base
pub const API_URL_ENV: &str = "LAZYMARKET_API_URL";

/// Timeout des requêtes HTTP
///
/// 10 secondes laissent passer un backend lent sans bloquer un tick
/// de sync jusqu'à l'intervalle suivant.
pub const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

// ============================================================================
// Structures pour parser les réponses JSON de l'API
// ============================================================================
// L'API enveloppe tout dans {"data": ...} : on définit des structures qui
// matchent exactement pour que serde désérialise automatiquement
// ============================================================================

/// Enveloppe de la réponse listings
#[derive(Debug, Deserialize)]
struct ListingsResponse {
    data: Vec<MarketItem>,
}

/// Enveloppe de la réponse currencies
#[derive(Debug, Deserialize)]
struct CurrenciesResponse {
    data: CurrencyCatalog,
}

// ============================================================================
// Trait : MarketSource
// ============================================================================

/// Source distante des listings et du catalogue
///
/// CONCEPT RUST : async fn in trait (stable depuis Rust 1.75)
/// - Le synchronizer est générique sur cette couture
/// - Les tests injectent une source factice qui compte ses appels
pub trait MarketSource {
    /// Récupère la liste complète des marchés
    fn fetch_listings(&self) -> impl std::future::Future<Output = Result<Vec<MarketItem>>> + Send;

    /// Récupère le catalogue des devises
    fn fetch_currencies(&self) -> impl std::future::Future<Output = Result<CurrencyCatalog>> + Send;
}

// ============================================================================
// Structure : HttpMarketSource
// ============================================================================

/// Source HTTP réelle, construite sur reqwest
pub struct HttpMarketSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMarketSource {
    /// Crée la source avec l'URL de base donnée
    ///
    /// CONCEPT RUST : Builder pattern (reqwest::Client::builder)
    /// - User-Agent explicite pour éviter les blocages
    /// - Timeout global sur toutes les requêtes du client
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("lazymarket/0.1")
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Échec de la création du client HTTP")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Crée la source depuis l'environnement (ou l'URL par défaut)
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        info!(base_url = %base_url, "Market API source configured");
        Self::new(base_url)
    }

    /// Hôte et port de l'API (utilisé par la sonde de connectivité)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exécute un GET et vérifie le statut HTTP
    async fn get(&self, endpoint: &str) -> Result<reqwest::Response> {
        let url = build_url(&self.base_url, endpoint);
        debug!(url = %url, "Sending HTTP request");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Échec de la requête HTTP vers {}", url))?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        if !status.is_success() {
            error!(status = %status, url = %url, "API returned error status");
            anyhow::bail!("L'API a retourné une erreur : HTTP {}", status);
        }

        Ok(response)
    }
}

impl MarketSource for HttpMarketSource {
    /// GET {base}/Market%20listings.json -> {"data": [MarketItem...]}
    ///
    /// CONCEPT RUST : #[instrument]
    /// - Macro tracing qui ajoute automatiquement un span
    /// - Tous les logs à l'intérieur auront le contexte de la source
    #[instrument(skip(self))]
    async fn fetch_listings(&self) -> Result<Vec<MarketItem>> {
        let response: ListingsResponse = self
            .get("Market%20listings.json")
            .await?
            .json()
            .await
            .context("Échec du parsing JSON des listings")?;

        info!(items = response.data.len(), "Fetched market listings");
        Ok(response.data)
    }

    /// GET {base}/currencies.json -> {"data": {code: CurrencyInfo}}
    #[instrument(skip(self))]
    async fn fetch_currencies(&self) -> Result<CurrencyCatalog> {
        let response: CurrenciesResponse = self
            .get("currencies.json")
            .await?
            .json()
            .await
            .context("Échec du parsing JSON du catalogue")?;

        info!(currencies = response.data.len(), "Fetched currency catalog");
        Ok(response.data)
    }
}

/// Joint l'URL de base et l'endpoint sans doubler le slash
fn build_url(base: &str, endpoint: &str) -> String {
    if base.ends_with('/') {
        format!("{}{}", base, endpoint)
    } else {
        format!("{}/{}", base, endpoint)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url() {
        assert_eq!(
            build_url("http://127.0.0.1:9000/", "currencies.json"),
            "http://127.0.0.1:9000/currencies.json"
        );
        assert_eq!(
            build_url("http://127.0.0.1:9000", "Market%20listings.json"),
            "http://127.0.0.1:9000/Market%20listings.json"
        );
    }

    #[test]
    fn test_listings_envelope_parsing() {
        let json = r#"{"data": [{
            "pair_id": 2,
            "name": {"en": "Bitcoin", "fa": "بیت کوین"},
            "base_currency_symbol": {"en": "btc", "fa": "بیت کوین"},
            "quote_currency_symbol": {"en": "irr", "fa": "ریال"},
            "sell": 61423500.0,
            "buy": 61400000.0,
            "base_precision": 0,
            "amount_step": 0.000001,
            "logo": ""
        }]}"#;

        let response: ListingsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.data.len(), 1);
        assert_eq!(response.data[0].pair_id, 2);
    }

    // Test avec un vrai backend local (skippé si rien n'écoute)
    // CONCEPT RUST : #[tokio::test]
    // - Macro qui setup un runtime tokio pour le test
    // - Permet d'utiliser .await dans les tests
    #[tokio::test]
    async fn test_fetch_listings_live() {
        let source = HttpMarketSource::new(DEFAULT_API_URL).unwrap();

        match source.fetch_listings().await {
            Ok(items) => {
                println!("✓ Récupéré {} listings", items.len());
            }
            Err(e) => {
                println!("⚠ Test skippé (pas de backend local?) : {}", e);
            }
        }
    }
}
