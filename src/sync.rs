// ============================================================================
// Module : sync
// ============================================================================
// Le synchronizer des listings : orchestre le cycle fetch-ou-cache à
// chaque tick et maintient l'invariant "liste remplacée en bloc"
//
// CONCEPTS RUST :
// 1. Génériques sur traits : source, cache et sonde injectés (testables)
// 2. AtomicBool + Drop guard : au plus un sync en vol, sans mutex bloquant
// 3. thiserror : enum d'erreurs typées avec messages dérivés
//
// POLITIQUE D'ERREUR : tout se dégrade vers "garder la dernière liste
// connue" ; aucune erreur de sync n'est fatale pour l'appelant.
// ============================================================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use thiserror::Error;
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::api::MarketSource;
use crate::models::ListingSnapshot;
use crate::storage::ListingStore;

/// Cadence du polling : un tick toutes les 20 secondes
pub const SYNC_INTERVAL: Duration = Duration::from_secs(20);

/// Timeout de la sonde de connectivité
const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

// ============================================================================
// Enum : SyncError
// ============================================================================

/// Erreurs du cycle de synchronisation
///
/// CONCEPT RUST : thiserror
/// - #[error(..)] dérive Display
/// - L'appelant matche sur les variants, pas sur des strings
#[derive(Debug, Error)]
pub enum SyncError {
    /// Ni réseau exploitable, ni instantané persisté : rien à afficher
    #[error("aucune donnée disponible (ni réseau, ni cache)")]
    Unavailable,

    /// La récupération réseau a échoué
    #[error("échec de la récupération : {0}")]
    FetchFailed(String),

    /// Le cache persisté n'existe pas encore
    #[error("aucun instantané persisté")]
    CacheMiss,

    /// Le cache persisté existe mais est illisible
    #[error("lecture du cache impossible : {0}")]
    CacheReadError(String),
}

// ============================================================================
// Trait : ConnectivityProbe
// ============================================================================

/// Sonde de connectivité, interrogée une fois par tentative de sync
pub trait ConnectivityProbe {
    /// Un chemin réseau est-il disponible en ce moment ?
    fn is_connected(&self) -> impl std::future::Future<Output = bool> + Send;
}

/// Sonde réelle : une tentative de connexion TCP vers l'hôte de l'API
pub struct TcpProbe {
    /// Adresse "hôte:port" testée
    addr: String,
}

impl TcpProbe {
    /// Construit la sonde depuis l'URL de base de l'API
    pub fn from_base_url(base_url: &str) -> Result<Self> {
        let url = reqwest::Url::parse(base_url).context("URL de base invalide")?;
        let host = url
            .host_str()
            .context("URL de base sans hôte")?
            .to_string();
        let port = url.port_or_known_default().unwrap_or(80);

        Ok(Self {
            addr: format!("{}:{}", host, port),
        })
    }
}

impl ConnectivityProbe for TcpProbe {
    /// CONCEPT RUST : tokio::time::timeout
    /// - Borne la tentative de connexion à PROBE_TIMEOUT
    /// - Timeout ou refus de connexion = hors ligne
    async fn is_connected(&self) -> bool {
        let connected = matches!(
            tokio::time::timeout(PROBE_TIMEOUT, TcpStream::connect(&self.addr)).await,
            Ok(Ok(_))
        );
        debug!(addr = %self.addr, connected, "Connectivity probe");
        connected
    }
}

// ============================================================================
// Structure : Synchronizer
// ============================================================================

/// Orchestrateur du cycle fetch-ou-cache
///
/// CONCEPT RUST : Génériques avec bounds
/// - S : la source distante (HTTP en prod, factice en test)
/// - C : le cache persisté (fichier en prod, mémoire en test)
/// - P : la sonde de connectivité
pub struct Synchronizer<S, C, P> {
    source: S,
    store: C,
    probe: P,

    /// Garde "au plus un sync en vol" pour les ticks
    in_flight: AtomicBool,
}

/// Remet le flag in_flight à false en sortant, même sur erreur
///
/// CONCEPT RUST : Drop guard
/// - La libération est garantie quel que soit le chemin de sortie
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<S, C, P> Synchronizer<S, C, P>
where
    S: MarketSource + Sync,
    C: ListingStore + Sync,
    P: ConnectivityProbe + Sync,
{
    /// Crée un synchronizer
    pub fn new(source: S, store: C, probe: P) -> Self {
        Self {
            source,
            store,
            probe,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Un tick de polling : sync, sauf si un sync est déjà en vol
    ///
    /// CONCEPT : Skip-if-busy, pas queue-and-run-later
    /// - Deux ticks dos à dos = exactement un appel réseau
    /// - Le tick sauté retourne Ok(None) sans toucher ni réseau ni cache
    pub async fn tick(&self) -> Result<Option<ListingSnapshot>, SyncError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Sync already in flight, skipping tick");
            return Ok(None);
        }

        // Le guard libère le flag à la sortie, succès ou erreur
        let _guard = InFlightGuard(&self.in_flight);
        self.sync().await.map(Some)
    }

    /// Un cycle complet : sonde, fetch-ou-cache, persistance
    ///
    /// Contrat :
    /// - hors ligne + cache présent : instantané taggé cache
    /// - en ligne : deux fetches (listings, devises), persiste, tag network
    /// - en ligne mais fetch en échec : fallback cache, sinon Unavailable
    pub async fn sync(&self) -> Result<ListingSnapshot, SyncError> {
        let online = self.probe.is_connected().await;

        if !online {
            info!("Offline, serving persisted snapshot");
            return self.cached_snapshot().map_err(|e| match e {
                // Cold start sans réseau ni cache : le seul vrai "rien"
                SyncError::CacheMiss => SyncError::Unavailable,
                other => other,
            });
        }

        match self.fetch_fresh().await {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                // Erreur réseau jamais fatale : on retombe sur le cache
                warn!(error = %e, "Fetch failed, falling back to persisted snapshot");
                self.cached_snapshot().map_err(|cache_err| match cache_err {
                    SyncError::CacheMiss => SyncError::Unavailable,
                    other => other,
                })
            }
        }
    }

    /// Lit l'instantané persisté (utilisé aussi au démarrage pour
    /// peindre l'écran avant le premier sync réseau)
    pub fn cached_snapshot(&self) -> Result<ListingSnapshot, SyncError> {
        match self.store.load() {
            Ok(Some(items)) => {
                debug!(items = items.len(), "Serving snapshot from cache");
                Ok(ListingSnapshot::from_cache(items))
            }
            Ok(None) => Err(SyncError::CacheMiss),
            Err(e) => Err(SyncError::CacheReadError(e.to_string())),
        }
    }

    /// Les deux fetches réseau, puis la persistance synchrone
    ///
    /// Les deux doivent réussir, sinon le tick entier échoue.
    /// L'échec de persistance se dégrade en warn, l'instantané réseau
    /// reste valide.
    async fn fetch_fresh(&self) -> Result<ListingSnapshot, SyncError> {
        let items = self
            .source
            .fetch_listings()
            .await
            .map_err(|e| SyncError::FetchFailed(e.to_string()))?;

        let currencies = self
            .source
            .fetch_currencies()
            .await
            .map_err(|e| SyncError::FetchFailed(e.to_string()))?;

        // Persistance AVANT de retourner : le cache reflète toujours le
        // dernier instantané réseau complet
        if let Err(e) = self.store.store(&items) {
            warn!(error = %e, "Failed to persist snapshot, continuing with live data");
        }

        info!(items = items.len(), currencies = currencies.len(), "Sync tick succeeded");
        Ok(ListingSnapshot::from_network(items, currencies))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    use super::*;
    use crate::models::{test_item, CurrencyCatalog, MarketItem, SnapshotSource};
    use crate::storage::MemoryStore;

    // ========================================================================
    // Doubles de test
    // ========================================================================

    /// Sonde à réponse fixe
    struct FixedProbe(bool);

    impl ConnectivityProbe for FixedProbe {
        async fn is_connected(&self) -> bool {
            self.0
        }
    }

    /// Source factice : compte ses appels, peut échouer ou ralentir
    struct MockSource {
        /// Listings à retourner (None = panne simulée)
        listings: Option<Vec<MarketItem>>,

        /// Force l'échec du fetch des devises
        fail_currencies: bool,

        /// Délai artificiel avant de répondre (tests de concurrence)
        delay: Option<Duration>,

        /// Nombre d'appels à fetch_listings
        calls: AtomicUsize,
    }

    impl MockSource {
        fn with_listings(items: Vec<MarketItem>) -> Self {
            Self {
                listings: Some(items),
                fail_currencies: false,
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                listings: None,
                fail_currencies: false,
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl MarketSource for MockSource {
        async fn fetch_listings(&self) -> Result<Vec<MarketItem>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match &self.listings {
                Some(items) => Ok(items.clone()),
                None => anyhow::bail!("panne réseau simulée"),
            }
        }

        async fn fetch_currencies(&self) -> Result<CurrencyCatalog> {
            if self.fail_currencies {
                anyhow::bail!("panne catalogue simulée");
            }
            Ok(HashMap::new())
        }
    }

    fn sample_items() -> Vec<MarketItem> {
        vec![test_item(1, "Bitcoin", 5.0), test_item(2, "Ethereum", 3.0)]
    }

    // ========================================================================
    // Contrat sync()
    // ========================================================================

    #[tokio::test]
    async fn test_offline_with_cache_serves_cache_without_remote_call() {
        let cached = sample_items();
        let source = MockSource::with_listings(vec![test_item(9, "Fresh", 1.0)]);
        let sync = Synchronizer::new(
            source,
            MemoryStore::with_items(cached.clone()),
            FixedProbe(false),
        );

        let snapshot = sync.sync().await.unwrap();
        assert_eq!(snapshot.source, SnapshotSource::Cache);
        assert_eq!(snapshot.items, cached);

        // Hors ligne : la source distante n'est jamais appelée
        assert_eq!(sync.source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_offline_without_cache_is_unavailable() {
        let sync = Synchronizer::new(MockSource::failing(), MemoryStore::empty(), FixedProbe(false));

        let err = sync.sync().await.unwrap_err();
        assert!(matches!(err, SyncError::Unavailable));
    }

    #[tokio::test]
    async fn test_offline_with_unreadable_cache() {
        let store = MemoryStore::with_items(sample_items());
        store.fail_reads.store(true, Ordering::SeqCst);
        let sync = Synchronizer::new(MockSource::failing(), store, FixedProbe(false));

        let err = sync.sync().await.unwrap_err();
        assert!(matches!(err, SyncError::CacheReadError(_)));
    }

    #[tokio::test]
    async fn test_online_fetch_overwrites_cache() {
        let fresh = vec![test_item(9, "Fresh", 1.0)];
        let store = MemoryStore::with_items(sample_items());
        let sync = Synchronizer::new(
            MockSource::with_listings(fresh.clone()),
            store,
            FixedProbe(true),
        );

        let snapshot = sync.sync().await.unwrap();
        assert_eq!(snapshot.source, SnapshotSource::Network);
        assert_eq!(snapshot.items, fresh);
        assert!(snapshot.currencies.is_some());

        // Le cache est écrasé par le nouvel instantané avant le retour
        let persisted = sync.store.load().unwrap().unwrap();
        assert_eq!(persisted, fresh);
    }

    #[tokio::test]
    async fn test_online_fetch_failure_falls_back_to_cache() {
        let cached = sample_items();
        let sync = Synchronizer::new(
            MockSource::failing(),
            MemoryStore::with_items(cached.clone()),
            FixedProbe(true),
        );

        let snapshot = sync.sync().await.unwrap();
        assert_eq!(snapshot.source, SnapshotSource::Cache);
        assert_eq!(snapshot.items, cached);
        assert!(snapshot.currencies.is_none());
    }

    #[tokio::test]
    async fn test_online_fetch_failure_without_cache_is_unavailable() {
        let sync = Synchronizer::new(MockSource::failing(), MemoryStore::empty(), FixedProbe(true));

        let err = sync.sync().await.unwrap_err();
        assert!(matches!(err, SyncError::Unavailable));
    }

    #[tokio::test]
    async fn test_currencies_failure_fails_the_tick() {
        // Les deux fetches doivent réussir : une panne catalogue
        // renvoie au fallback cache
        let cached = sample_items();
        let mut source = MockSource::with_listings(vec![test_item(9, "Fresh", 1.0)]);
        source.fail_currencies = true;

        let sync = Synchronizer::new(source, MemoryStore::with_items(cached.clone()), FixedProbe(true));

        let snapshot = sync.sync().await.unwrap();
        assert_eq!(snapshot.source, SnapshotSource::Cache);
        assert_eq!(snapshot.items, cached);
    }

    #[tokio::test]
    async fn test_cached_snapshot_on_empty_store_is_cache_miss() {
        let sync = Synchronizer::new(MockSource::failing(), MemoryStore::empty(), FixedProbe(true));
        let err = sync.cached_snapshot().unwrap_err();
        assert!(matches!(err, SyncError::CacheMiss));
    }

    // ========================================================================
    // Skip-if-busy
    // ========================================================================

    #[tokio::test]
    async fn test_back_to_back_ticks_make_one_remote_call() {
        let mut source = MockSource::with_listings(sample_items());
        source.delay = Some(Duration::from_millis(100));

        let sync = Arc::new(Synchronizer::new(source, MemoryStore::empty(), FixedProbe(true)));

        // Deux ticks concurrents : le second arrive pendant le premier
        let (first, second) = tokio::join!(sync.tick(), sync.tick());

        let first = first.unwrap();
        let second = second.unwrap();

        // Exactement un des deux aboutit, l'autre est sauté
        assert!(first.is_some() != second.is_some());
        assert_eq!(sync.source.call_count(), 1);
    }

    #[tokio::test]
    async fn test_tick_after_completion_runs_again() {
        let sync = Synchronizer::new(
            MockSource::with_listings(sample_items()),
            MemoryStore::empty(),
            FixedProbe(true),
        );

        // Ticks séquentiels : chacun fait son appel réseau
        assert!(sync.tick().await.unwrap().is_some());
        assert!(sync.tick().await.unwrap().is_some());
        assert_eq!(sync.source.call_count(), 2);
    }

    #[tokio::test]
    async fn test_in_flight_flag_released_after_failure() {
        let sync = Synchronizer::new(MockSource::failing(), MemoryStore::empty(), FixedProbe(true));

        // Le premier tick échoue ; le flag doit être relâché quand même
        assert!(sync.tick().await.is_err());
        assert!(sync.tick().await.is_err());
        assert_eq!(sync.source.call_count(), 2);
    }
}
