// ============================================================================
// Module : storage
// ============================================================================
// Cache persisté des listings : un unique blob JSON qui survit aux
// redémarrages du process
//
// CONCEPTS RUST :
// 1. Trait comme couture de test : FileStore en prod, MemoryStore en test
// 2. std::fs + anyhow::Context : I/O fichier avec erreurs contextualisées
// 3. dirs : répertoire de données cross-platform
//
// CONTRAT : le blob est lu/écrit en entier sous la clé "marketListings",
// jamais de mise à jour partielle.
// ============================================================================

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::models::MarketItem;

/// Clé du cache : nom du blob persisté
pub const CACHE_KEY: &str = "marketListings";

// ============================================================================
// Trait : ListingStore
// ============================================================================

/// Cache clé-valeur des listings
///
/// CONCEPT RUST : Trait à la couture
/// - Le synchronizer est générique sur ce trait
/// - Les tests injectent un MemoryStore sans toucher au disque
pub trait ListingStore {
    /// Lit le blob persisté
    ///
    /// - Ok(Some(items)) : un instantané existe
    /// - Ok(None) : pas encore de cache (cache miss, pas une erreur)
    /// - Err(..) : cache présent mais illisible
    fn load(&self) -> Result<Option<Vec<MarketItem>>>;

    /// Écrase le blob persisté avec le nouvel instantané
    fn store(&self, items: &[MarketItem]) -> Result<()>;
}

// ============================================================================
// Structure : FileStore
// ============================================================================

/// Cache persisté sur disque : un fichier JSON par clé
///
/// Emplacement :
/// - Linux/WSL : ~/.local/share/lazymarket/marketListings.json
/// - macOS : ~/Library/Application Support/lazymarket/marketListings.json
/// - Windows : C:\Users\<user>\AppData\Local\lazymarket\marketListings.json
pub struct FileStore {
    /// Chemin complet du blob
    path: PathBuf,
}

impl FileStore {
    /// Crée un store pointant sur un chemin explicite (tests, overrides)
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Crée un store dans le répertoire de données de la plateforme
    ///
    /// CONCEPT RUST : Option -> Result avec context
    /// - dirs peut retourner None sur des environnements exotiques
    pub fn in_data_dir() -> Result<Self> {
        let dir = dirs::data_local_dir()
            .context("Impossible de déterminer le répertoire de données")?
            .join("lazymarket");

        fs::create_dir_all(&dir).context("Échec de la création du répertoire du cache")?;

        Ok(Self {
            path: dir.join(format!("{}.json", CACHE_KEY)),
        })
    }
}

impl ListingStore for FileStore {
    fn load(&self) -> Result<Option<Vec<MarketItem>>> {
        // Fichier absent = cache miss, pas une erreur
        if !self.path.exists() {
            debug!(path = ?self.path, "No persisted cache found");
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Échec de la lecture du cache {:?}", self.path))?;

        let items: Vec<MarketItem> =
            serde_json::from_str(&raw).context("Cache persisté illisible (JSON invalide)")?;

        debug!(items = items.len(), "Loaded persisted listings");
        Ok(Some(items))
    }

    fn store(&self, items: &[MarketItem]) -> Result<()> {
        let raw = serde_json::to_string(items).context("Échec de la sérialisation du cache")?;

        fs::write(&self.path, raw)
            .with_context(|| format!("Échec de l'écriture du cache {:?}", self.path))?;

        info!(items = items.len(), path = ?self.path, "Persisted listings snapshot");
        Ok(())
    }
}

// ============================================================================
// Structure : MemoryStore
// ============================================================================

/// Cache en mémoire pour les tests du synchronizer
///
/// CONCEPT RUST : Mutex pour la mutabilité intérieure
/// - Le trait prend &self, le contenu doit pourtant changer
/// - std::sync::Mutex suffit (pas de await en section critique)
#[derive(Default)]
pub struct MemoryStore {
    items: std::sync::Mutex<Option<Vec<MarketItem>>>,

    /// Force l'échec de load() (simulation de cache corrompu)
    pub fail_reads: std::sync::atomic::AtomicBool,
}

impl MemoryStore {
    /// Store vide (cache miss)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Store pré-rempli avec un instantané
    pub fn with_items(items: Vec<MarketItem>) -> Self {
        Self {
            items: std::sync::Mutex::new(Some(items)),
            fail_reads: std::sync::atomic::AtomicBool::new(false),
        }
    }
}

impl ListingStore for MemoryStore {
    fn load(&self) -> Result<Option<Vec<MarketItem>>> {
        if self.fail_reads.load(std::sync::atomic::Ordering::SeqCst) {
            anyhow::bail!("lecture du cache simulée en échec");
        }
        Ok(self.items.lock().unwrap().clone())
    }

    fn store(&self, items: &[MarketItem]) -> Result<()> {
        *self.items.lock().unwrap() = Some(items.to_vec());
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_item;

    /// Chemin temporaire unique par test
    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "lazymarket-test-{}-{}.json",
            name,
            std::process::id()
        ))
    }

    #[test]
    fn test_file_store_roundtrip() {
        let path = temp_path("roundtrip");
        let store = FileStore::new(path.clone());

        let items = vec![test_item(1, "Bitcoin", 5.0), test_item(2, "Ethereum", 3.0)];
        store.store(&items).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, items);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_file_store_overwrites_whole_blob() {
        let path = temp_path("overwrite");
        let store = FileStore::new(path.clone());

        store.store(&[test_item(1, "Bitcoin", 5.0)]).unwrap();
        store.store(&[test_item(2, "Ethereum", 3.0)]).unwrap();

        // Le blob est remplacé en entier, pas fusionné
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].pair_id, 2);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_file_store_missing_file_is_cache_miss() {
        let store = FileStore::new(temp_path("missing-nonexistent"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_file_store_corrupt_blob_is_error() {
        let path = temp_path("corrupt");
        fs::write(&path, "ceci n'est pas du JSON").unwrap();

        let store = FileStore::new(path.clone());
        assert!(store.load().is_err());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::empty();
        assert!(store.load().unwrap().is_none());

        store.store(&[test_item(1, "Bitcoin", 5.0)]).unwrap();
        assert_eq!(store.load().unwrap().unwrap().len(), 1);
    }
}
