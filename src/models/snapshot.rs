// ============================================================================
// Structure : ListingSnapshot
// ============================================================================
// Résultat d'un tick de synchronisation : la liste complète des marchés,
// son origine (cache local ou réseau) et son horodatage.
//
// CONCEPT : Source tag
// - Cache : lu depuis le blob persisté (offline ou fallback)
// - Network : rafraîchi depuis l'API (et re-persisté au passage)
// ============================================================================

use chrono::{DateTime, Utc};

use crate::models::{CurrencyCatalog, MarketItem};

/// Origine d'un instantané de listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    /// Lu depuis le cache persisté
    Cache,

    /// Récupéré depuis l'API
    Network,
}

impl SnapshotSource {
    /// Libellé court pour les logs et la barre de statut
    pub fn label(&self) -> &'static str {
        match self {
            SnapshotSource::Cache => "cache",
            SnapshotSource::Network => "network",
        }
    }
}

/// Instantané complet produit par un tick de sync
#[derive(Debug, Clone)]
pub struct ListingSnapshot {
    /// Liste canonique des marchés (remplacée en bloc, jamais fusionnée)
    pub items: Vec<MarketItem>,

    /// Origine des données
    pub source: SnapshotSource,

    /// Moment de la production de l'instantané
    pub fetched_at: DateTime<Utc>,

    /// Catalogue des devises : présent uniquement sur source réseau
    /// (le catalogue n'est jamais mis en cache)
    pub currencies: Option<CurrencyCatalog>,
}

impl ListingSnapshot {
    /// Instantané issu du cache persisté
    pub fn from_cache(items: Vec<MarketItem>) -> Self {
        Self {
            items,
            source: SnapshotSource::Cache,
            fetched_at: Utc::now(),
            currencies: None,
        }
    }

    /// Instantané issu du réseau, catalogue inclus
    pub fn from_network(items: Vec<MarketItem>, currencies: CurrencyCatalog) -> Self {
        Self {
            items,
            source: SnapshotSource::Network,
            fetched_at: Utc::now(),
            currencies: Some(currencies),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_labels() {
        assert_eq!(SnapshotSource::Cache.label(), "cache");
        assert_eq!(SnapshotSource::Network.label(), "network");
    }

    #[test]
    fn test_from_cache_has_no_catalog() {
        let snapshot = ListingSnapshot::from_cache(Vec::new());
        assert_eq!(snapshot.source, SnapshotSource::Cache);
        assert!(snapshot.currencies.is_none());
    }
}
