// ============================================================================
// Slice d'état : SyncState
// ============================================================================
// État de synchronisation : liste canonique, catalogue, horodatage
//
// INVARIANT : la liste canonique est toujours remplacée en bloc quand un
// instantané arrive, jamais fusionnée champ par champ. Une erreur de sync
// laisse la liste précédente intacte (pas de flash-to-empty).
// ============================================================================

use chrono::{DateTime, Utc};
use tracing::info;

use crate::models::{CurrencyCatalog, ListingSnapshot, MarketItem, SnapshotSource};

/// État de synchronisation
#[derive(Debug, Clone, Default)]
pub struct SyncState {
    /// Liste canonique des marchés (vide avant le premier sync)
    pub canonical: Vec<MarketItem>,

    /// Catalogue des devises (uniquement après un sync réseau réussi)
    pub currencies: Option<CurrencyCatalog>,

    /// Horodatage du dernier instantané appliqué
    pub last_fetch: Option<DateTime<Utc>>,

    /// Origine du dernier instantané
    pub last_source: Option<SnapshotSource>,

    /// Le dernier tick a-t-il vu du réseau ?
    pub is_online: bool,

    /// Un sync a-t-il déjà réussi ? (distingue "jamais chargé" de "vide")
    pub has_loaded: bool,
}

/// Transitions de l'état de sync
#[derive(Debug, Clone)]
pub enum SyncAction {
    /// Un instantané complet arrive : remplace la liste canonique en bloc
    SnapshotApplied(ListingSnapshot),

    /// Le tick a échoué : conserver la liste précédente telle quelle
    SyncFailed(String),
}

impl SyncState {
    /// Applique une transition
    pub fn reduce(&mut self, action: SyncAction) {
        match action {
            SyncAction::SnapshotApplied(snapshot) => {
                info!(
                    items = snapshot.items.len(),
                    source = snapshot.source.label(),
                    "Applying listing snapshot"
                );

                // Remplacement en bloc, jamais de merge partiel
                self.canonical = snapshot.items;
                self.last_fetch = Some(snapshot.fetched_at);
                self.last_source = Some(snapshot.source);
                self.is_online = snapshot.source == SnapshotSource::Network;
                self.has_loaded = true;

                // Le catalogue n'arrive qu'avec un instantané réseau ;
                // un instantané cache garde le catalogue précédent
                if let Some(currencies) = snapshot.currencies {
                    self.currencies = Some(currencies);
                }
            }

            SyncAction::SyncFailed(reason) => {
                // Dégradation silencieuse : la liste précédente reste visible
                info!(reason = %reason, "Sync failed, keeping last known list");
                self.is_online = false;
            }
        }
    }

    /// Vrai cold start : rien n'a jamais été chargé
    ///
    /// C'est le seul cas où l'UI affiche le placeholder "no data"
    pub fn is_cold(&self) -> bool {
        !self.has_loaded
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_item;

    #[test]
    fn test_snapshot_replaces_canonical_wholesale() {
        let mut state = SyncState::default();

        state.reduce(SyncAction::SnapshotApplied(ListingSnapshot::from_network(
            vec![test_item(1, "Bitcoin", 5.0)],
            Default::default(),
        )));
        assert_eq!(state.canonical.len(), 1);
        assert!(state.is_online);
        assert!(state.has_loaded);

        // Le second instantané remplace tout, il ne fusionne pas
        state.reduce(SyncAction::SnapshotApplied(ListingSnapshot::from_network(
            vec![test_item(2, "Ethereum", 3.0), test_item(3, "Tether", 1.0)],
            Default::default(),
        )));
        assert_eq!(state.canonical.len(), 2);
        assert!(state.canonical.iter().all(|i| i.pair_id != 1));
    }

    #[test]
    fn test_cache_snapshot_keeps_previous_catalog() {
        let mut state = SyncState::default();

        let mut catalog = CurrencyCatalog::default();
        catalog.insert(
            "btc".to_string(),
            crate::models::CurrencyInfo {
                name: crate::models::LocalizedText::new("Bitcoin", "بیت کوین"),
                symbol: None,
                decimals: None,
            },
        );

        state.reduce(SyncAction::SnapshotApplied(ListingSnapshot::from_network(
            vec![test_item(1, "Bitcoin", 5.0)],
            catalog,
        )));
        assert!(state.currencies.is_some());

        // Instantané cache (pas de catalogue) : l'ancien catalogue survit
        state.reduce(SyncAction::SnapshotApplied(ListingSnapshot::from_cache(
            vec![test_item(1, "Bitcoin", 5.0)],
        )));
        assert!(state.currencies.is_some());
        assert!(!state.is_online);
    }

    #[test]
    fn test_failure_keeps_last_known_list() {
        let mut state = SyncState::default();
        state.reduce(SyncAction::SnapshotApplied(ListingSnapshot::from_network(
            vec![test_item(1, "Bitcoin", 5.0)],
            Default::default(),
        )));

        // L'échec ne vide jamais la liste
        state.reduce(SyncAction::SyncFailed("panne".to_string()));
        assert_eq!(state.canonical.len(), 1);
        assert!(!state.is_online);
        assert!(!state.is_cold());
    }

    #[test]
    fn test_cold_start() {
        let state = SyncState::default();
        assert!(state.is_cold());
        assert!(state.canonical.is_empty());
    }
}
