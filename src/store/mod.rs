// ============================================================================
// Module : store
// ============================================================================
// Conteneur d'état applicatif en slices typées
//
// CONCEPT : Slices + actions taguées
// - Chaque slice (ThemeState, SyncState, DisplayState) a son enum
//   d'actions et son reducer exhaustif
// - Le Store combine les slices et route les actions
// - Passé par référence aux composants qui en ont besoin, pas de
//   lookup global implicite
// ============================================================================

pub mod display;    // Terme de recherche, tri, liste visible
pub mod sync_state; // Liste canonique, catalogue, horodatage
pub mod theme;      // Mode sombre et palette

pub use display::{DisplayAction, DisplayState};
pub use sync_state::{SyncAction, SyncState};
pub use theme::{Theme, ThemeAction, ThemeState, DARK_THEME, LIGHT_THEME};

use tracing::info;

use crate::i18n::Locale;

// ============================================================================
// Enum : Action
// ============================================================================

/// Action racine : enveloppe taguée des actions de chaque slice
///
/// CONCEPT RUST : Enum de variants tagués
/// - Un dispatch, un match exhaustif, pas d'action "any-typed"
#[derive(Debug, Clone)]
pub enum Action {
    /// Action du thème
    Theme(ThemeAction),

    /// Action de synchronisation
    Sync(SyncAction),

    /// Action d'affichage
    Display(DisplayAction),

    /// Changement de langue par code ("en" / "fa"), fallback si inconnu
    SetLocale(String),
}

// ============================================================================
// Structure : Store
// ============================================================================

/// Conteneur des slices d'état
#[derive(Debug, Clone, Default)]
pub struct Store {
    /// Slice du thème
    pub theme: ThemeState,

    /// Slice de synchronisation
    pub sync: SyncState,

    /// Slice d'affichage
    pub display: DisplayState,

    /// Langue courante (consommée en lecture par le rendu)
    pub locale: Locale,
}

impl Store {
    /// Crée un store à l'état initial
    pub fn new() -> Self {
        Self::default()
    }

    /// Route une action vers sa slice puis maintient les dérivations
    ///
    /// INVARIANT : après chaque dispatch, visible est recomputée depuis
    /// (canonique, terme, tri).
    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Theme(action) => self.theme.reduce(action),
            Action::Sync(action) => self.sync.reduce(action),
            Action::Display(action) => self.display.reduce(action),
            Action::SetLocale(code) => {
                let locale = Locale::from_code(&code);
                info!(locale = locale.code(), "Locale changed");
                self.locale = locale;
            }
        }

        // La liste visible suit toujours ses entrées
        self.display.rebuild(&self.sync.canonical);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SortKey;
    use crate::models::{test_item, ListingSnapshot};

    #[test]
    fn test_snapshot_dispatch_rebuilds_visible() {
        let mut store = Store::new();
        assert!(store.display.visible.is_empty());

        store.dispatch(Action::Sync(SyncAction::SnapshotApplied(
            ListingSnapshot::from_network(
                vec![test_item(1, "Bitcoin", 5.0), test_item(2, "Ethereum", 3.0)],
                Default::default(),
            ),
        )));

        // La liste visible reflète la nouvelle liste canonique
        assert_eq!(store.display.visible.len(), 2);
    }

    #[test]
    fn test_search_and_sort_survive_refresh() {
        let mut store = Store::new();
        store.dispatch(Action::Sync(SyncAction::SnapshotApplied(
            ListingSnapshot::from_network(
                vec![
                    test_item(1, "Bitcoin", 5.0),
                    test_item(2, "Bitcoin Cash", 1.0),
                    test_item(3, "Ethereum", 3.0),
                ],
                Default::default(),
            ),
        )));

        store.dispatch(Action::Display(DisplayAction::SearchChanged(
            "bitcoin".to_string(),
        )));
        store.dispatch(Action::Display(DisplayAction::SortSelected(SortKey::Price)));
        assert_eq!(store.display.visible.len(), 2);
        assert_eq!(store.display.visible[0].pair_id, 2);

        // Un refresh arrive : le filtre et le tri restent appliqués
        store.dispatch(Action::Sync(SyncAction::SnapshotApplied(
            ListingSnapshot::from_network(
                vec![
                    test_item(1, "Bitcoin", 2.0),
                    test_item(2, "Bitcoin Cash", 4.0),
                    test_item(3, "Ethereum", 3.0),
                ],
                Default::default(),
            ),
        )));
        assert_eq!(store.display.visible.len(), 2);
        assert_eq!(store.display.visible[0].pair_id, 1); // re-trié par prix
    }

    #[test]
    fn test_set_locale_with_fallback() {
        let mut store = Store::new();

        store.dispatch(Action::SetLocale("fa".to_string()));
        assert_eq!(store.locale, Locale::Fa);

        // Code invalide : retombe sur la locale par défaut
        store.dispatch(Action::SetLocale("klingon".to_string()));
        assert_eq!(store.locale, Locale::En);
    }

    #[test]
    fn test_theme_action_does_not_disturb_display() {
        let mut store = Store::new();
        store.dispatch(Action::Sync(SyncAction::SnapshotApplied(
            ListingSnapshot::from_network(vec![test_item(1, "Bitcoin", 5.0)], Default::default()),
        )));

        store.dispatch(Action::Theme(ThemeAction::ToggleDarkMode));
        assert!(store.theme.is_dark_mode);
        assert_eq!(store.display.visible.len(), 1);
    }
}
