// ============================================================================
// Slice d'état : DisplayState
// ============================================================================
// État d'affichage de la liste : terme de recherche, tri choisi, liste
// visible dérivée
//
// INVARIANT : visible est une fonction pure de (canonique, terme, tri),
// recomputée par rebuild() à chaque changement d'entrée, jamais patchée.
// ============================================================================

use crate::engine::{self, SortKey};
use crate::models::MarketItem;

/// État d'affichage
#[derive(Debug, Clone, Default)]
pub struct DisplayState {
    /// Terme de recherche courant (mis à jour à chaque frappe)
    pub search_term: String,

    /// Tri sélectionné (None = ordre d'arrivée)
    pub sort_key: Option<SortKey>,

    /// Projection visible, dérivée de la liste canonique
    pub visible: Vec<MarketItem>,
}

/// Transitions de l'affichage
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayAction {
    /// Le terme de recherche a changé (une frappe)
    SearchChanged(String),

    /// Un tri a été sélectionné dans le menu
    SortSelected(SortKey),

    /// Retour à l'ordre d'arrivée
    SortCleared,
}

impl DisplayState {
    /// Applique une transition sur les entrées de la dérivation
    ///
    /// Le Store appelle rebuild() juste après : les deux étapes sont
    /// séparées parce que rebuild a besoin de la liste canonique qui
    /// vit dans la slice de sync.
    pub fn reduce(&mut self, action: DisplayAction) {
        match action {
            DisplayAction::SearchChanged(term) => self.search_term = term,
            DisplayAction::SortSelected(key) => self.sort_key = Some(key),
            DisplayAction::SortCleared => self.sort_key = None,
        }
    }

    /// Recompute la liste visible depuis la liste canonique
    ///
    /// Synchrone, à chaque frappe et à chaque sélection de tri :
    /// pas de debounce, la dérivation est une passe filter+sort.
    pub fn rebuild(&mut self, canonical: &[MarketItem]) {
        self.visible = engine::derive_visible(canonical, &self.search_term, self.sort_key);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_item;

    fn canonical() -> Vec<MarketItem> {
        vec![
            test_item(1, "Bitcoin", 5.0),
            test_item(2, "Bitcoin Cash", 1.0),
            test_item(3, "Ethereum", 3.0),
        ]
    }

    #[test]
    fn test_default_shows_everything_in_order() {
        let mut state = DisplayState::default();
        state.rebuild(&canonical());
        assert_eq!(state.visible, canonical());
    }

    #[test]
    fn test_each_keystroke_recomputes() {
        let list = canonical();
        let mut state = DisplayState::default();

        // Frappe par frappe, comme l'utilisateur tape "bit"
        for term in ["b", "bi", "bit"] {
            state.reduce(DisplayAction::SearchChanged(term.to_string()));
            state.rebuild(&list);
        }
        assert_eq!(state.visible.len(), 2);

        // Effacement : retour à l'identité
        state.reduce(DisplayAction::SearchChanged(String::new()));
        state.rebuild(&list);
        assert_eq!(state.visible, list);
    }

    #[test]
    fn test_sort_selection_and_clear() {
        let list = canonical();
        let mut state = DisplayState::default();

        state.reduce(DisplayAction::SortSelected(SortKey::Price));
        state.rebuild(&list);
        let prices: Vec<f64> = state.visible.iter().map(|i| i.buy).collect();
        assert_eq!(prices, vec![1.0, 3.0, 5.0]);

        state.reduce(DisplayAction::SortCleared);
        state.rebuild(&list);
        assert_eq!(state.visible, list);
    }

    #[test]
    fn test_visible_is_pure_function_of_inputs() {
        let list = canonical();
        let mut a = DisplayState::default();
        let mut b = DisplayState::default();

        // Deux chemins différents vers les mêmes entrées
        a.reduce(DisplayAction::SearchChanged("bitcoin".to_string()));
        a.reduce(DisplayAction::SortSelected(SortKey::Price));
        a.rebuild(&list);

        b.reduce(DisplayAction::SortSelected(SortKey::ChangePercent));
        b.reduce(DisplayAction::SortSelected(SortKey::Price));
        b.reduce(DisplayAction::SearchChanged("bitcoin".to_string()));
        b.rebuild(&list);

        assert_eq!(a.visible, b.visible);
    }
}
