// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Encapsulation : les modifications passent par les méthodes de App
//
// PATTERN : Cette structure suit le pattern "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Les données métier vivent dans le Store (slices typées)
// - App n'ajoute que l'état d'écran : navigation, sélection, menus
// ============================================================================

use crate::engine::SortKey;
use crate::i18n::{Locale, SUPPORTED_LOCALES};
use crate::store::{Action, DisplayAction, Store, ThemeAction};

// ============================================================================
// Enum : Screen
// ============================================================================
// CONCEPT RUST : Enums pour state machines
// - Représente les différents écrans de l'application
// - Pattern "State Machine" : un seul écran actif à la fois
// - Le compilateur force à gérer tous les cas (exhaustivité)
// ============================================================================

/// Écrans de l'application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Vue principale : liste des marchés
    Markets,

    /// Vue détail : fiche du marché sélectionné
    Detail,

    /// Mode saisie : le terme de recherche est édité en direct
    /// CONCEPT : Modal input mode (Vim-like)
    /// - Chaque frappe redéclenche le filtrage, pas de validation différée
    /// - Enter ou ESC sortent du mode, le terme reste appliqué
    SearchInput,

    /// Menu de tri : les quatre comparateurs + retour à l'ordre d'arrivée
    SortMenu,

    /// Menu de langue : en / fa
    LanguageMenu,
}

/// Nombre d'entrées du menu de tri (4 tris + "ordre par défaut")
const SORT_MENU_LEN: usize = SortKey::ALL.len() + 1;

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Les slices d'état métier (thème, sync, affichage, langue)
    pub store: Store,

    /// Index du marché sélectionné dans la liste visible
    pub selected_index: usize,

    /// Écran actuellement affiché
    pub current_screen: Screen,

    /// Indique si l'utilisateur a demandé à quitter (attend confirmation)
    /// CONCEPT : Two-step quit pour éviter les sorties accidentelles
    pub confirm_quit: bool,

    /// Indique si un sync est en cours (indicateur de chargement)
    pub is_loading: bool,

    /// Index sélectionné dans le menu de tri
    pub sort_menu_index: usize,

    /// Index sélectionné dans le menu de langue
    pub lang_menu_index: usize,
}

impl App {
    /// Crée une nouvelle instance de App à l'état initial
    pub fn new() -> Self {
        Self {
            running: true,
            store: Store::new(),
            selected_index: 0,
            current_screen: Screen::Markets,
            confirm_quit: false,
            is_loading: false,
            sort_menu_index: 0,
            lang_menu_index: 0,
        }
    }

    /// Quitte l'application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Vérifie si l'application doit continuer
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Route une action vers le store puis reborne la sélection
    ///
    /// La liste visible peut rétrécir (filtre, refresh) : la sélection
    /// doit rester dans les bornes
    pub fn dispatch(&mut self, action: Action) {
        self.store.dispatch(action);
        self.clamp_selection();
    }

    /// Reborne l'index de sélection sur la liste visible
    fn clamp_selection(&mut self) {
        let max_index = self.store.display.visible.len().saturating_sub(1);
        self.selected_index = self.selected_index.min(max_index);
    }

    // ========================================================================
    // Navigation dans la liste
    // ========================================================================

    /// Navigue vers le haut dans la liste
    ///
    /// CONCEPT RUST : Saturating arithmetic
    /// - saturating_sub() : soustrait mais ne descend pas en dessous de 0
    /// - Évite les panics avec les unsigned
    pub fn navigate_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    /// Navigue vers le bas dans la liste
    pub fn navigate_down(&mut self) {
        let max_index = self.store.display.visible.len().saturating_sub(1);
        self.selected_index = (self.selected_index + 1).min(max_index);
    }

    /// Remonte en haut de la liste (scroll-to-top)
    pub fn scroll_to_top(&mut self) {
        self.selected_index = 0;
    }

    /// Retourne le marché sélectionné dans la liste visible
    pub fn selected_item(&self) -> Option<&crate::models::MarketItem> {
        self.store.display.visible.get(self.selected_index)
    }

    // ========================================================================
    // Transitions d'écran
    // ========================================================================

    /// Affiche la fiche détail du marché sélectionné
    pub fn show_detail(&mut self) {
        if self.selected_item().is_some() {
            self.current_screen = Screen::Detail;
        }
    }

    /// Retourne à la liste des marchés
    pub fn show_markets(&mut self) {
        self.current_screen = Screen::Markets;
    }

    /// Vérifie si on est sur la liste des marchés
    pub fn is_on_markets(&self) -> bool {
        self.current_screen == Screen::Markets
    }

    /// Vérifie si on est sur la fiche détail
    pub fn is_on_detail(&self) -> bool {
        self.current_screen == Screen::Detail
    }

    // ========================================================================
    // Mode recherche
    // ========================================================================

    /// Entre en mode recherche
    ///
    /// Le terme courant reste affiché et éditable : la recherche est
    /// vivante, pas un formulaire à valider
    pub fn start_search(&mut self) {
        self.current_screen = Screen::SearchInput;
    }

    /// Sort du mode recherche, le terme reste appliqué
    pub fn end_search(&mut self) {
        self.current_screen = Screen::Markets;
    }

    /// Vérifie si on est en mode recherche
    pub fn is_searching(&self) -> bool {
        self.current_screen == Screen::SearchInput
    }

    /// Ajoute un caractère au terme de recherche
    ///
    /// Chaque frappe passe par le store : la liste visible est
    /// recomputée immédiatement (pas de debounce)
    pub fn search_push(&mut self, c: char) {
        let mut term = self.store.display.search_term.clone();
        term.push(c);
        self.dispatch(Action::Display(DisplayAction::SearchChanged(term)));
    }

    /// Supprime le dernier caractère du terme de recherche
    pub fn search_pop(&mut self) {
        let mut term = self.store.display.search_term.clone();
        term.pop();
        self.dispatch(Action::Display(DisplayAction::SearchChanged(term)));
    }

    /// Efface entièrement le terme de recherche
    pub fn search_clear(&mut self) {
        self.dispatch(Action::Display(DisplayAction::SearchChanged(String::new())));
    }

    // ========================================================================
    // Menu de tri
    // ========================================================================

    /// Ouvre le menu de tri
    pub fn open_sort_menu(&mut self) {
        self.current_screen = Screen::SortMenu;
        self.sort_menu_index = 0;
    }

    /// Entrée suivante du menu de tri (cycle)
    pub fn sort_menu_next(&mut self) {
        self.sort_menu_index = (self.sort_menu_index + 1) % SORT_MENU_LEN;
    }

    /// Entrée précédente du menu de tri (cycle)
    pub fn sort_menu_previous(&mut self) {
        self.sort_menu_index = (self.sort_menu_index + SORT_MENU_LEN - 1) % SORT_MENU_LEN;
    }

    /// Valide l'entrée sélectionnée du menu de tri
    pub fn sort_menu_select(&mut self) {
        let action = match SortKey::ALL.get(self.sort_menu_index) {
            Some(key) => DisplayAction::SortSelected(*key),
            // Dernière entrée : retour à l'ordre d'arrivée
            None => DisplayAction::SortCleared,
        };
        self.dispatch(Action::Display(action));
        self.current_screen = Screen::Markets;
    }

    /// Ferme le menu de tri sans changer le tri
    pub fn close_sort_menu(&mut self) {
        self.current_screen = Screen::Markets;
    }

    /// Vérifie si le menu de tri est ouvert
    pub fn is_on_sort_menu(&self) -> bool {
        self.current_screen == Screen::SortMenu
    }

    // ========================================================================
    // Menu de langue
    // ========================================================================

    /// Ouvre le menu de langue, positionné sur la langue courante
    pub fn open_language_menu(&mut self) {
        self.current_screen = Screen::LanguageMenu;
        self.lang_menu_index = SUPPORTED_LOCALES
            .iter()
            .position(|l| *l == self.store.locale)
            .unwrap_or(0);
    }

    /// Entrée suivante du menu de langue (cycle)
    pub fn lang_menu_next(&mut self) {
        self.lang_menu_index = (self.lang_menu_index + 1) % SUPPORTED_LOCALES.len();
    }

    /// Entrée précédente du menu de langue (cycle)
    pub fn lang_menu_previous(&mut self) {
        self.lang_menu_index =
            (self.lang_menu_index + SUPPORTED_LOCALES.len() - 1) % SUPPORTED_LOCALES.len();
    }

    /// Valide la langue sélectionnée
    pub fn lang_menu_select(&mut self) {
        let locale = SUPPORTED_LOCALES
            .get(self.lang_menu_index)
            .copied()
            .unwrap_or_default();
        self.dispatch(Action::SetLocale(locale.code().to_string()));
        self.current_screen = Screen::Markets;
    }

    /// Ferme le menu de langue sans changer la langue
    pub fn close_language_menu(&mut self) {
        self.current_screen = Screen::Markets;
    }

    /// Vérifie si le menu de langue est ouvert
    pub fn is_on_language_menu(&self) -> bool {
        self.current_screen == Screen::LanguageMenu
    }

    /// Langue courante (raccourci de lecture)
    pub fn locale(&self) -> Locale {
        self.store.locale
    }

    /// Bascule le mode sombre
    pub fn toggle_dark_mode(&mut self) {
        self.dispatch(Action::Theme(ThemeAction::ToggleDarkMode));
    }

    // ========================================================================
    // Confirmation de quit
    // ========================================================================

    /// Demande la confirmation de quitter
    ///
    /// CONCEPT : Two-step quit pattern
    /// - Première pression : active confirm_quit
    /// - Deuxième pression : quit réel
    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    /// Annule la demande de quit
    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    /// Vérifie si on attend la confirmation de quit
    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    // ========================================================================
    // Indicateur de chargement
    // ========================================================================

    /// Signale qu'un sync est en cours
    pub fn start_loading(&mut self) {
        self.is_loading = true;
    }

    /// Signale la fin du sync
    pub fn stop_loading(&mut self) {
        self.is_loading = false;
    }
}

// ============================================================================
// Trait Default
// ============================================================================
// Convention Rust : si new() ne prend pas de paramètres, implémenter Default
// ============================================================================

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{test_item, ListingSnapshot};
    use crate::store::SyncAction;

    /// App préchargée avec trois marchés
    fn app_with_markets() -> App {
        let mut app = App::new();
        app.dispatch(Action::Sync(SyncAction::SnapshotApplied(
            ListingSnapshot::from_network(
                vec![
                    test_item(1, "Bitcoin", 5.0),
                    test_item(2, "Ethereum", 3.0),
                    test_item(3, "Tether", 1.0),
                ],
                Default::default(),
            ),
        )));
        app
    }

    #[test]
    fn test_app_creation() {
        let app = App::new();
        assert!(app.is_running());
        assert!(app.store.display.visible.is_empty());
        assert_eq!(app.selected_index, 0);
        assert_eq!(app.current_screen, Screen::Markets);
    }

    #[test]
    fn test_navigation_bounds() {
        let mut app = app_with_markets();

        // Navigate down jusqu'au max : reste au dernier index
        app.navigate_down();
        app.navigate_down();
        app.navigate_down();
        assert_eq!(app.selected_index, 2);

        // Navigate up jusqu'au min : reste à 0
        app.navigate_up();
        app.navigate_up();
        app.navigate_up();
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_selection_clamped_when_filter_shrinks_list() {
        let mut app = app_with_markets();
        app.navigate_down();
        app.navigate_down();
        assert_eq!(app.selected_index, 2);

        // Le filtre réduit la liste à un seul item : la sélection suit
        app.start_search();
        for c in "bitcoin".chars() {
            app.search_push(c);
        }
        assert_eq!(app.store.display.visible.len(), 1);
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_search_editing() {
        let mut app = app_with_markets();
        app.start_search();
        assert!(app.is_searching());

        app.search_push('e');
        app.search_push('t');
        assert_eq!(app.store.display.search_term, "et");

        app.search_pop();
        assert_eq!(app.store.display.search_term, "e");

        app.search_clear();
        assert!(app.store.display.search_term.is_empty());
        assert_eq!(app.store.display.visible.len(), 3);
    }

    #[test]
    fn test_detail_requires_selection() {
        let mut app = App::new();

        // Liste vide : pas de transition vers le détail
        app.show_detail();
        assert!(app.is_on_markets());

        let mut app = app_with_markets();
        app.show_detail();
        assert!(app.is_on_detail());

        app.show_markets();
        assert!(app.is_on_markets());
    }

    #[test]
    fn test_sort_menu_cycle_and_select() {
        let mut app = app_with_markets();
        app.open_sort_menu();
        assert!(app.is_on_sort_menu());

        // Descend jusqu'à "Price" (2e entrée)
        app.sort_menu_next();
        app.sort_menu_select();
        assert!(app.is_on_markets());
        assert_eq!(app.store.display.sort_key, Some(SortKey::Price));
        assert_eq!(app.store.display.visible[0].pair_id, 3); // moins cher d'abord

        // Dernière entrée : retour à l'ordre d'arrivée
        app.open_sort_menu();
        app.sort_menu_previous(); // cycle vers la fin
        app.sort_menu_select();
        assert_eq!(app.store.display.sort_key, None);
    }

    #[test]
    fn test_language_menu() {
        let mut app = App::new();
        app.open_language_menu();
        assert!(app.is_on_language_menu());

        app.lang_menu_next();
        app.lang_menu_select();
        assert_eq!(app.locale(), Locale::Fa);
        assert!(app.is_on_markets());
    }

    #[test]
    fn test_two_step_quit() {
        let mut app = App::new();
        assert!(!app.is_awaiting_quit_confirmation());

        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());
        assert!(app.is_running());

        app.cancel_quit();
        assert!(!app.is_awaiting_quit_confirmation());

        app.quit();
        assert!(!app.is_running());
    }

    #[test]
    fn test_toggle_dark_mode() {
        let mut app = App::new();
        app.toggle_dark_mode();
        assert!(app.store.theme.is_dark_mode);
    }
}
