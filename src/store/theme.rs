// ============================================================================
// Slice d'état : ThemeState
// ============================================================================
// Thème clair/sombre de l'interface
//
// CONCEPT : Slice typée + reducer
// - ThemeAction : enum taguée des transitions possibles
// - reduce() : fonction de transition pure, match exhaustif
// - Remplace le store global ambiant par une slice injectée explicitement
// ============================================================================

use ratatui::style::Color;

// ============================================================================
// Structure : Theme
// ============================================================================

/// Palette de couleurs de l'interface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    /// Fond principal des écrans
    pub primary_background: Color,

    /// Fond secondaire (barres, header)
    pub secondary_background: Color,

    /// Texte secondaire (libellés, valeurs)
    pub secondary_text: Color,

    /// Fond des cartes de la liste
    pub card_background: Color,

    /// Couleur d'accent (sélection, boutons)
    pub accent: Color,
}

/// Thème clair
pub const LIGHT_THEME: Theme = Theme {
    primary_background: Color::White,
    secondary_background: Color::Gray,
    secondary_text: Color::Black,
    card_background: Color::Rgb(240, 240, 240),
    accent: Color::Yellow,
};

/// Thème sombre
pub const DARK_THEME: Theme = Theme {
    primary_background: Color::Black,
    secondary_background: Color::DarkGray,
    secondary_text: Color::White,
    card_background: Color::Rgb(30, 30, 30),
    accent: Color::Yellow,
};

// ============================================================================
// Slice : ThemeState
// ============================================================================

/// État du thème
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeState {
    /// Mode sombre actif ?
    pub is_dark_mode: bool,

    /// Palette courante (dérivée de is_dark_mode)
    pub theme: Theme,
}

impl Default for ThemeState {
    /// Démarre en mode clair
    fn default() -> Self {
        Self {
            is_dark_mode: false,
            theme: LIGHT_THEME,
        }
    }
}

/// Transitions du thème
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeAction {
    /// Bascule clair <-> sombre
    ToggleDarkMode,
}

impl ThemeState {
    /// Applique une transition
    ///
    /// CONCEPT RUST : Match exhaustif
    /// - Ajouter un variant à ThemeAction force à compléter ce match
    pub fn reduce(&mut self, action: ThemeAction) {
        match action {
            ThemeAction::ToggleDarkMode => {
                self.is_dark_mode = !self.is_dark_mode;
                self.theme = if self.is_dark_mode {
                    DARK_THEME
                } else {
                    LIGHT_THEME
                };
            }
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
    fn test_starts_light() {
        let state = ThemeState::default();
        assert!(!state.is_dark_mode);
        assert_eq!(state.theme, LIGHT_THEME);
    }

    #[test]
    fn test_toggle_flips_palette() {
        let mut state = ThemeState::default();

        state.reduce(ThemeAction::ToggleDarkMode);
        assert!(state.is_dark_mode);
        assert_eq!(state.theme, DARK_THEME);

        // Deuxième bascule : retour au clair
        state.reduce(ThemeAction::ToggleDarkMode);
        assert!(!state.is_dark_mode);
        assert_eq!(state.theme, LIGHT_THEME);
    }
}
