// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod events;    // Gestion des événements clavier
pub mod dashboard; // Rendu de l'interface principale
pub mod detail;    // Rendu de la fiche détail d'un marché

// Re-exports pour simplifier les imports
pub use dashboard::render;
pub use events::{Event, EventHandler};
