// ============================================================================
// LazyMarket - Library
// ============================================================================
// Expose les modules publics pour les tests et les intégrations
// ============================================================================

pub mod api;     // Client HTTP de l'API des marchés
pub mod app;     // État de l'application
pub mod engine;  // Filtrage et tri de la liste
pub mod i18n;    // Localisation en / fa
pub mod models;  // Structures de données
pub mod storage; // Cache persisté des listings
pub mod store;   // Slices d'état + reducers
pub mod sync;    // Synchronisation périodique
pub mod ui;      // Interface utilisateur
