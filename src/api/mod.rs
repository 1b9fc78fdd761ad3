// ============================================================================
// Module : api
// ============================================================================
// Ce module contient le client de l'API des listings de marchés
// (listings + catalogue des devises)
// ============================================================================

pub mod market; // Client REST des listings

// Re-export des types principaux
pub use market::{HttpMarketSource, MarketSource, DEFAULT_API_URL};
