// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module publique (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod currency;    // Catalogue des cryptomonnaies
pub mod market_item; // Marché (paire de trading) et bloc financier 24h
pub mod snapshot;    // Instantané de listings avec son source tag

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use lazymarket::models::market_item::MarketItem;
// On peut faire : use lazymarket::models::MarketItem;
pub use currency::{lookup, CurrencyCatalog, CurrencyInfo};
pub use market_item::{Financial, Last24h, LocalizedText, MarketItem};
pub use snapshot::{ListingSnapshot, SnapshotSource};

#[cfg(test)]
pub(crate) use market_item::test_item;
