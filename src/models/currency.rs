// ============================================================================
// Structure : CurrencyInfo
// ============================================================================
// Catalogue des cryptomonnaies : code -> métadonnées
//
// Rafraîchi à chaque sync réseau en même temps que les listings,
// mais jamais persisté dans le cache (donnée dépendante, volatile).
// ============================================================================

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::LocalizedText;

/// Métadonnées d'une cryptomonnaie du catalogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyInfo {
    /// Nom localisé de la devise
    pub name: LocalizedText,

    /// Symbole court optionnel (ex: "BTC")
    #[serde(default)]
    pub symbol: Option<String>,

    /// Nombre de décimales d'affichage
    #[serde(default)]
    pub decimals: Option<u32>,
}

/// Catalogue complet : code de devise -> métadonnées
///
/// CONCEPT RUST : Type alias
/// - Donne un nom métier à un type générique
/// - Évite de répéter HashMap<String, CurrencyInfo> partout
pub type CurrencyCatalog = HashMap<String, CurrencyInfo>;

/// Cherche une devise dans le catalogue, insensible à la casse
///
/// Les listings portent des symboles en minuscules ("btc"), le catalogue
/// peut indexer en majuscules : on tente les deux formes.
pub fn lookup<'a>(catalog: &'a CurrencyCatalog, code: &str) -> Option<&'a CurrencyInfo> {
    catalog
        .get(code)
        .or_else(|| catalog.get(&code.to_lowercase()))
        .or_else(|| catalog.get(&code.to_uppercase()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_deserialize() {
        let json = r#"{
            "btc": {
                "name": {"en": "Bitcoin", "fa": "بیت کوین"},
                "symbol": "BTC",
                "decimals": 8
            },
            "usdt": {
                "name": {"en": "Tether", "fa": "تتر"}
            }
        }"#;

        let catalog: CurrencyCatalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog["btc"].symbol.as_deref(), Some("BTC"));
        assert!(catalog["usdt"].symbol.is_none());
    }

    #[test]
    fn test_lookup_case_insensitive() {
        let json = r#"{"btc": {"name": {"en": "Bitcoin", "fa": "بیت کوین"}}}"#;
        let catalog: CurrencyCatalog = serde_json::from_str(json).unwrap();

        assert!(lookup(&catalog, "btc").is_some());
        assert!(lookup(&catalog, "BTC").is_some());
        assert!(lookup(&catalog, "eth").is_none());
    }
}
