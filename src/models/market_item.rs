// ============================================================================
// Structure : MarketItem
// ============================================================================
// Représente un marché (paire de trading) tel que retourné par l'API
//
// CONCEPTS RUST :
// 1. Serde derive : désérialisation JSON automatique
// 2. Option : gérer les champs absents du JSON (financial peut manquer)
// 3. Composition : MarketItem contient LocalizedText et Financial
// ============================================================================

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::i18n::Locale;

// ============================================================================
// Structure : LocalizedText
// ============================================================================
// CONCEPT : Texte localisé
// - L'API retourne chaque libellé dans les deux langues : {"en": .., "fa": ..}
// - get() choisit le champ selon la locale courante
// ============================================================================

/// Texte en deux langues (anglais / persan)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizedText {
    /// Libellé anglais (ex: "Bitcoin")
    pub en: String,

    /// Libellé persan (ex: "بیت کوین")
    pub fa: String,
}

impl LocalizedText {
    /// Crée un texte localisé (surtout utile dans les tests)
    pub fn new(en: impl Into<String>, fa: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            fa: fa.into(),
        }
    }

    /// Retourne le libellé de la locale demandée
    ///
    /// CONCEPT RUST : Match sur enum
    /// - Exhaustif : le compilateur force à gérer toutes les locales
    pub fn get(&self, locale: Locale) -> &str {
        match locale {
            Locale::En => &self.en,
            Locale::Fa => &self.fa,
        }
    }
}

/// Instantané financier des dernières 24 heures
///
/// CONCEPT RUST : #[serde(flatten)]
/// - Les champs connus (base_volume, change_percent) sont typés
/// - Tout le reste du bloc JSON est conservé dans `extra`
/// - La page détail affiche toutes les entrées, comme Object.entries()
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Last24h {
    /// Volume de base échangé sur 24h (peut manquer dans le JSON)
    #[serde(default)]
    pub base_volume: Option<f64>,

    /// Variation en pourcentage sur 24h (peut manquer dans le JSON)
    #[serde(default)]
    pub change_percent: Option<f64>,

    /// Autres entrées du bloc last24h, préservées telles quelles
    /// BTreeMap plutôt que HashMap : ordre d'affichage stable
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Bloc financier d'un marché
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Financial {
    /// Instantané des dernières 24 heures
    #[serde(default)]
    pub last24h: Last24h,
}

// ============================================================================
// Structure : MarketItem
// ============================================================================

/// Un marché dans la liste des listings
///
/// Immuable une fois reçu : la liste canonique est remplacée en bloc à
/// chaque sync, jamais patchée champ par champ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketItem {
    /// Identifiant unique de la paire (clé de la liste)
    pub pair_id: u64,

    /// Nom affiché, localisé
    pub name: LocalizedText,

    /// Symbole de la devise de base, localisé (ex: "btc" / "بیت کوین")
    pub base_currency_symbol: LocalizedText,

    /// Symbole de la devise de cotation, localisé (ex: "irr" / "ریال")
    pub quote_currency_symbol: LocalizedText,

    /// Prix de vente
    pub sell: f64,

    /// Prix d'achat
    pub buy: f64,

    /// Précision d'affichage de la devise de base
    pub base_precision: u32,

    /// Pas minimal de quantité
    pub amount_step: f64,

    /// Bloc financier (absent pour certains marchés)
    #[serde(default)]
    pub financial: Option<Financial>,

    /// URI du logo
    pub logo: String,
}

impl MarketItem {
    /// Nom affiché selon la locale courante
    pub fn display_name(&self, locale: Locale) -> &str {
        self.name.get(locale)
    }

    /// Variation 24h en pourcentage
    ///
    /// CONCEPT RUST : Option chaining
    /// - self.financial.as_ref()? : early return si pas de bloc financier
    /// - Toute absence en chemin donne None, jamais de panic
    pub fn change_percent(&self) -> Option<f64> {
        self.financial.as_ref()?.last24h.change_percent
    }

    /// Volume de base 24h
    pub fn base_volume(&self) -> Option<f64> {
        self.financial.as_ref()?.last24h.base_volume
    }

    /// Retourne true si le marché est en hausse sur 24h
    ///
    /// Variation absente : considérée en baisse (pas de fausse hausse)
    pub fn is_positive(&self) -> bool {
        self.change_percent().map(|c| c >= 0.0).unwrap_or(false)
    }

    /// Formate le prix de vente avec séparateurs de milliers
    ///
    /// "61423500" -> "61,423,500"
    /// La partie décimale est tronquée à base_precision chiffres
    pub fn format_sell(&self) -> String {
        format_thousands(self.sell, self.base_precision)
    }

    /// Formate le prix d'achat avec séparateurs de milliers
    pub fn format_buy(&self) -> String {
        format_thousands(self.buy, self.base_precision)
    }
}

/// Insère des séparateurs de milliers dans un nombre
///
/// CONCEPT RUST : Manipulation de chars
/// - On formate d'abord avec la précision demandée
/// - Puis on regroupe la partie entière par paquets de 3
fn format_thousands(value: f64, precision: u32) -> String {
    let formatted = format!("{:.*}", precision as usize, value);

    // Sépare partie entière et partie décimale
    let (int_part, dec_part) = match formatted.split_once('.') {
        Some((i, d)) => (i, Some(d)),
        None => (formatted.as_str(), None),
    };

    // Gère le signe négatif
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };

    // Regroupe par 3 depuis la droite
    let mut grouped = String::new();
    let chars: Vec<char> = digits.chars().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    match dec_part {
        Some(d) if !d.is_empty() => format!("{}{}.{}", sign, grouped, d),
        _ => format!("{}{}", sign, grouped),
    }
}

// ============================================================================
// Helpers de test
// ============================================================================

/// Construit un item minimal pour les tests des autres modules
///
/// CONCEPT RUST : #[cfg(test)] sur un item public au crate
/// - Compilé uniquement pour les tests
/// - pub(crate) : visible des tests de engine, sync, store...
#[cfg(test)]
pub(crate) fn test_item(pair_id: u64, name_en: &str, buy: f64) -> MarketItem {
    MarketItem {
        pair_id,
        name: LocalizedText::new(name_en, format!("{}-fa", name_en)),
        base_currency_symbol: LocalizedText::new("btc", "بیت کوین"),
        quote_currency_symbol: LocalizedText::new("irr", "ریال"),
        sell: buy + 1.0,
        buy,
        base_precision: 0,
        amount_step: 0.1,
        financial: None,
        logo: String::new(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_item() {
        let json = r#"{
            "pair_id": 2,
            "name": {"en": "Bitcoin", "fa": "بیت کوین"},
            "base_currency_symbol": {"en": "btc", "fa": "بیت کوین"},
            "quote_currency_symbol": {"en": "irr", "fa": "ریال"},
            "sell": 61423500.0,
            "buy": 61400000.0,
            "base_precision": 0,
            "amount_step": 0.000001,
            "financial": {
                "last24h": {
                    "base_volume": 12.5,
                    "change_percent": -1.8,
                    "quote_volume": 765000000.0
                }
            },
            "logo": "https://example.com/btc.png"
        }"#;

        let item: MarketItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.pair_id, 2);
        assert_eq!(item.name.en, "Bitcoin");
        assert_eq!(item.change_percent(), Some(-1.8));
        assert_eq!(item.base_volume(), Some(12.5));
        // Les entrées inconnues de last24h sont préservées
        let financial = item.financial.as_ref().unwrap();
        assert!(financial.last24h.extra.contains_key("quote_volume"));
    }

    #[test]
    fn test_deserialize_without_financial() {
        // Certains marchés arrivent sans bloc financier
        let json = r#"{
            "pair_id": 7,
            "name": {"en": "Tether", "fa": "تتر"},
            "base_currency_symbol": {"en": "usdt", "fa": "تتر"},
            "quote_currency_symbol": {"en": "irr", "fa": "ریال"},
            "sell": 59000.0,
            "buy": 58900.0,
            "base_precision": 1,
            "amount_step": 0.1,
            "logo": ""
        }"#;

        let item: MarketItem = serde_json::from_str(json).unwrap();
        assert!(item.financial.is_none());
        assert_eq!(item.change_percent(), None);
        assert_eq!(item.base_volume(), None);
        assert!(!item.is_positive());
    }

    #[test]
    fn test_localized_text_get() {
        let text = LocalizedText::new("Bitcoin", "بیت کوین");
        assert_eq!(text.get(Locale::En), "Bitcoin");
        assert_eq!(text.get(Locale::Fa), "بیت کوین");
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(61423500.0, 0), "61,423,500");
        assert_eq!(format_thousands(950.0, 0), "950");
        assert_eq!(format_thousands(1234.5, 1), "1,234.5");
        assert_eq!(format_thousands(-1000000.0, 0), "-1,000,000");
    }

    #[test]
    fn test_is_positive() {
        let mut item = test_item(1, "Bitcoin", 100.0);
        item.financial = Some(Financial {
            last24h: Last24h {
                change_percent: Some(2.4),
                ..Default::default()
            },
        });
        assert!(item.is_positive());

        item.financial.as_mut().unwrap().last24h.change_percent = Some(-0.3);
        assert!(!item.is_positive());
    }
}
