// ============================================================================
// Module : i18n
// ============================================================================
// Localisation de l'interface : anglais / persan
//
// CONCEPTS RUST :
// 1. Enum Copy : une locale est une petite valeur, copiée librement
// 2. Match exhaustif : la table de traduction est vérifiée à la compilation
// 3. &'static str : les libellés vivent dans le binaire, zéro allocation
//
// La table est une ressource statique, pas une configuration : pas de
// fichiers de langue à charger, pas de backend HTTP.
// ============================================================================

use tracing::warn;

/// Locale par défaut quand un code inconnu est demandé
pub const DEFAULT_LOCALE: Locale = Locale::En;

/// Ensemble fixe des langues supportées
pub const SUPPORTED_LOCALES: [Locale; 2] = [Locale::En, Locale::Fa];

// ============================================================================
// Enum : Locale
// ============================================================================

/// Langue de l'interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    /// Anglais
    #[default]
    En,

    /// Persan (فارسی)
    Fa,
}

impl Locale {
    /// Convertit un code de langue en locale
    ///
    /// CONCEPT : Fallback configuré
    /// - Codes valides : "en", "fa"
    /// - Tout autre code retombe sur la locale par défaut, avec un warn
    pub fn from_code(code: &str) -> Self {
        match code {
            "en" => Locale::En,
            "fa" => Locale::Fa,
            other => {
                warn!(code = %other, "Unknown locale code, falling back to default");
                DEFAULT_LOCALE
            }
        }
    }

    /// Code de langue ("en" / "fa")
    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Fa => "fa",
        }
    }

    /// Nom de la langue dans sa propre écriture (menu de langue)
    pub fn native_name(&self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Fa => "فارسی",
        }
    }

    /// Bascule vers l'autre langue (raccourci clavier)
    pub fn toggled(&self) -> Self {
        match self {
            Locale::En => Locale::Fa,
            Locale::Fa => Locale::En,
        }
    }
}

// ============================================================================
// Table de traduction
// ============================================================================
// CONCEPT : Table match plutôt que HashMap
// - Les clés sont connues à la compilation
// - Une clé inconnue retourne la clé elle-même (visible dans l'UI = bug)
// ============================================================================

/// Retourne le libellé traduit d'une clé
///
/// Clé absente en persan : retombe sur l'anglais.
/// Clé absente tout court : retourne "???" (rend le trou visible).
pub fn t(locale: Locale, key: &str) -> &'static str {
    // CONCEPT RUST : Option::or_else pour chaîner les fallbacks
    let hit = match locale {
        Locale::Fa => t_fa(key).or_else(|| t_en(key)),
        Locale::En => t_en(key),
    };

    match hit {
        Some(label) => label,
        None => {
            warn!(key = %key, "Missing translation key");
            "???"
        }
    }
}

/// Libellés anglais
fn t_en(key: &str) -> Option<&'static str> {
    Some(match key {
        "app.title" => "LazyMarket",
        "markets.title" => "Markets",
        "markets.no_data" => "No data available",
        "markets.search_placeholder" => "Enter search text...",
        "markets.loading" => "Loading...",
        "markets.source.cache" => "cached",
        "markets.source.network" => "live",
        "markets.offline" => "offline",
        "sort.title" => "Sort by",
        "sort.changes" => "Changes",
        "sort.price" => "Price",
        "sort.volume" => "Volume",
        "sort.name" => "Name",
        "sort.none" => "Default order",
        "lang.title" => "Language",
        "lang.close" => "Close",
        "detail.sell_price" => "Sell price",
        "detail.buy_price" => "Buy price",
        "detail.precision" => "Price precision",
        "detail.step" => "Amount step",
        "detail.deposit" => "Deposit",
        "detail.transfer" => "Transfer",
        "detail.exchange" => "Exchange",
        "detail.withdraw" => "Withdraw",
        "help.quit" => "Quit",
        "help.navigate" => "Navigate",
        "help.detail" => "Detail",
        "help.search" => "Search",
        "help.sort" => "Sort",
        "help.theme" => "Theme",
        "help.lang" => "Language",
        "help.refresh" => "Refresh",
        "help.back" => "Back",
        "help.confirm_quit" => "Press [q] again to quit, any other key to cancel",
        _ => return None,
    })
}

/// Libellés persans
fn t_fa(key: &str) -> Option<&'static str> {
    Some(match key {
        "app.title" => "لیزی‌مارکت",
        "markets.title" => "بازارها",
        "markets.no_data" => "داده‌ای موجود نیست",
        "markets.search_placeholder" => "متن جستجو را وارد کنید...",
        "markets.loading" => "در حال بارگذاری...",
        "markets.offline" => "آفلاین",
        "sort.title" => "مرتب‌سازی",
        "sort.changes" => "تغییرات",
        "sort.price" => "قیمت",
        "sort.volume" => "حجم",
        "sort.name" => "نام",
        "sort.none" => "ترتیب پیش‌فرض",
        "lang.title" => "زبان",
        "lang.close" => "بستن",
        "detail.sell_price" => "قیمت فروش",
        "detail.buy_price" => "قیمت خرید",
        "detail.precision" => "دقت قیمت",
        "detail.step" => "گام مقدار",
        "detail.deposit" => "واریز",
        "detail.transfer" => "انتقال",
        "detail.exchange" => "تبادل",
        "detail.withdraw" => "برداشت",
        _ => return None,
    })
}

// ============================================================================
// Chiffres persans
// ============================================================================

/// Convertit les chiffres occidentaux d'un texte en chiffres persans
///
/// "1,234" -> "۱,۲۳۴"
///
/// CONCEPT RUST : Iterator sur chars
/// - char::to_digit(10) identifie les chiffres ASCII
/// - Les autres caractères passent inchangés
pub fn to_persian_digits(text: &str) -> String {
    const PERSIAN_DIGITS: [char; 10] = ['۰', '۱', '۲', '۳', '۴', '۵', '۶', '۷', '۸', '۹'];

    text.chars()
        .map(|c| match c.to_digit(10) {
            Some(d) => PERSIAN_DIGITS[d as usize],
            None => c,
        })
        .collect()
}

/// Formate un nombre selon la locale (chiffres persans en fa)
pub fn localize_digits(locale: Locale, text: &str) -> String {
    match locale {
        Locale::Fa => to_persian_digits(text),
        Locale::En => text.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
