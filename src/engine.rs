// ============================================================================
// Module : engine
// ============================================================================
// Moteur de filtrage et de tri de la liste des marchés
//
// CONCEPTS RUST :
// 1. Fonctions pures : la liste visible est dérivée, jamais mutée sur place
// 2. sort_by : tri stable de la bibliothèque standard
// 3. Ordering : comparateurs totaux construits sur partial_cmp
//
// INVARIANT : apply_filter et apply_sort retournent toujours un nouveau Vec,
// la liste canonique du synchronizer n'est jamais modifiée.
// ============================================================================

use std::cmp::Ordering;

use crate::models::MarketItem;

// ============================================================================
// Enum : SortKey
// ============================================================================

/// Les quatre tris intégrés, tous ascendants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Variation 24h en pourcentage (absente = 0)
    ChangePercent,

    /// Prix d'achat
    Price,

    /// Volume de base 24h (absent = 0)
    Volume,

    /// Nom persan, ordre alphabétique persan
    Name,
}

impl SortKey {
    /// Tous les tris, dans l'ordre du menu de tri
    pub const ALL: [SortKey; 4] = [
        SortKey::ChangePercent,
        SortKey::Price,
        SortKey::Volume,
        SortKey::Name,
    ];

    /// Clé de traduction du libellé du tri
    pub fn label_key(&self) -> &'static str {
        match self {
            SortKey::ChangePercent => "sort.changes",
            SortKey::Price => "sort.price",
            SortKey::Volume => "sort.volume",
            SortKey::Name => "sort.name",
        }
    }
}

// ============================================================================
// Filtrage
// ============================================================================

/// Filtre la liste par sous-chaîne insensible à la casse sur le nom anglais
///
/// Le champ de filtrage est fixé à name.en quelle que soit la locale
/// d'affichage (choix de design hérité, pas un filtrage localisé).
///
/// INVARIANT : terme vide = identité (mêmes éléments, même ordre).
pub fn apply_filter(list: &[MarketItem], term: &str) -> Vec<MarketItem> {
    if term.is_empty() {
        return list.to_vec();
    }

    let needle = term.to_lowercase();
    list.iter()
        .filter(|item| item.name.en.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

// ============================================================================
// Tri
// ============================================================================

/// Trie la liste selon la clé donnée, sans toucher à l'entrée
///
/// CONCEPT RUST : sort_by est stable
/// - Deux items égaux pour le comparateur gardent leur ordre relatif
/// - Le tri est donc idempotent : trier deux fois = trier une fois
pub fn apply_sort(list: &[MarketItem], key: SortKey) -> Vec<MarketItem> {
    let mut sorted = list.to_vec();
    sorted.sort_by(comparator(key));
    sorted
}

/// Dérive la liste visible depuis la liste canonique
///
/// Fonction pure de (canonique, terme, tri) : recomputée à chaque frappe
/// et à chaque sélection de tri, jamais patchée incrémentalement.
pub fn derive_visible(
    canonical: &[MarketItem],
    term: &str,
    sort: Option<SortKey>,
) -> Vec<MarketItem> {
    let filtered = apply_filter(canonical, term);
    match sort {
        Some(key) => apply_sort(&filtered, key),
        None => filtered,
    }
}

/// Retourne le comparateur de la clé de tri
///
/// CONCEPT RUST : Retourner une closure
/// - impl Fn(..) -> Ordering : type opaque, monomorphisé par sort_by
fn comparator(key: SortKey) -> impl Fn(&MarketItem, &MarketItem) -> Ordering {
    move |a, b| match key {
        // Valeur absente traitée comme 0 par opérande, AVANT la
        // comparaison : jamais de NaN quand un seul opérande manque
        SortKey::ChangePercent => total_cmp_f64(
            a.change_percent().unwrap_or(0.0),
            b.change_percent().unwrap_or(0.0),
        ),
        SortKey::Price => total_cmp_f64(a.buy, b.buy),
        SortKey::Volume => total_cmp_f64(
            a.base_volume().unwrap_or(0.0),
            b.base_volume().unwrap_or(0.0),
        ),
        SortKey::Name => fa_collation_key(&a.name.fa).cmp(&fa_collation_key(&b.name.fa)),
    }
}

/// Ordre total sur f64
///
/// partial_cmp suffit ici (les valeurs viennent de JSON, jamais NaN),
/// mais on borde quand même : NaN comparé = égal, le tri reste stable.
fn total_cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

// ============================================================================
// Collation persane
// ============================================================================
// Pas d'ICU dans la stack : le tri par nom utilise une table de rangs de
// l'alphabet persan. L'ordre des code points Unicode du bloc arabe ne
// correspond pas à l'ordre alphabétique persan (پ چ ژ گ sont hors bloc,
// ک/ی ont des jumeaux arabes) d'où la table explicite.
// ============================================================================

/// Clé de collation d'une chaîne persane
///
/// Chaque caractère devient un rang : les lettres persanes prennent leur
/// position dans l'alphabet, le reste passe après, ordonné par code point.
fn fa_collation_key(s: &str) -> Vec<u32> {
    s.chars().map(fa_rank).collect()
}

/// Rang d'un caractère dans l'alphabet persan
fn fa_rank(c: char) -> u32 {
    // Les 32 lettres de l'alphabet persan, formes arabes jumelles incluses
    let rank = match c {
        'آ' | 'ا' | 'أ' | 'إ' => 0, // alef et ses formes
        'ب' => 1,
        'پ' => 2,
        'ت' => 3,
        'ث' => 4,
        'ج' => 5,
        'چ' => 6,
        'ح' => 7,
        'خ' => 8,
        'د' => 9,
        'ذ' => 10,
        'ر' => 11,
        'ز' => 12,
        'ژ' => 13,
        'س' => 14,
        'ش' => 15,
        'ص' => 16,
        'ض' => 17,
        'ط' => 18,
        'ظ' => 19,
        'ع' => 20,
        'غ' => 21,
        'ف' => 22,
        'ق' => 23,
        'ک' | 'ك' => 24, // kaf persan et kaf arabe
        'گ' => 25,
        'ل' => 26,
        'م' => 27,
        'ن' => 28,
        'و' => 29,
        'ه' | 'ة' => 30,
        'ی' | 'ي' | 'ى' => 31, // ye persan et ses formes arabes
        _ => return 0x1000 + c as u32, // tout le reste après les lettres
    };
    rank
}

// ============================================================================
// Tests
// ============================================================================
