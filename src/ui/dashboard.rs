// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Dessine l'interface TUI en utilisant les widgets de ratatui
//
// CONCEPTS RUST :
// 1. Lifetimes : 'a pour gérer la durée de vie des références
// 2. Traits : Frame implémente des traits pour le rendering
// 3. Builder pattern : construction fluide des widgets
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Widgets : composants UI (Block, Paragraph, List, etc.)
// 3. Layout : découpage de l'espace en zones
// 4. Style : couleurs et attributs de texte
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, Screen};
use crate::engine::SortKey;
use crate::i18n::{localize_digits, t, Locale, SUPPORTED_LOCALES};
use crate::models::SnapshotSource;
use crate::ui::detail;

// ============================================================================
// Fonction principale de rendu
// ============================================================================
// CONCEPT RUST : &mut Frame
// - On passe Frame par référence mutable (on va dessiner dedans)
// - &App : on lit l'état, pas de modification
// ============================================================================

/// Dessine l'interface complète
///
/// CONCEPT RUST : Routing avec match sur enum
/// - Pattern matching sur app.current_screen
/// - Le compilateur garantit l'exhaustivité (tous les cas gérés)
///
/// # Arguments
/// * `frame` - Surface de dessin ratatui
/// * `app` - État de l'application
pub fn render(frame: &mut Frame, app: &App) {
    match app.current_screen {
        Screen::Markets => {
            render_markets(frame, app);
        }
        Screen::Detail => {
            detail::render_detail(frame, app, frame.size());
        }
        Screen::SearchInput => {
            // La liste reste visible derrière, le footer devient l'input
            render_search_input(frame, app);
        }
        Screen::SortMenu => {
            // Liste en arrière-plan + popup centré
            render_markets(frame, app);
            render_sort_menu(frame, app);
        }
        Screen::LanguageMenu => {
            render_markets(frame, app);
            render_language_menu(frame, app);
        }
    }
}

/// Dessine la vue principale (liste des marchés)
fn render_markets(frame: &mut Frame, app: &App) {
    let size = frame.size();
    let chunks = create_layout(size);

    render_header(frame, app, chunks[0]);
    render_market_list(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2]);
}

// ============================================================================
// Layout : Découpage de l'écran
// ============================================================================
// CONCEPT RATATUI : Layout
// - split() découpe un Rect en plusieurs zones
// - Constraints définissent les tailles :
//   - Length(n) : exactement n lignes/colonnes
//   - Min(n) : minimum n
// ============================================================================

/// Crée le layout principal (header, content, footer)
///
/// CONCEPT RUST : Rc<[T]> vs Vec<T>
/// - Layout::split() retourne Rc<[Rect]> (reference counted slice)
/// - On le convertit en Vec avec .to_vec() pour simplifier
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header : 3 lignes
            Constraint::Min(0),    // Content : tout le reste
            Constraint::Length(3), // Footer : 3 lignes
        ])
        .split(area)
        .to_vec()
}

/// Calcule un Rect centré pour les popups (menus)
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

// ============================================================================
// Header : Titre et statut de synchronisation
// ============================================================================

/// Dessine le header : titre + statut de sync
///
/// Le statut montre d'où viennent les données (cache ou réseau),
/// l'heure du dernier fetch et l'état de connectivité.
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.store.theme.theme;
    let locale = app.locale();

    // CONCEPT : Builder pattern
    // - Chaque méthode retourne self, permet de chaîner les appels
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent))
        .style(Style::default().bg(theme.primary_background))
        .title(format!(" {} ", t(locale, "app.title")))
        .title_alignment(Alignment::Center);

    // Ligne de statut composée de Spans colorés
    let mut spans: Vec<Span> = Vec::new();

    if app.is_loading {
        spans.push(Span::styled(
            t(locale, "markets.loading"),
            Style::default().fg(Color::Yellow),
        ));
        spans.push(Span::raw("  "));
    }

    if app.store.sync.is_online {
        let source_key = match app.store.sync.last_source {
            Some(SnapshotSource::Cache) => "markets.source.cache",
            _ => "markets.source.network",
        };
        spans.push(Span::styled(
            t(locale, source_key),
            Style::default().fg(Color::Green),
        ));
    } else {
        spans.push(Span::styled(
            t(locale, "markets.offline"),
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        ));
    }

    if let Some(fetched_at) = app.store.sync.last_fetch {
        let stamp = fetched_at.format("%H:%M:%S").to_string();
        spans.push(Span::styled(
            format!("  {}", localize_digits(locale, &stamp)),
            Style::default().fg(theme.secondary_text),
        ));
    }

    let paragraph = Paragraph::new(vec![Line::from(spans)])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Main Content : la liste des marchés
// ============================================================================

/// Dessine la liste des marchés visibles (filtrée + triée)
///
/// CONCEPT RATATUI : List widget
/// - ListItem : chaque ligne de la liste
/// - Highlight : REVERSED sur l'item sélectionné
fn render_market_list(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.store.theme.theme;
    let locale = app.locale();

    let mut title = format!(" {} ", t(locale, "markets.title"));
    if !app.store.display.search_term.is_empty() {
        title = format!(" {} /{} ", t(locale, "markets.title"), app.store.display.search_term);
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent))
        .style(Style::default().bg(theme.primary_background))
        .title(title);

    // Placeholder uniquement tant qu'aucune donnée n'est jamais arrivée.
    // Une liste vidée par le filtre reste une liste vide, pas une panne.
    if app.store.display.visible.is_empty() && app.store.sync.is_cold() {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                t(locale, "markets.no_data"),
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center);

        frame.render_widget(paragraph, area);
        return;
    }

    // CONCEPT RUST : Iterator chaining
    // - .iter().enumerate().map().collect() pour construire les lignes
    let items: Vec<ListItem> = app
        .store
        .display
        .visible
        .iter()
        .enumerate()
        .map(|(index, item)| {
            // Vert si la variation 24h est positive, rouge sinon
            let change_style = if item.is_positive() {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Red)
            };

            let change_str = match item.change_percent() {
                Some(c) => {
                    let arrow = if c >= 0.0 { "▲" } else { "▼" };
                    localize_digits(locale, &format!("{} {:+.2}%", arrow, c))
                }
                None => String::new(),
            };

            let price_str = localize_digits(
                locale,
                &format!(
                    "{} {}",
                    item.format_sell(),
                    item.quote_currency_symbol.get(locale)
                ),
            );

            let row = format!(
                " {:<8} {:<24} {:>18}  ",
                item.base_currency_symbol.get(Locale::En).to_uppercase(),
                item.display_name(locale),
                price_str,
            );

            let mut style = Style::default().fg(theme.secondary_text);
            if index == app.selected_index {
                style = style
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::REVERSED);
            }

            ListItem::new(Line::from(vec![
                Span::styled(row, style),
                Span::styled(change_str, change_style),
            ]))
        })
        .collect();

    let list = List::new(items).block(block);

    frame.render_widget(list, area);
}

// ============================================================================
// Footer : raccourcis clavier
// ============================================================================

/// Dessine le footer avec les raccourcis clavier
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.store.theme.theme;
    let locale = app.locale();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent))
        .style(Style::default().bg(theme.primary_background));

    // CONCEPT : Two-step quit
    // - Si app attend la confirmation, affiche un avertissement
    // - Sinon, affiche les raccourcis normaux
    let shortcuts = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![Span::styled(
            format!("⚠  {} ⚠", t(locale, "help.confirm_quit")),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::SLOW_BLINK),
        )])
    } else if app.is_on_detail() {
        Line::from(vec![
            key_span("[Esc]"),
            Span::raw(format!(" {}  ", t(locale, "help.back"))),
            key_span("[q]"),
            Span::raw(format!(" {}", t(locale, "help.quit"))),
        ])
    } else {
        // CONCEPT RATATUI : Spans multiples dans une Line
        // - Permet d'avoir plusieurs couleurs sur une même ligne
        Line::from(vec![
            key_span("[q]"),
            Span::raw(format!(" {}  ", t(locale, "help.quit"))),
            key_span("[↑↓/jk]"),
            Span::raw(format!(" {}  ", t(locale, "help.navigate"))),
            key_span("[Enter]"),
            Span::raw(format!(" {}  ", t(locale, "help.detail"))),
            key_span("[/]"),
            Span::raw(format!(" {}  ", t(locale, "help.search"))),
            key_span("[s]"),
            Span::raw(format!(" {}  ", t(locale, "help.sort"))),
            key_span("[t]"),
            Span::raw(format!(" {}  ", t(locale, "help.theme"))),
            key_span("[g]"),
            Span::raw(format!(" {}  ", t(locale, "help.lang"))),
            key_span("[r]"),
            Span::raw(format!(" {}", t(locale, "help.refresh"))),
        ])
    };

    let paragraph = Paragraph::new(vec![shortcuts])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Span jaune gras pour un raccourci clavier
fn key_span(label: &str) -> Span {
    Span::styled(
        label.to_string(),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )
}

// ============================================================================
// Mode recherche
// ============================================================================

/// Dessine la liste avec la ligne de recherche active en bas
///
/// CONCEPT : Modal input (Vim-like)
/// - La liste se refiltre à chaque frappe, en direct
/// - ESC ou Enter sortent du mode, le terme reste appliqué
fn render_search_input(frame: &mut Frame, app: &App) {
    let size = frame.size();
    let chunks = create_layout(size);

    render_header(frame, app, chunks[0]);
    render_market_list(frame, app, chunks[1]);
    render_search_footer(frame, app, chunks[2]);
}

/// Dessine le footer en mode recherche avec la ligne de saisie
fn render_search_footer(frame: &mut Frame, app: &App, area: Rect) {
    let locale = app.locale();
    let term = &app.store.display.search_term;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green)); // Vert = mode saisie

    let input_line = if term.is_empty() {
        Line::from(vec![
            Span::styled("/ ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::styled(
                t(locale, "markets.search_placeholder"),
                Style::default().fg(Color::DarkGray),
            ),
        ])
    } else {
        Line::from(vec![
            Span::styled("/ ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::styled(term.clone(), Style::default().fg(Color::White)),
            Span::styled(
                "█", // Curseur
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
        ])
    };

    let paragraph = Paragraph::new(vec![input_line])
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Popup : menu de tri
// ============================================================================

/// Dessine le menu de tri centré au-dessus de la liste
///
/// Quatre comparateurs + une entrée "ordre par défaut" qui annule le tri
fn render_sort_menu(frame: &mut Frame, app: &App) {
    let theme = &app.store.theme.theme;
    let locale = app.locale();

    let entry_count = SortKey::ALL.len() + 1;
    let area = centered_rect(36, entry_count as u16 + 2, frame.size());

    // Clear efface ce qui est dessiné derrière le popup
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent))
        .style(Style::default().bg(theme.card_background))
        .title(format!(" {} ", t(locale, "sort.title")));

    let items: Vec<ListItem> = SortKey::ALL
        .iter()
        .map(|key| {
            let marker = if app.store.display.sort_key == Some(*key) {
                "● "
            } else {
                "  "
            };
            format!("{}{}", marker, t(locale, key.label_key()))
        })
        .chain(std::iter::once(format!("  {}", t(locale, "sort.none"))))
        .enumerate()
        .map(|(index, label)| {
            let mut style = Style::default().fg(theme.secondary_text);
            if index == app.sort_menu_index {
                style = style
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::REVERSED);
            }
            ListItem::new(label).style(style)
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}

// ============================================================================
// Popup : menu de langue
// ============================================================================

/// Dessine le menu de langue centré au-dessus de la liste
fn render_language_menu(frame: &mut Frame, app: &App) {
    let theme = &app.store.theme.theme;
    let locale = app.locale();

    let area = centered_rect(30, SUPPORTED_LOCALES.len() as u16 + 2, frame.size());

    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent))
        .style(Style::default().bg(theme.card_background))
        .title(format!(" {} ", t(locale, "lang.title")));

    let items: Vec<ListItem> = SUPPORTED_LOCALES
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let marker = if *entry == app.store.locale { "● " } else { "  " };
            let mut style = Style::default().fg(theme.secondary_text);
            if index == app.lang_menu_index {
                style = style
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::REVERSED);
            }
            ListItem::new(format!("{}{}", marker, entry.native_name())).style(style)
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}
