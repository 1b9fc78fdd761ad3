// ============================================================================
// Detail - Fiche détaillée d'un marché
// ============================================================================
// Affiche le marché sélectionné : prix, statistiques 24h, actions
//
// CONCEPTS RATATUI :
// 1. Layout imbriqué : la fiche découpe sa zone en sections
// 2. Paragraph multi-lignes : composition de Lines et Spans
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::i18n::{localize_digits, t, Locale};
use crate::models::{currency, MarketItem};

/// Valeur affichée quand une donnée manque (catalogue absent, champ vide)
const MISSING: &str = "—";

/// Dessine la fiche détail du marché sélectionné
///
/// Si la sélection a disparu entre-temps (refresh qui a vidé la liste),
/// on retombe sur un écran vide avec le placeholder de liste.
pub fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.store.theme.theme;
    let locale = app.locale();

    let Some(item) = app.selected_item() else {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.accent));
        let paragraph = Paragraph::new(t(locale, "markets.no_data"))
            .block(block)
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // En-tête : nom + symbole
            Constraint::Length(4), // Prix vente / achat
            Constraint::Min(0),    // Statistiques 24h
            Constraint::Length(3), // Actions
        ])
        .split(area)
        .to_vec();

    render_detail_header(frame, app, item, chunks[0]);
    render_prices(frame, app, item, chunks[1]);
    render_stats(frame, app, item, chunks[2]);
    render_actions(frame, app, chunks[3]);
}

/// En-tête : nom traduit, symbole, nom du catalogue si disponible
fn render_detail_header(frame: &mut Frame, app: &App, item: &MarketItem, area: Rect) {
    let theme = &app.store.theme.theme;
    let locale = app.locale();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent))
        .style(Style::default().bg(theme.primary_background));

    // Le catalogue n'est disponible qu'après un sync réseau :
    // sur un démarrage depuis le cache, on dégrade en "—"
    let catalog_name = app
        .store
        .sync
        .currencies
        .as_ref()
        .and_then(|catalog| currency::lookup(catalog, item.base_currency_symbol.get(Locale::En)))
        .map(|info| info.name.get(locale))
        .unwrap_or(MISSING);

    let text = vec![
        Line::from(vec![
            Span::styled(
                item.display_name(locale).to_string(),
                Style::default()
                    .fg(theme.secondary_text)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(
                    "  {}",
                    item.base_currency_symbol.get(Locale::En).to_uppercase()
                ),
                Style::default().fg(Color::Cyan),
            ),
        ]),
        Line::from(Span::styled(
            catalog_name.to_string(),
            Style::default().fg(Color::Gray),
        )),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Prix de vente et d'achat, formatés avec séparateurs de milliers
fn render_prices(frame: &mut Frame, app: &App, item: &MarketItem, area: Rect) {
    let theme = &app.store.theme.theme;
    let locale = app.locale();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent))
        .style(Style::default().bg(theme.primary_background));

    let quote = item.quote_currency_symbol.get(locale);

    let text = vec![
        Line::from(vec![
            Span::styled(
                format!("{}: ", t(locale, "detail.sell_price")),
                Style::default().fg(Color::Gray),
            ),
            Span::styled(
                localize_digits(locale, &format!("{} {}", item.format_sell(), quote)),
                Style::default()
                    .fg(theme.secondary_text)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled(
                format!("{}: ", t(locale, "detail.buy_price")),
                Style::default().fg(Color::Gray),
            ),
            Span::styled(
                localize_digits(locale, &format!("{} {}", item.format_buy(), quote)),
                Style::default()
                    .fg(theme.secondary_text)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Statistiques des dernières 24h
///
/// Les champs connus (variation, volume) sont typés ; les champs
/// supplémentaires du flux sont relayés tels quels, clé -> valeur.
fn render_stats(frame: &mut Frame, app: &App, item: &MarketItem, area: Rect) {
    let theme = &app.store.theme.theme;
    let locale = app.locale();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent))
        .style(Style::default().bg(theme.primary_background))
        .title(" 24h ");

    let mut lines: Vec<Line> = Vec::new();

    let change = match item.change_percent() {
        Some(c) => {
            let style = if c >= 0.0 {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Red)
            };
            Span::styled(localize_digits(locale, &format!("{:+.2}%", c)), style)
        }
        None => Span::styled(MISSING, Style::default().fg(Color::Gray)),
    };
    lines.push(Line::from(vec![
        Span::styled(
            format!("{}: ", t(locale, "sort.changes")),
            Style::default().fg(Color::Gray),
        ),
        change,
    ]));

    let volume = match item.base_volume() {
        Some(v) => localize_digits(locale, &format!("{:.2}", v)),
        None => MISSING.to_string(),
    };
    lines.push(Line::from(vec![
        Span::styled(
            format!("{}: ", t(locale, "sort.volume")),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(volume, Style::default().fg(theme.secondary_text)),
    ]));

    if let Some(financial) = &item.financial {
        for (key, value) in &financial.last24h.extra {
            let rendered = match value {
                serde_json::Value::Number(n) => localize_digits(locale, &n.to_string()),
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{}: ", key), Style::default().fg(Color::Gray)),
                Span::styled(rendered, Style::default().fg(theme.secondary_text)),
            ]));
        }
    }

    // Paramètres du marché, sous les statistiques 24h
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(
            format!("{}: ", t(locale, "detail.precision")),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(
            localize_digits(locale, &item.base_precision.to_string()),
            Style::default().fg(theme.secondary_text),
        ),
    ]));
    lines.push(Line::from(vec![
        Span::styled(
            format!("{}: ", t(locale, "detail.step")),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(
            localize_digits(locale, &item.amount_step.to_string()),
            Style::default().fg(theme.secondary_text),
        ),
    ]));

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}

/// Rangée d'actions : Deposit / Transfer / Exchange / Withdraw
///
/// Boutons d'affichage uniquement, aucune transaction n'est câblée
fn render_actions(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.store.theme.theme;
    let locale = app.locale();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent))
        .style(Style::default().bg(theme.primary_background));

    let button = |key: &str| {
        Span::styled(
            format!("[ {} ]  ", t(locale, key)),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
    };

    let line = Line::from(vec![
        button("detail.deposit"),
        button("detail.transfer"),
        button("detail.exchange"),
        button("detail.withdraw"),
    ]);

    let paragraph = Paragraph::new(vec![line])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
