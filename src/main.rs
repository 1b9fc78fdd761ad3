// ============================================================================
// LazyMarket - Listings de marchés crypto dans le terminal
// ============================================================================
// Programme TUI : liste des marchés, recherche, tri, fiche détail,
// synchronisation périodique avec repli sur le cache local
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle infinie qui gère événements et rendering
// 3. Async dans sync : tokio::runtime::Runtime dans un worker thread
// 4. RAII : restauration du terminal garantie en sortie
// ============================================================================

use std::io;
use std::sync::mpsc;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info, warn};

use lazymarket::api::HttpMarketSource;
use lazymarket::app::App;
use lazymarket::models::ListingSnapshot;
use lazymarket::storage::FileStore;
use lazymarket::store::{Action, SyncAction};
use lazymarket::sync::{Synchronizer, TcpProbe, SYNC_INTERVAL};
use lazymarket::ui::{events::EventHandler, render};

// ============================================================================
// AppCommand : Commandes pour le worker thread
// ============================================================================
// CONCEPT RUST : Command pattern avec channels
// - L'event loop envoie des commandes au worker thread
// - Le worker thread exécute les tâches async (sync réseau)
// - Communication via mpsc channels (multi-producer, single-consumer)
// ============================================================================

/// Commandes envoyées au worker thread
#[derive(Debug, Clone)]
enum AppCommand {
    /// Déclenche un sync immédiat (touche 'r')
    Refresh,
}

/// Résultats renvoyés par le worker thread
#[derive(Debug)]
enum AppResult {
    /// Un tick de sync a produit un instantané (réseau ou cache)
    SnapshotLoaded { snapshot: ListingSnapshot },

    /// Le tick a échoué : ni réseau ni cache utilisable
    SyncFailed { error: String },
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier à la place
// - Tracing : framework moderne de logging structuré
// - Rotation quotidienne automatique des logs
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// CONCEPT RUST : Tracing subscriber
/// - Registry : point central des logs
/// - Layer : transforme et route les logs
/// - EnvFilter : filtre par niveau (RUST_LOG env var)
/// - RollingFileAppender : rotation automatique
///
/// # Utilisation
/// ```bash
/// # Voir les logs en temps réel
/// tail -f ./logs/lazymarket.log
///
/// # Contrôler le niveau de log
/// RUST_LOG=debug cargo run
/// RUST_LOG=lazymarket=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = std::path::PathBuf::from("./logs");

    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    // CONCEPT : Log rotation
    // - Rotation::DAILY : nouveau fichier chaque jour
    // - Évite que les logs deviennent trop gros
    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "lazymarket.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender) // Écrit dans le fichier
                .with_ansi(false) // Pas de codes couleur dans le fichier
                .with_target(true) // Inclut le module (ex: lazymarket::sync)
                .with_thread_ids(true) // Inclut l'ID du thread (utile pour async)
                .with_line_number(true), // Inclut le numéro de ligne
        )
        .with(
            // CONCEPT : EnvFilter
            // - RUST_LOG=debug : tous les logs debug+
            // - Par défaut : debug pour lazymarket, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lazymarket=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================
// CONCEPT RUST : Async dans sync
// - main() est synchrone (pour la TUI)
// - Le sync réseau est async : il vit dans un worker thread avec son
//   propre runtime tokio
// ============================================================================

fn main() -> Result<()> {
    // Logging avant tout le reste : si init échoue, on continue quand même
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!("LazyMarket starting up");

    // Channels de communication avec le worker
    // CONCEPT RUST : mpsc channels
    // - command_tx/rx : pour envoyer des commandes au worker
    // - result_tx/rx : pour recevoir les instantanés du worker
    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    info!("Spawning background sync worker");
    spawn_sync_worker(command_rx, result_tx);

    // Setup du terminal en mode TUI
    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let mut app = App::new();
    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, command_tx, result_rx);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Background Sync Worker
// ============================================================================
// CONCEPT RUST : Background async worker avec channels
// - Thread séparé qui exécute les ticks de synchronisation
// - Tick automatique toutes les SYNC_INTERVAL secondes
// - Tick immédiat sur AppCommand::Refresh
// - Envoie les instantanés via result_tx
// ============================================================================

/// Worker thread qui exécute les ticks de sync en arrière-plan
///
/// CONCEPT RUST : Thread + async runtime
/// - std::thread::spawn() : crée un thread OS
/// - tokio::runtime::Runtime : runtime async dans ce thread
/// - recv_timeout(SYNC_INTERVAL) : horloge ET réception de commandes
///   dans le même appel, pas besoin de timer séparé
fn spawn_sync_worker(command_rx: mpsc::Receiver<AppCommand>, result_tx: mpsc::Sender<AppResult>) {
    std::thread::spawn(move || {
        // CONCEPT : Runtime per-thread
        // - block_on() bloque ce thread, jamais l'UI
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                error!(error = ?e, "Failed to create tokio runtime, sync disabled");
                return;
            }
        };

        let synchronizer = match build_synchronizer() {
            Ok(sync) => sync,
            Err(e) => {
                error!(error = ?e, "Failed to build synchronizer, sync disabled");
                let _ = result_tx.send(AppResult::SyncFailed {
                    error: e.to_string(),
                });
                return;
            }
        };

        // Premier affichage : le cache, s'il existe, arrive avant tout
        // aller-retour réseau
        if let Ok(snapshot) = synchronizer.cached_snapshot() {
            info!(items = snapshot.items.len(), "Cached listings loaded at startup");
            let _ = result_tx.send(AppResult::SnapshotLoaded { snapshot });
        }

        // Puis un premier tick immédiat
        run_tick(&runtime, &synchronizer, &result_tx);

        // Boucle : attend une commande OU l'échéance de l'intervalle
        loop {
            match command_rx.recv_timeout(SYNC_INTERVAL) {
                Ok(AppCommand::Refresh) => {
                    info!("Manual refresh requested");
                    // Draine les Refresh accumulés : un seul tick suffit
                    while let Ok(AppCommand::Refresh) = command_rx.try_recv() {}
                    run_tick(&runtime, &synchronizer, &result_tx);
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    debug!("Periodic sync tick");
                    run_tick(&runtime, &synchronizer, &result_tx);
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    // Channel fermé : l'UI s'est arrêtée
                    info!("Sync worker exiting (channel closed)");
                    break;
                }
            }
        }
    });
}

/// Construit la pile de synchronisation : source HTTP + cache + probe
fn build_synchronizer() -> Result<Synchronizer<HttpMarketSource, FileStore, TcpProbe>> {
    let source = HttpMarketSource::from_env()?;
    let probe = TcpProbe::from_base_url(source.base_url())?;
    let store = FileStore::in_data_dir()?;
    Ok(Synchronizer::new(source, store, probe))
}

/// Exécute un tick et relaie le résultat vers l'UI
fn run_tick(
    runtime: &tokio::runtime::Runtime,
    synchronizer: &Synchronizer<HttpMarketSource, FileStore, TcpProbe>,
    result_tx: &mpsc::Sender<AppResult>,
) {
    match runtime.block_on(synchronizer.tick()) {
        Ok(Some(snapshot)) => {
            let _ = result_tx.send(AppResult::SnapshotLoaded { snapshot });
        }
        Ok(None) => {
            // Un tick était déjà en cours : celui-ci est sauté
            debug!("Tick skipped, another sync in flight");
        }
        Err(e) => {
            warn!(error = %e, "Sync tick failed");
            let _ = result_tx.send(AppResult::SyncFailed {
                error: e.to_string(),
            });
        }
    }
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// CONCEPT : Event Loop Pattern
// - Loop infinie : while app.is_running()
// - À chaque itération :
//   1. Traiter les résultats du worker (update)
//   2. Dessiner l'interface (render)
//   3. Traiter les événements clavier (input)
// ============================================================================

/// Exécute la boucle principale de l'application
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    command_tx: mpsc::Sender<AppCommand>,
    result_rx: mpsc::Receiver<AppResult>,
) -> Result<()> {
    while app.is_running() {
        // ========================================
        // 1. UPDATE : Traite les résultats du worker
        // ========================================
        // CONCEPT : Non-blocking receive avec try_recv
        // - try_recv() ne bloque jamais la boucle de rendu
        match result_rx.try_recv() {
            Ok(AppResult::SnapshotLoaded { snapshot }) => {
                info!(
                    items = snapshot.items.len(),
                    source = snapshot.source.label(),
                    "Applying snapshot"
                );
                app.stop_loading();
                app.dispatch(Action::Sync(SyncAction::SnapshotApplied(snapshot)));
            }
            Ok(AppResult::SyncFailed { error }) => {
                error!(error = %error, "Sync failed");
                app.stop_loading();
                app.dispatch(Action::Sync(SyncAction::SyncFailed(error)));
            }
            Err(mpsc::TryRecvError::Empty) => {
                // Pas de résultat, c'est normal
            }
            Err(mpsc::TryRecvError::Disconnected) => {
                // Worker mort : l'UI continue sur les dernières données
                warn!("Sync worker disconnected");
            }
        }

        // ========================================
        // 2. RENDER : Dessine l'interface
        // ========================================
        terminal.draw(|frame| render(frame, app))?;

        // ========================================
        // 3. INPUT : Traite les événements
        // ========================================
        if let Ok(event) = events.next() {
            handle_event(app, event, &command_tx);
        }
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================
// CONCEPT : Event Handler Pattern
// - Sépare la logique de gestion des événements
// - Navigation contextuelle selon l'écran actuel
// ============================================================================

/// Traite un événement et met à jour l'état de l'application
///
/// CONCEPT RUST : Pattern matching avec guards
/// - Guard clauses (if) pour filtrer selon l'écran courant
/// - Le même caractère a un sens différent en mode recherche
fn handle_event(app: &mut App, event: lazymarket::ui::events::Event, command_tx: &mpsc::Sender<AppCommand>) {
    use lazymarket::ui::events::{
        get_char_from_event, is_backspace_event, is_down_event, is_enter_event, is_escape_event,
        is_home_event, is_language_event, is_quit_event, is_refresh_event, is_search_char_event,
        is_search_event, is_sort_event, is_theme_event, is_up_event, Event,
    };

    match event {
        // ========================================
        // Mode recherche : la saisie capture tout
        // ========================================
        Event::Key(_) if app.is_searching() => {
            if is_escape_event(&event) || is_enter_event(&event) {
                // Le terme reste appliqué en sortant
                debug!(term = %app.store.display.search_term, "Search input closed");
                app.end_search();
            } else if is_backspace_event(&event) {
                app.search_pop();
            } else if is_search_char_event(&event) {
                if let Some(c) = get_char_from_event(&event) {
                    app.search_push(c);
                }
            }
        }

        // ========================================
        // Menu de tri
        // ========================================
        Event::Key(_) if app.is_on_sort_menu() => {
            if is_escape_event(&event) {
                app.close_sort_menu();
            } else if is_up_event(&event) {
                app.sort_menu_previous();
            } else if is_down_event(&event) {
                app.sort_menu_next();
            } else if is_enter_event(&event) {
                app.sort_menu_select();
                debug!(sort = ?app.store.display.sort_key, "Sort selected");
            }
        }

        // ========================================
        // Menu de langue
        // ========================================
        Event::Key(_) if app.is_on_language_menu() => {
            if is_escape_event(&event) {
                app.close_language_menu();
            } else if is_up_event(&event) {
                app.lang_menu_previous();
            } else if is_down_event(&event) {
                app.lang_menu_next();
            } else if is_enter_event(&event) {
                app.lang_menu_select();
                info!(locale = app.locale().code(), "Locale changed");
            }
        }

        // ========================================
        // Touches globales (liste et détail)
        // ========================================
        Event::Key(_) if is_quit_event(&event) => {
            // CONCEPT : Two-step confirmation
            // - Première pression : active confirm_quit
            // - Deuxième pression : quit réel
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        Event::Key(_) if is_escape_event(&event) && app.is_on_detail() => {
            app.cancel_quit();
            debug!("User returned to market list");
            app.show_markets();
        }

        // Navigation dans la liste
        Event::Key(_) if is_up_event(&event) && app.is_on_markets() => {
            app.cancel_quit();
            app.navigate_up();
        }
        Event::Key(_) if is_down_event(&event) && app.is_on_markets() => {
            app.cancel_quit();
            app.navigate_down();
        }
        Event::Key(_) if is_home_event(&event) && app.is_on_markets() => {
            app.cancel_quit();
            app.scroll_to_top();
        }

        // Enter : fiche détail du marché sélectionné
        Event::Key(_) if is_enter_event(&event) && app.is_on_markets() => {
            app.cancel_quit();
            if let Some(item) = app.selected_item() {
                info!(pair_id = item.pair_id, "User opened market detail");
            }
            app.show_detail();
        }

        // '/' : mode recherche
        Event::Key(_) if is_search_event(&event) && app.is_on_markets() => {
            app.cancel_quit();
            app.start_search();
        }

        // 's' : menu de tri
        Event::Key(_) if is_sort_event(&event) && app.is_on_markets() => {
            app.cancel_quit();
            app.open_sort_menu();
        }

        // 'g' : menu de langue
        Event::Key(_) if is_language_event(&event) && app.is_on_markets() => {
            app.cancel_quit();
            app.open_language_menu();
        }

        // 't' : bascule du thème sombre
        Event::Key(_) if is_theme_event(&event) => {
            app.cancel_quit();
            app.toggle_dark_mode();
            debug!(dark = app.store.theme.is_dark_mode, "Theme toggled");
        }

        // 'r' : sync immédiat
        Event::Key(_) if is_refresh_event(&event) => {
            app.cancel_quit();
            app.start_loading();
            info!("User requested refresh");
            let _ = command_tx.send(AppCommand::Refresh);
        }

        Event::Tick => {
            // Tick régulier : rien à faire, le rendu suit la boucle
        }

        Event::Key(_) => {
            // Toute autre touche : annule la confirmation de quit si active
            app.cancel_quit();
        }

        _ => {
            // Autres événements : ignorés
        }
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// CONCEPT RUST : Terminal raw mode
// - Raw mode : on reçoit tous les caractères directement
// - Alternate screen : écran secondaire (ne pollue pas l'historique)
// - Crossterm gère tout ça de manière cross-platform
//
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

/// Configure le terminal en mode TUI
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    // CONCEPT : Raw mode
    // - Pas de buffering ligne par ligne, contrôle total sur l'affichage
    enable_raw_mode()?;

    // CONCEPT : Alternate screen
    // - Écran secondaire qui ne pollue pas l'historique
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);

    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
///
/// CONCEPT : Cleanup et RAII
/// - Appelé dans main() même en cas d'erreur
/// - Restaure le terminal pour ne pas le laisser cassé
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;

    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;

    terminal.show_cursor()?;

    Ok(())
}
