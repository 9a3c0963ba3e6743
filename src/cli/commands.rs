use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::cli::input::{parse_line, Input, HELP};
use crate::config::simulation::SimulationConfig;
use crate::content::ContentProvider;
use crate::customers::OrderDraft;
use crate::garden::{GameState, PlotStatus};
use crate::persistence::{self, SaveStore};
use crate::progression::level_params;
use crate::simulation::events::{short_id, GameEvent};
use crate::simulation::{Simulation, TickRules};

/// Share of customer arrivals that prompt a tutor hint.
const ARRIVAL_HINT_CHANCE: f64 = 0.3;

/// Run an interactive session: load or start a garden, then tick, read
/// commands, seat customers and autosave until the player quits.
pub async fn run_session(config: &SimulationConfig, fresh: bool) -> Result<(), String> {
    let store = SaveStore::new(&config.save_directory, config.max_saves as usize);
    let seed = if config.rng_seed == 0 {
        rand::random()
    } else {
        config.rng_seed
    };
    let rules = TickRules::from(config);

    let loaded = if fresh { None } else { store.load() };
    let mut saved_revision = loaded.as_ref().map(|_| 0);
    let mut sim = match loaded {
        Some(state) => {
            info!(day = state.day, tick = state.tick_count, "Loaded garden from {}", config.save_directory);
            Simulation::new(state, rules, seed)
        }
        None => {
            info!(seed, "Starting a new garden");
            Simulation::fresh(rules, seed)
        }
    };

    let provider = Arc::new(ContentProvider::from_config(config));
    info!(provider = provider.name(), "Content provider ready");
    let delays = (
        config.customer_delay_min_ms,
        config.customer_delay_max_ms.max(config.customer_delay_min_ms),
    );

    let (draft_tx, mut draft_rx) = mpsc::channel::<(u8, OrderDraft)>(4);
    let (hint_tx, mut hint_rx) = mpsc::channel::<String>(8);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let mut ticker = interval(config.tick_interval()?);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut autosave = interval(config.autosave_interval()?);
    autosave.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    println!("Mendel's Pea Garden. Type `help` for commands.\n");
    print_status(sim.state());
    print_instruction(sim.state());

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let result = sim.tick();
                if let Some(context) = report(&result.events, sim.state()) {
                    request_hint(context, sim.draw_seed(), &provider, &hint_tx);
                }
                request_customer(&mut sim, &provider, &draft_tx, delays);
            }
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        warn!(error = %e, "Cannot read stdin");
                        break;
                    }
                };
                match parse_line(&line, sim.state()) {
                    Ok(None) => {}
                    Ok(Some(Input::Quit)) => break,
                    Ok(Some(Input::Help)) => println!("{}", HELP),
                    Ok(Some(Input::Status)) => print_status(sim.state()),
                    Ok(Some(Input::Save)) => {
                        save(&store, &sim, &mut saved_revision);
                    }
                    Ok(Some(Input::Game(command))) => match sim.apply(command) {
                        Ok(events) => {
                            if let Some(context) = report(&events, sim.state()) {
                                request_hint(context, sim.draw_seed(), &provider, &hint_tx);
                            }
                            request_customer(&mut sim, &provider, &draft_tx, delays);
                        }
                        Err(rejection) => println!("Can't do that: {}", rejection),
                    },
                    Err(e) => println!("{}", e),
                }
            }
            Some((level, draft)) = draft_rx.recv() => {
                if let Some(events) = sim.merge_customer(level, draft) {
                    if let Some(context) = report(&events, sim.state()) {
                        if sim.chance(ARRIVAL_HINT_CHANCE) {
                            request_hint(context, sim.draw_seed(), &provider, &hint_tx);
                        }
                    }
                }
            }
            Some(hint) = hint_rx.recv() => {
                println!("  Mendel: {}", hint);
            }
            _ = autosave.tick() => {
                if saved_revision != Some(sim.revision()) {
                    save(&store, &sim, &mut saved_revision);
                }
            }
            _ = &mut shutdown => {
                println!();
                info!("Shutdown signal received");
                break;
            }
        }
    }

    if saved_revision != Some(sim.revision()) {
        save(&store, &sim, &mut saved_revision);
    }
    info!(day = sim.state().day, tick = sim.state().tick_count, "Session ended");
    Ok(())
}

fn save(store: &SaveStore, sim: &Simulation, saved_revision: &mut Option<u64>) {
    match store.save(&sim.snapshot()) {
        Ok(path) => {
            *saved_revision = Some(sim.revision());
            info!(path = %path.display(), "Garden saved");
        }
        Err(e) => warn!(error = %e, "Save failed"),
    }
}

/// Kick off an order request if the shop has room. The draft comes back on
/// `tx` after the arrival delay.
fn request_customer(
    sim: &mut Simulation,
    provider: &Arc<ContentProvider>,
    tx: &mpsc::Sender<(u8, OrderDraft)>,
    (min_ms, max_ms): (u64, u64),
) {
    let Some(request) = sim.customer_request() else {
        return;
    };
    let provider = Arc::clone(provider);
    let tx = tx.clone();
    tokio::spawn(async move {
        let mut rng = ChaCha8Rng::seed_from_u64(request.rng_seed);
        let delay = rng.gen_range(min_ms..=max_ms);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        let draft = provider.customer_order(request.level, rng.r#gen()).await;
        // A closed channel means the session is over.
        let _ = tx.send((request.level, draft)).await;
    });
}

/// Print events and the next tutorial instruction. Returns the context for
/// a tutor hint if anything hint-worthy happened.
fn report(events: &[GameEvent], state: &GameState) -> Option<String> {
    for event in events {
        println!("* {}", event);
        if let GameEvent::CustomerArrived { customer } = event {
            if let Some(c) = state.customers.iter().find(|c| c.id == *customer) {
                println!("  {} wants {}: \"{}\"", c.name, c.requirements.summary(), c.description);
            }
        }
        if matches!(event, GameEvent::TutorialAdvanced { .. } | GameEvent::GameReset) {
            print_instruction(state);
        }
    }

    events.iter().find_map(GameEvent::hint_context)
}

fn request_hint(
    context: String,
    seed: u64,
    provider: &Arc<ContentProvider>,
    hints: &mpsc::Sender<String>,
) {
    let provider = Arc::clone(provider);
    let hints = hints.clone();
    tokio::spawn(async move {
        let hint = provider.tutor_hint(&context, seed).await;
        let _ = hints.send(hint).await;
    });
}

fn print_instruction(state: &GameState) {
    if let Some(text) = state.tutorial_step.instruction() {
        println!("  [Tutorial {}] {}", state.tutorial_step.get(), text);
    }
}

/// Print the whole shop: wallet, seeds, plots and waiting customers.
pub fn print_status(state: &GameState) {
    let params = level_params(state.level());
    println!(
        "Day {} | Coins {} | Reputation {} | Level {}{}",
        state.day,
        state.money,
        state.reputation,
        params.level,
        if state.is_paused { " | PAUSED" } else { "" }
    );

    println!("Seeds:");
    if state.inventory.is_empty() {
        println!("  (none)");
    }
    for seed in &state.inventory {
        let genotype = if seed.is_revealed {
            seed.genotype.to_string()
        } else {
            "????".to_string()
        };
        println!(
            "  {} {} {:<5} {}{}",
            if state.selected_seed_id == Some(seed.id) { ">" } else { " " },
            short_id(&seed.id),
            genotype,
            seed.phenotype.label(),
            if seed.is_tester { " (tester)" } else { "" }
        );
    }

    println!("Plots:");
    for plot in &state.plots {
        if plot.is_locked {
            println!("  [{}] locked, unlock for {} coins", plot.id, plot.unlock_price);
            continue;
        }
        let parents: Vec<String> = [&plot.parent1, &plot.parent2]
            .into_iter()
            .flatten()
            .map(|s| short_id(&s.id))
            .collect();
        let detail = match plot.status {
            PlotStatus::Empty => "empty".to_string(),
            PlotStatus::Planted => format!("planted: {}", parents.join(" x ")),
            PlotStatus::Growing => format!("growing {}%: {}", plot.progress, parents.join(" x ")),
            PlotStatus::Ready => "ready to harvest".to_string(),
        };
        println!("  [{}] {}", plot.id, detail);
    }

    println!("Customers ({}/{}):", state.customers.len(), params.max_customers);
    for c in &state.customers {
        println!(
            "  {} {:<20} {:<28} {:>3}/{}s  {} coins",
            short_id(&c.id),
            c.name,
            c.requirements.summary(),
            c.time_left,
            c.max_time,
            c.reward
        );
    }
}

/// Show the newest valid save without starting a session.
pub fn inspect(config: &SimulationConfig) -> Result<(), String> {
    let dir = Path::new(&config.save_directory);
    let state = persistence::load_latest_valid_snapshot(dir)
        .map_err(|e| format!("Failed to load save: {}", e))?;
    println!("=== Garden (tick {}) ===", state.tick_count);
    print_status(&state);
    if let Some(text) = state.tutorial_step.instruction() {
        println!("Tutorial step {}: {}", state.tutorial_step.get(), text);
    }
    Ok(())
}
