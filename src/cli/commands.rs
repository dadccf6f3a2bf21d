use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::{autopilot, render};
use crate::config::game::GameConfig;
use crate::config::layout::BoardLayout;
use crate::session::statistics::{OrchardStatistics, compute_statistics};
use crate::session::{EndReason, Session};

/// How a driven game finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Won,
    Drowned,
    Poisoned,
    OutOfTime,
    Quit,
}

impl Outcome {
    /// Classify an ended (or abandoned) session.
    pub fn of(session: &Session, max_generations: u64) -> Outcome {
        if session.goal_met() {
            return Outcome::Won;
        }
        match session.end_reason() {
            Some(EndReason::GoalMet) => Outcome::Won,
            Some(EndReason::Drowned) => Outcome::Drowned,
            Some(EndReason::Poisoned) => Outcome::Poisoned,
            Some(EndReason::Stopped) if session.generation() > max_generations => {
                Outcome::OutOfTime
            }
            Some(EndReason::Stopped) | None => Outcome::Quit,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Outcome::Won => "YOU WON :D",
            Outcome::Drowned => "YOU LOST :( (drowned in a pond)",
            Outcome::Poisoned => "YOU LOST :( (ate spoiled fruit)",
            Outcome::OutOfTime => "YOU LOST :( (out of generations)",
            Outcome::Quit => "Game abandoned",
        }
    }
}

/// Result of a headless autopilot run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub seed: u64,
    pub outcome: Outcome,
    pub generations: u64,
    pub moves: u32,
    pub collected: BTreeMap<String, u32>,
    pub statistics: OrchardStatistics,
}

/// Build the session a command runs on: an explicit layout if given,
/// otherwise a random board from the config.
fn build_session(
    config: &GameConfig,
    layout_path: Option<&str>,
    rng: &mut ChaCha8Rng,
) -> Result<Session, String> {
    match layout_path {
        Some(path) => {
            let layout = BoardLayout::from_file(Path::new(path))?;
            let cells = layout.to_cells()?;
            Session::new_from_board(&cells, layout.player_x, layout.player_y)
                .map_err(|e| format!("{}: {}", path, e))
        }
        None => Session::new_random(&config.board_params(), rng).map_err(|e| e.to_string()),
    }
}

/// Advance one generation and end the session once the cap is passed.
fn tick(session: &mut Session, rng: &mut ChaCha8Rng, max_generations: u64) {
    session.advance_generation(rng);
    if session.generation() > max_generations {
        session.end();
    }
}

/// Generate a random board from config and print it with its statistics.
pub fn generate(config: &GameConfig) -> Result<(), String> {
    let seed = config.resolve_seed();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let session = build_session(config, None, &mut rng)?;
    let stats = compute_statistics(&session);

    println!("=== Orchard (seed {}) ===", seed);
    print!("{}", render::render_board(&session));
    println!();
    println!(
        "Size: {}x{}  Trees: {}  Ponds: {}",
        session.width(),
        session.height(),
        stats.trees,
        stats.ponds
    );
    for (kind, count) in &stats.trees_by_kind {
        println!("  {:<12} {:>5}", kind, count);
    }
    Ok(())
}

enum Input {
    Step(i32, i32),
    Wait,
    Quit,
    Unknown,
}

fn parse_input(line: &str) -> Input {
    match line.trim() {
        "w" | "k" => Input::Step(0, -1),
        "s" | "j" => Input::Step(0, 1),
        "a" | "h" => Input::Step(-1, 0),
        "d" | "l" => Input::Step(1, 0),
        "" => Input::Wait,
        "q" | "quit" => Input::Quit,
        _ => Input::Unknown,
    }
}

/// Interactive line-based game. Generations advance on wall-clock time,
/// caught up whenever the player enters a command.
pub fn play(config: &GameConfig, layout_path: Option<&str>) -> Result<(), String> {
    let seed = config.resolve_seed();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut session = build_session(config, layout_path, &mut rng)?;
    info!(seed, "Starting interactive game");

    let period = Duration::from_secs(config.seconds_per_generation);
    tick(&mut session, &mut rng, config.max_generations);
    let mut last_tick = Instant::now();

    println!(
        "Collect {} of each fruit. Move with w/a/s/d (or h/j/k/l), Enter to wait, q to quit.",
        crate::session::MIN_GOAL_PER_TYPE
    );
    println!(
        "A new generation arrives every {} seconds; ripe fruit (uppercase) spoils (x) after one.",
        config.seconds_per_generation
    );
    draw(&session, config.max_generations)?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.map_err(|e| format!("Cannot read input: {}", e))?;

        while last_tick.elapsed() >= period && !session.is_ended() {
            tick(&mut session, &mut rng, config.max_generations);
            last_tick += period;
        }

        if !session.is_ended() {
            match parse_input(&line) {
                Input::Step(dx, dy) => {
                    let (x, y) = session.player().position();
                    session.move_to(x + dx, y + dy);
                }
                Input::Wait => {}
                Input::Quit => session.end(),
                Input::Unknown => println!("Unknown command '{}'", line.trim()),
            }
        }

        draw(&session, config.max_generations)?;
        if session.is_ended() {
            break;
        }
    }

    println!("{}", Outcome::of(&session, config.max_generations).message());
    Ok(())
}

fn draw(session: &Session, max_generations: u64) -> Result<(), String> {
    let mut out = io::stdout().lock();
    write!(
        out,
        "\n{}{}\n> ",
        render::render_board(session),
        render::status_line(session, max_generations)
    )
    .and_then(|_| out.flush())
    .map_err(|e| format!("Cannot write output: {}", e))
}

/// Run the autopilot until the session ends or runs out of generations.
pub fn run_autopilot(
    session: &mut Session,
    rng: &mut ChaCha8Rng,
    moves_per_generation: u32,
    max_generations: u64,
) -> u32 {
    let mut moves = 0;
    tick(session, rng, max_generations);
    while !session.is_ended() {
        for _ in 0..moves_per_generation {
            if session.is_ended() {
                break;
            }
            match autopilot::next_step(session, rng) {
                Some((x, y)) => {
                    session.move_to(x, y);
                    moves += 1;
                }
                None => break,
            }
        }
        if !session.is_ended() {
            tick(session, rng, max_generations);
        }
    }
    moves
}

/// Headless autopilot game; prints a summary or JSON.
pub fn simulate(config: &GameConfig, layout_path: Option<&str>, json: bool) -> Result<(), String> {
    let seed = config.resolve_seed();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut session = build_session(config, layout_path, &mut rng)?;
    info!(seed, "Starting autopilot run");

    let moves = run_autopilot(
        &mut session,
        &mut rng,
        config.moves_per_generation,
        config.max_generations,
    );
    let outcome = Outcome::of(&session, config.max_generations);
    if outcome != Outcome::Won {
        warn!(?outcome, generation = session.generation(), "Autopilot did not reach the goal");
    }

    let summary = SimulationSummary {
        seed,
        outcome,
        generations: session.generation(),
        moves,
        collected: session
            .ledger()
            .iter()
            .map(|(kind, count)| (kind.to_string(), count))
            .collect(),
        statistics: compute_statistics(&session),
    };

    if json {
        let text = serde_json::to_string_pretty(&summary)
            .map_err(|e| format!("Cannot encode summary: {}", e))?;
        println!("{}", text);
    } else {
        print!("{}", render::render_board(&session));
        println!("{}", render::status_line(&session, config.max_generations));
        println!(
            "Seed {}: {} after {} moves",
            summary.seed,
            outcome.message(),
            summary.moves
        );
    }
    Ok(())
}
