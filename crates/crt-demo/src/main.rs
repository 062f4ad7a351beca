//! Interactive CRT Chaos session: engine, full puzzle roster, and terminal
//! presentation wired together behind a small line-oriented REPL.

use std::io::{self, BufRead, Write};
use std::time::Instant;

use tracing_subscriber::EnvFilter;

use crt_core::{
    register_all, ChaosEngine, FileProgress, PuzzleBay, PuzzleInput, Watchdog,
};
use crt_puzzles::{deposit_all, ALL_PUZZLE_IDS};
use crt_tty::TtyPresenter;

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let now = Instant::now();
    let mut engine = ChaosEngine::new(
        Box::new(FileProgress::default_location()),
        Box::new(TtyPresenter::new()),
        now,
    );

    let mut bay = PuzzleBay::new();
    deposit_all(&mut bay);
    let registered = register_all(&mut bay, &mut engine);
    let mut watchdog = Watchdog::new(ALL_PUZZLE_IDS.len(), now);
    tracing::info!(registered, level = engine.chaos_level(), "session started");

    println!("CRT CHAOS — the session is unstable. Solve all puzzles to fix it.");
    println!("Commands: open <id> | say <text> | pick <choice> | close | calm | stop | reset | status | quit");

    let stdin = io::stdin();
    let mut open: Option<String> = None;

    loop {
        let now = Instant::now();
        watchdog.poll(&mut bay, &mut engine, now);
        engine.tick(now);
        if engine.is_stable() {
            println!("The session is stable. Nothing left to fix.");
        }

        match &open {
            Some(id) => print!("{id}> "),
            None => print!("> "),
        }
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));

        match cmd {
            "" => {
                // A blank line just lets time pass.
                if let Some(id) = open.clone() {
                    if let Some(puzzle) = engine.puzzle_mut(&id) {
                        puzzle.handle(PuzzleInput::Tick);
                    }
                }
            }
            "open" => {
                let id = rest.trim();
                if engine.activate_puzzle(id) {
                    open = Some(id.to_string());
                    println!("opened {id}");
                } else {
                    println!("no such puzzle: {id}");
                    println!("known: {}", ALL_PUZZLE_IDS.join(", "));
                }
            }
            "say" | "pick" => match open.clone() {
                Some(id) => {
                    let input = if cmd == "say" {
                        PuzzleInput::Text(rest.trim().to_string())
                    } else {
                        PuzzleInput::Select(rest.trim().to_string())
                    };
                    if let Some(puzzle) = engine.puzzle_mut(&id) {
                        puzzle.handle(input);
                    }
                }
                None => println!("open a puzzle first"),
            },
            "close" => {
                if let Some(id) = open.take() {
                    engine.close_puzzle(&id);
                    println!("closed {id}");
                }
            }
            "calm" => engine.calm_down(now),
            "stop" => engine.stop_all_glitches(now),
            "reset" => {
                print!("wipe all progress? type 'yes' to confirm: ");
                io::stdout().flush()?;
                let mut answer = String::new();
                stdin.lock().read_line(&mut answer)?;
                if answer.trim().eq_ignore_ascii_case("yes") {
                    open = None;
                    engine.emergency_reset(Instant::now());
                } else {
                    println!("reset cancelled");
                }
            }
            "status" => {
                println!(
                    "chaos {:.1} | theme {} | solved {}/{}",
                    engine.chaos_level(),
                    engine.theme(),
                    engine.solved_count(),
                    engine.registry_len()
                );
                let unsolved = engine.unsolved_ids();
                if !unsolved.is_empty() {
                    println!("unsolved: {}", unsolved.join(", "));
                }
            }
            "quit" | "exit" => break,
            other => println!("unknown command: {other}"),
        }
    }

    Ok(())
}
