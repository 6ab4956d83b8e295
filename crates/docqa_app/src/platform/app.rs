use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use docqa_core::{update, AppState, Msg};
use docqa_logging::{docqa_debug, docqa_info, set_loop_turn, LogDestination};

use super::cli::Args;
use super::config::AppConfig;
use super::effects::EffectRunner;
use super::ui::commands::{parse_line, ConsoleCommand, ParseError, HELP};
use super::ui::render::Renderer;

/// Everything the session loop reacts to.
enum LoopEvent {
    Dispatch(Msg),
    Show,
    /// Console input closed or `quit` typed.
    Quit,
}

pub fn run_app(args: Args) -> anyhow::Result<()> {
    let destination = if args.log_to_terminal {
        LogDestination::Both
    } else {
        LogDestination::File
    };
    docqa_logging::initialize(destination, args.log_level(), &args.log_file);

    let config = AppConfig::load(args.config.as_deref()).context("loading configuration")?;
    let settings = config.client_settings(args.backend_url.clone());
    let session = config.session_config();

    let (loop_tx, loop_rx) = mpsc::channel::<LoopEvent>();
    let engine_tx = loop_tx.clone();
    let runner = EffectRunner::new(settings, move |msg| {
        engine_tx.send(LoopEvent::Dispatch(msg)).is_ok()
    })
    .context("starting backend engine")?;

    spawn_console_reader(loop_tx.clone());
    println!("{HELP}");

    let mut state = AppState::with_config(session);
    let mut renderer = Renderer::default();
    let mut turn: u64 = 0;
    let _ = loop_tx.send(LoopEvent::Dispatch(Msg::SessionStarted));

    while let Ok(event) = loop_rx.recv() {
        turn += 1;
        set_loop_turn(turn);

        let (msg, full_render) = match event {
            LoopEvent::Dispatch(msg) => (msg, false),
            LoopEvent::Show => (Msg::Tick, true),
            LoopEvent::Quit => (Msg::SessionEnded, false),
        };
        let ending = matches!(msg, Msg::SessionEnded);

        let (next, effects) = update(state, msg);
        state = next;
        runner.enqueue(effects);

        let dirty = state.consume_dirty();
        if full_render {
            print_lines(&renderer.render_full(&state.view()));
        } else if dirty {
            print_lines(&renderer.render(&state.view()));
        }

        if ending {
            break;
        }
    }

    docqa_info!("Session ended after {} turns", turn);
    runner.shutdown();
    Ok(())
}

fn spawn_console_reader(tx: mpsc::Sender<LoopEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let event = match parse_line(&line) {
                Ok(ConsoleCommand::Dispatch(msg)) => LoopEvent::Dispatch(msg),
                Ok(ConsoleCommand::Show) => LoopEvent::Show,
                Ok(ConsoleCommand::Help) => {
                    println!("{HELP}");
                    continue;
                }
                Ok(ConsoleCommand::Quit) => break,
                Err(ParseError::Empty) => continue,
                Err(err) => {
                    println!("{err}");
                    continue;
                }
            };
            if tx.send(event).is_err() {
                return;
            }
        }
        docqa_debug!("console input closed");
        let _ = tx.send(LoopEvent::Quit);
    });
}

fn print_lines(lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in lines {
        let _ = writeln!(out, "{line}");
    }
    let _ = out.flush();
}
