//! Tutorial Capture — screenshot on every click, stitched into an HTML
//! walkthrough.
//!
//! This is the app shell that wires together:
//! - Global pointer listener (input.rs)
//! - Screen capture domain (capture/)
//! - Recording session and its output directory (session/)
//! - Tutorial page rendering (tutorial.rs)

pub mod capture;
pub mod config;
pub mod input;
pub mod session;
pub mod tutorial;

use config::CaptureConfig;
use session::{CaptureSession, PointerEvent};
use std::future::Future;
use std::io::{self, BufRead};
use std::pin::{pin, Pin};
use tokio::sync::{mpsc, oneshot};

type AppResult = Result<(), Box<dyn std::error::Error>>;

/// Entry point — called by the binary.
///
/// Waits for ENTER, records until Ctrl+C, then writes the tutorial page.
/// Ctrl+C at any point, including the start prompt, is a normal shutdown.
pub fn run() -> AppResult {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = CaptureConfig::from_env();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(app(config))
}

async fn app(config: CaptureConfig) -> AppResult {
    // One listener for the whole run, registered before the prompt.
    let mut interrupt = pin!(interrupted());

    print_banner();
    println!("\nPress ENTER to start capturing...");

    match wait_for_start(read_enter(), interrupt.as_mut()).await? {
        Prompt::Start => record(config, interrupt).await,
        Prompt::Interrupted => {
            println!("\nCapture stopped. No screenshots captured.");
            println!("\nGoodbye!");
            Ok(())
        }
    }
}

fn print_banner() {
    let rule = "=".repeat(60);
    println!("{}", rule);
    println!("Tutorial Screenshot Capturer");
    println!("{}", rule);
    println!("\nCommands:");
    println!("  Press ENTER to start capturing");
    println!("  Press Ctrl+C to stop and generate HTML");
    println!("{}", rule);
}

/// Resolves on the first Ctrl+C.
///
/// If the handler cannot be installed this never resolves, leaving the
/// default signal action in place.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("[SESSION] Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Reads one line from stdin on a detached thread.
///
/// The thread is not joined, so an interrupt during the prompt does not
/// wait on a blocked read.
async fn read_enter() -> io::Result<()> {
    let (tx, rx) = oneshot::channel();
    std::thread::Builder::new()
        .name("start-prompt".into())
        .spawn(move || {
            let mut line = String::new();
            let _ = tx.send(io::stdin().lock().read_line(&mut line).map(|_| ()));
        })?;
    rx.await
        .unwrap_or_else(|_| Err(io::Error::other("start prompt reader exited")))
}

#[derive(Debug, PartialEq, Eq)]
enum Prompt {
    Start,
    Interrupted,
}

async fn wait_for_start<S, I>(start: S, interrupt: Pin<&mut I>) -> io::Result<Prompt>
where
    S: Future<Output = io::Result<()>>,
    I: Future<Output = ()>,
{
    tokio::select! {
        biased;
        _ = interrupt => Ok(Prompt::Interrupted),
        line = start => line.map(|()| Prompt::Start),
    }
}

/// Feeds pointer events to the session until interrupted or the listener
/// goes away.
async fn pump_events<I>(
    session: &mut CaptureSession,
    events: &mut mpsc::UnboundedReceiver<PointerEvent>,
    mut interrupt: Pin<&mut I>,
) where
    I: Future<Output = ()>,
{
    loop {
        tokio::select! {
            biased;
            _ = interrupt.as_mut() => break,
            event = events.recv() => match event {
                Some(event) => {
                    session.on_click(event);
                }
                None => {
                    log::warn!("[INPUT] Pointer listener exited — stopping");
                    break;
                }
            },
        }
    }
}

async fn record<I>(config: CaptureConfig, interrupt: Pin<&mut I>) -> AppResult
where
    I: Future<Output = ()>,
{
    let mut session = CaptureSession::for_primary_display(config);
    session.start()?;

    if let Some(dir) = session.session_dir() {
        println!("\nCapture started!");
        println!("Screenshots will be saved to: {}", dir.display());
        println!("Click anywhere to capture screenshots");
        println!("Press Ctrl+C to stop capturing\n");
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    input::spawn_listener(tx)?;

    pump_events(&mut session, &mut rx, interrupt).await;

    match session.stop().await? {
        Some(summary) => match summary.tutorial {
            Some(page) => {
                println!(
                    "\nCapture stopped. Total screenshots: {}",
                    summary.capture_count
                );
                println!("Tutorial HTML generated: {}", page.display());
                println!("Open it in your browser to view all screenshots");
            }
            None => println!("\nCapture stopped. No screenshots captured."),
        },
        None => log::warn!("[SESSION] Session was not capturing"),
    }

    println!("\nGoodbye!");
    Ok(())
}
