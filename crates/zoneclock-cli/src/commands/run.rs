//! Foreground focus session.
//!
//! Events are printed to stdout as one JSON object per line. Single-letter
//! commands on stdin drive the session: `p` pause, `r` resume, `s` stop,
//! `k` skip break, `q` quit.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};
use zoneclock_core::ports::{audio_for, notifier_for};
use zoneclock_core::{AppState, Config, CoreError, Event, FocusRuntime, TimerEngine};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

enum Flow {
    Continue,
    Quit,
}

pub fn run(minutes: Option<u32>, config: &Config) -> CliResult<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(session(minutes, config))
}

async fn session(minutes: Option<u32>, config: &Config) -> CliResult<()> {
    let session = super::open_session(config)?;
    if session.state() == AppState::Uninitialized {
        return Err("onboarding not completed; run `zoneclock-cli onboard` first".into());
    }

    let engine = TimerEngine::new(
        notifier_for(config.notifications.backend),
        audio_for(config.audio.backend),
    );
    let (focus, events) = FocusRuntime::new(session, engine);
    focus.start(minutes).await?;

    let result = drive(&focus, events).await;
    focus.shutdown().await;
    result
}

async fn drive(focus: &FocusRuntime, mut events: UnboundedReceiver<Event>) -> CliResult<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                println!("{}", serde_json::to_string(&event)?);
                if is_terminal(&event) {
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => {
                match line? {
                    Some(line) => {
                        if let Flow::Quit = command(focus, line.trim()).await? {
                            flush(&mut events)?;
                            break;
                        }
                    }
                    None => stdin_open = false,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                stop(focus).await?;
                flush(&mut events)?;
                break;
            }
        }
    }
    Ok(())
}

/// Print whatever is already queued, e.g. the stop event.
fn flush(events: &mut UnboundedReceiver<Event>) -> CliResult<()> {
    while let Ok(event) = events.try_recv() {
        println!("{}", serde_json::to_string(&event)?);
    }
    Ok(())
}

fn is_terminal(event: &Event) -> bool {
    matches!(
        event,
        Event::BreakCompleted { .. } | Event::BreakSkipped { .. } | Event::TimerStopped { .. }
    )
}

async fn command(focus: &FocusRuntime, input: &str) -> CliResult<Flow> {
    let result = match input {
        "" => return Ok(Flow::Continue),
        "p" => focus.pause().await,
        "r" => focus.resume().await,
        "s" => focus.stop().await.map(|_| ()),
        "k" => focus.skip_break().await,
        "q" => {
            stop(focus).await?;
            return Ok(Flow::Quit);
        }
        other => {
            eprintln!("unknown command '{other}' (p pause, r resume, s stop, k skip, q quit)");
            return Ok(Flow::Continue);
        }
    };

    match result {
        Ok(()) => Ok(Flow::Continue),
        // wrong-phase commands are reported, the session keeps running
        Err(CoreError::InvalidState(message)) => {
            eprintln!("{message}");
            Ok(Flow::Continue)
        }
        Err(e) => Err(e.into()),
    }
}

/// Stop whatever is running; idle is not an error here.
async fn stop(focus: &FocusRuntime) -> CliResult<()> {
    match focus.stop().await {
        Ok(_) | Err(CoreError::InvalidState(_)) => Ok(()),
        Err(e) => {
            warn!(error = %e, "stop failed");
            Err(e.into())
        }
    }
}
