//! Event loop over stdin.
//!
//! Each input line is a JSON object such as `{"event": "config-changed"}`.
//! Events are handled strictly one after another; a bad line or a failed
//! pass is reported and the loop continues.

use anyhow::Result;
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::cli::commands::action::ActionOutput;
use crate::cli::commands::event::pass_output;
use crate::cli::output::output_line;
use crate::cli::runtime::OperatorRuntime;
use crate::domain::models::{Dispatched, LifecycleEvent, OperatorConfig};

#[derive(Debug, Deserialize)]
struct EventLine {
    event: LifecycleEvent,
}

/// Parse one input line. Blank lines yield `None`.
fn parse_line(line: &str) -> Option<Result<LifecycleEvent, serde_json::Error>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    Some(serde_json::from_str::<EventLine>(line).map(|parsed| parsed.event))
}

pub async fn execute(config: OperatorConfig, json_mode: bool) -> Result<()> {
    let mut runtime = OperatorRuntime::new(config).await?;
    let stdin = BufReader::new(tokio::io::stdin());
    run(&mut runtime, stdin, json_mode).await
}

async fn run<R>(runtime: &mut OperatorRuntime, reader: R, json_mode: bool) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    info!("waiting for events on stdin");

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, shutting down");
                break;
            }
        };
        let Some(line) = line else {
            info!("input closed, shutting down");
            break;
        };

        let event = match parse_line(&line) {
            None => continue,
            Some(Ok(event)) => event,
            Some(Err(err)) => {
                warn!(error = %err, "ignoring malformed event line");
                continue;
            }
        };

        match runtime.handle(event).await {
            Ok(Dispatched::Pass(outcome)) => output_line(
                &pass_output(event, outcome, runtime.controller().status()),
                json_mode,
            ),
            Ok(Dispatched::Action(result)) => output_line(&ActionOutput::from(&result), json_mode),
            Err(err) => warn!(event = %event, error = %format!("{err:#}"), "event not handled"),
        }
    }
    Ok(())
}
