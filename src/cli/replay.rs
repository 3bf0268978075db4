use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;
use serde_json::Value;
use tokio::fs;
use tracing::{info, warn};
use wd_actions::testing::{RecordedEvent, RecordingHost};
use wd_actions::{ActionSession, CenterMode, Point, Viewport};

use crate::config::CliConfig;

#[derive(Args, Clone, Debug)]
pub struct ReplayArgs {
    /// Action chain file: `{"actions": [...], "elements": {...}, "then": [...]}`
    /// or a bare array of action sequences
    pub file: PathBuf,

    /// Release everything still held once the chain completed
    #[arg(long)]
    pub release: bool,

    /// Resolve element origins with legacy element coordinates
    #[arg(long)]
    pub legacy_origin: bool,

    /// Viewport of the recording host, e.g. 1024x768
    #[arg(long, value_parser = parse_viewport)]
    pub viewport: Option<Viewport>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReplayScript {
    Sequences(Vec<Value>),
    Document(ReplayDocument),
}

#[derive(Debug, Deserialize)]
struct ReplayDocument {
    actions: Value,
    /// Element centre points keyed by element reference
    #[serde(default)]
    elements: HashMap<String, Point>,
    /// Further chains dispatched on the same session, in order
    #[serde(default)]
    then: Vec<Value>,
}

impl ReplayScript {
    fn into_parts(self) -> (Vec<Value>, HashMap<String, Point>) {
        match self {
            ReplayScript::Sequences(sequences) => (vec![Value::Array(sequences)], HashMap::new()),
            ReplayScript::Document(document) => {
                let mut chains = Vec::with_capacity(document.then.len() + 1);
                chains.push(document.actions);
                chains.extend(document.then);
                (chains, document.elements)
            }
        }
    }
}

pub async fn cmd_replay(args: ReplayArgs, config: &CliConfig) -> Result<()> {
    let content = fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let script: ReplayScript = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", args.file.display()))?;
    let (chains, elements) = script.into_parts();

    let viewport = args.viewport.unwrap_or(config.viewport);
    let host = RecordingHost::new(viewport);
    for (element, center) in elements {
        host.add_element(element, center, center);
    }

    let session = ActionSession::new(config.actions.clone());
    let center_mode = if args.legacy_origin {
        CenterMode::Legacy
    } else {
        session.config().center_mode()
    };
    info!(
        session = %session.id(),
        chains = chains.len(),
        %viewport,
        "replaying action chains"
    );

    let mut outcome = Ok(());
    for payload in &chains {
        outcome = session.dispatch_with(payload, &host, center_mode).await;
        if outcome.is_err() {
            break;
        }
    }
    if outcome.is_ok() && args.release {
        outcome = session.release_pending_actions(&host).await;
    }

    print_events(&host.events())?;

    if let Err(err) = outcome {
        warn!(code = err.code(), "replay stopped");
        let code = err.code();
        return Err(anyhow::Error::new(err).context(format!("webdriver error: {code}")));
    }
    Ok(())
}

fn print_events(events: &[RecordedEvent]) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for event in events {
        serde_json::to_writer(&mut out, event)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

fn parse_viewport(raw: &str) -> Result<Viewport, String> {
    let (width, height) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {raw:?}"))?;
    let width = width
        .trim()
        .parse::<i64>()
        .map_err(|err| format!("invalid width: {err}"))?;
    let height = height
        .trim()
        .parse::<i64>()
        .map_err(|err| format!("invalid height: {err}"))?;
    if width <= 0 || height <= 0 {
        return Err(format!("viewport must be positive, got {raw:?}"));
    }
    Ok(Viewport::new(width, height))
}
