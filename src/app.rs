use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use crossbeam_channel::{unbounded, Receiver};
use tracing::{debug, info};

use crate::channel::OutboundRequest;
use crate::config::{self, Config};
use crate::event::Inbound;
use crate::format::PlainFormatter;
use crate::session::SessionController;
use crate::view::TerminalView;

#[derive(Debug, Clone, Default)]
pub struct Options {
    pub events: PathBuf,
    pub config_file: Option<PathBuf>,
}

pub fn load_config(options: &Options) -> Result<Config> {
    config::load(config::LoadOptions {
        config_file: options.config_file.clone(),
        env_prefix: None,
    })
    .context("load config")
}

/// Replays a recorded event log through a controller painting to stdout.
pub fn run(options: Options, cfg: &Config) -> Result<()> {
    let file = File::open(&options.events)
        .with_context(|| format!("open event log {}", options.events.display()))?;
    let stdout = io::stdout();
    let summary = replay(BufReader::new(file), cfg, stdout.lock())?;
    info!(
        events = summary.events,
        requests = summary.requests,
        "replay finished"
    );
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub events: usize,
    pub requests: usize,
}

/// Feeds one JSON event per line into a fresh controller. Blank lines and
/// lines starting with `#` are skipped. Reply requests the controller emits
/// are echoed as `-> requestReplies <id>`.
pub fn replay<R: BufRead, W: Write>(input: R, cfg: &Config, out: W) -> Result<Summary> {
    let (tx, rx) = unbounded();
    let mut controller = SessionController::new(
        cfg.display.clone(),
        Box::new(PlainFormatter),
        TerminalView::new(out),
        tx,
    );
    let mut summary = Summary::default();

    for (number, line) in input.lines().enumerate() {
        let line = line.with_context(|| format!("read event log line {}", number + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let event: Inbound = serde_json::from_str(trimmed)
            .with_context(|| format!("parse event on line {}", number + 1))?;
        controller.handle(event);
        summary.events += 1;
        summary.requests += echo_requests(&rx, &mut controller)?;
    }

    let (view, _) = controller.into_parts();
    view.into_inner().flush().context("flush output")?;
    Ok(summary)
}

fn echo_requests<W: Write>(
    rx: &Receiver<OutboundRequest>,
    controller: &mut SessionController<TerminalView<W>, crossbeam_channel::Sender<OutboundRequest>>,
) -> Result<usize> {
    let mut sent = 0;
    while let Ok(request) = rx.try_recv() {
        let OutboundRequest::RequestReplies { parent_id } = request;
        debug!(%parent_id, "reply request emitted");
        controller
            .view_mut()
            .write_line(&format!("-> requestReplies {parent_id}"))
            .context("write request echo")?;
        sent += 1;
    }
    Ok(sent)
}

pub fn default_config_display() -> String {
    friendly_path(config::default_path().as_deref())
}

fn friendly_path(path: Option<&Path>) -> String {
    if let Some(path) = path {
        if let Some(home) = dirs::home_dir() {
            if let Ok(stripped) = path.strip_prefix(&home) {
                let mut display = String::from("~");
                if !stripped.as_os_str().is_empty() {
                    display.push_str(&format!("/{}", stripped.display()));
                }
                return display;
            }
        }
        path.display().to_string()
    } else {
        "~/.config/comment-stream/config.yaml".to_string()
    }
}
