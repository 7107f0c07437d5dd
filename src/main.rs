use std::path::PathBuf;

use anyhow::{bail, Result};
use tracing_subscriber::EnvFilter;

use comment_stream::app;

fn main() {
    match parse_args() {
        Ok(Some(options)) => {
            if let Err(err) = start(options) {
                eprintln!("error: {err:?}");
                std::process::exit(1);
            }
        }
        Ok(None) => {}
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(2);
        }
    }
}

fn start(options: app::Options) -> Result<()> {
    let cfg = app::load_config(&options)?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.log.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    app::run(options, &cfg)
}

/// Returns `None` when a flag was handled and there is nothing to replay.
fn parse_args() -> Result<Option<app::Options>> {
    let mut options = app::Options::default();
    let mut events = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("Comment Stream {}", comment_stream::VERSION);
                return Ok(None);
            }
            "--help" | "-h" => {
                println!(
                    "Comment Stream - replay a recorded comment session.\n\n  comment-stream [--config <file>] <events.jsonl>\n\n  --config,  -c <file>  Config file (default {})\n  --version, -V        Show version and exit\n  --help,    -h        Show this help message",
                    app::default_config_display()
                );
                return Ok(None);
            }
            "--config" | "-c" => {
                let Some(path) = args.next() else {
                    bail!("--config needs a file path");
                };
                options.config_file = Some(PathBuf::from(path));
            }
            flag if flag.starts_with('-') => bail!("unknown flag {flag}"),
            path => {
                if events.replace(PathBuf::from(path)).is_some() {
                    bail!("only one event log can be replayed at a time");
                }
            }
        }
    }

    let Some(events) = events else {
        bail!("missing event log; see --help");
    };
    options.events = events;
    Ok(Some(options))
}
