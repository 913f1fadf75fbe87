//! Live-tweak console entry point.
mod command;
mod config;
mod session;

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use config::TweakConfig;
use datahub::{ScopeSchema, registry};
use datahub_content::{ScopeLoader, builtin_unittest};
use session::{Flow, Session};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = TweakConfig::from_env().with_schema_arg(std::env::args().nth(1));
    let _guard = setup_logging(config.log_dir.as_deref())?;

    for schema in load_schemas(config.schema.as_deref())? {
        registry::register(&schema)
            .with_context(|| format!("Failed to register scope '{}'", schema.name()))?;
    }

    run(&config)
}

fn run(config: &TweakConfig) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    let mut session = Session::new(config.echo);

    writeln!(
        stdout,
        "datahub-tweak: scopes [{}]; type `help` for commands",
        registry::names().join(", ")
    )?;
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read command")?;
        let flow = session.handle_line(&line, &mut stdout)?;
        stdout.flush()?;
        if flow == Flow::Quit {
            break;
        }
    }
    Ok(())
}

fn load_schemas(source: Option<&Path>) -> Result<Vec<ScopeSchema>> {
    match source {
        None => {
            tracing::info!("no schema configured; using built-in unittest scope");
            Ok(vec![builtin_unittest()?])
        }
        Some(path) if path.is_dir() => ScopeLoader::load_dir(path),
        Some(path) => Ok(vec![ScopeLoader::load(path)?]),
    }
}

/// Setup logging to stderr, or to `datahub-tweak.log` inside `log_dir`.
///
/// The returned guard flushes the file writer when dropped.
fn setup_logging(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let Some(log_dir) = log_dir else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
        return Ok(None);
    };

    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    let file_appender = tracing_appender::rolling::never(log_dir, "datahub-tweak.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking_file)
                .with_ansi(false),
        )
        .init();

    tracing::info!("Log file: {}/datahub-tweak.log", log_dir.display());
    Ok(Some(guard))
}
