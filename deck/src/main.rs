//! demodeck - timed sorter and user explorer
//!
//! CLI entry point: runs the TUI, the pagination proxy, or one-off commands.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use eyre::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use demodeck::cli::{Cli, Command, OutputFormat, get_log_path};
use demodeck::config::Config;
use demodeck::server::{ProxyServer, create_listener};
use demodeck::tui;
use demodeck::upstream::{PageRequest, UserPage, UserSource, create_source};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(upstream = %config.upstream.base_url, "demodeck loaded config");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        None => {
            let source = create_source(&config.upstream)?;
            tui::run(&config, source).await
        }
        Some(Command::Serve { host, port }) => {
            let source = create_source(&config.upstream)?;
            cmd_serve(config, host, port, source).await
        }
        Some(Command::Fetch { limit, skip, format }) => {
            let source = create_source(&config.upstream)?;
            cmd_fetch(source.as_ref(), PageRequest::new(limit, skip), format).await
        }
        Some(Command::Logs { lines }) => cmd_logs(lines),
    }
}

async fn cmd_serve(
    mut config: Config,
    host: Option<String>,
    port: Option<u16>,
    source: Arc<dyn UserSource>,
) -> Result<()> {
    debug!(?host, ?port, "cmd_serve: called");
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let (listener, addr) = create_listener(config.server.socket_addr()?).await?;
    println!("Proxy listening on http://{}/api/data (Ctrl+C to stop)", addr);
    info!(%addr, "Proxy server started");

    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
    let server = tokio::spawn(ProxyServer::new(source).serve(listener, shutdown_rx));

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            _ = sigint.recv() => warn!("SIGINT received"),
            _ = sigterm.recv() => warn!("SIGTERM received"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        warn!("Ctrl+C received");
    }

    let _ = shutdown_tx.send(()).await;
    server.await.context("Proxy server task panicked")??;
    info!("Proxy server shut down");
    Ok(())
}

async fn cmd_fetch(source: &dyn UserSource, request: PageRequest, format: OutputFormat) -> Result<()> {
    debug!(?request, %format, "cmd_fetch: called");
    match format {
        OutputFormat::Json => {
            let body = source.fetch_raw(request).await?;
            let value: serde_json::Value = serde_json::from_slice(&body)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            let page = source.fetch_page(request).await?;
            print!("{}", format_page(&page, request));
        }
    }
    Ok(())
}

fn format_page(page: &UserPage, request: PageRequest) -> String {
    let mut out = format!(
        "{:<5} {:<24} {:<32} {:<16} {:>3}\n",
        "ID", "NAME", "EMAIL", "USERNAME", "AGE"
    );
    for user in &page.users {
        out.push_str(&format!(
            "{:<5} {:<24} {:<32} {:<16} {:>3}\n",
            user.id,
            user.full_name(),
            user.email,
            user.username,
            user.age
        ));
    }
    let limit = request.limit.max(1);
    out.push_str(&format!(
        "\nPage {} of {} ({} users)\n",
        page.skip / limit + 1,
        page.total.div_ceil(limit),
        page.total
    ));
    out
}

fn cmd_logs(lines: usize) -> Result<()> {
    debug!(lines, "cmd_logs: called");
    let log_path: PathBuf = get_log_path();

    if !log_path.exists() {
        println!("No log file found at: {}", log_path.display());
        return Ok(());
    }

    let file = fs::File::open(&log_path).context("Failed to open log file")?;
    let all_lines: Vec<String> = BufReader::new(file).lines().map_while(Result::ok).collect();
    let start = all_lines.len().saturating_sub(lines);
    for line in &all_lines[start..] {
        println!("{}", line);
    }

    Ok(())
}
