//! `lemvue`: terminal client for browsing and moderating Lemmy instances.
//!
//! Built on [ratatui](https://ratatui.rs) over the view models in
//! `lemvue-core`. Every screen is a routed view:
//!
//! - **Feed** (`/`, `/c/<name>`): posts with cursor paging, sort and listing
//!   filters, votes, and read marks.
//! - **Post** (`/post/<id>`): the post and its comment tree.
//! - **Inbox, Modlog, Communities, Multi-communities, Applications**: the
//!   remaining list views, each with its own filters.
//!
//! The start route is fetched before the first paint and adopted by the
//! mounted view without a second request. Logs go to a file (default
//! `/tmp/lemvue.log`) so they never corrupt the terminal.
//!
//! Entry point: CLI argument parsing, tracing setup, panic hooks, and app launch.

mod action;
mod app;
mod component;
mod event;
mod loader;
mod navigator;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use secrecy::SecretString;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use lemvue_core::{
    AuthCredentials, Instance, InstanceConfig, MemoryStorage, Route, Services, prefetch,
};

use crate::app::App;

/// Terminal client for Lemmy.
#[derive(Parser, Debug)]
#[command(name = "lemvue", version, about)]
struct Cli {
    /// Instance URL (e.g., https://lemmy.ml). Overrides the profile.
    #[arg(short = 'i', long, env = "LEMVUE_INSTANCE")]
    instance: Option<String>,

    /// Session token to sign in with when using --instance
    #[arg(long, env = "LEMVUE_JWT", hide_env_values = true)]
    jwt: Option<String>,

    /// Config profile to use (defaults to the config's default profile)
    #[arg(short = 'p', long)]
    profile: Option<String>,

    /// Save --instance as a named profile in the config file, then start
    #[arg(long, value_name = "NAME", requires = "instance")]
    save_profile: Option<String>,

    /// Route to open at startup (e.g., /c/rust?sort=New, /inbox)
    #[arg(short = 'r', long)]
    route: Option<String>,

    /// Log file path (defaults to /tmp/lemvue.log)
    #[arg(long, default_value = "/tmp/lemvue.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. Nothing may log to stdout/stderr while the
/// terminal is in raw mode. The returned guard flushes logs on drop.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "lemvue={log_level},lemvue_core={log_level},lemvue_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("lemvue.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// What the command line and config file settled on.
struct Startup {
    instance: InstanceConfig,
    start_route: String,
}

/// Build the instance config from `--instance`, if given.
fn config_from_flags(
    cli: &Cli,
    defaults: &lemvue_config::Defaults,
) -> Result<Option<InstanceConfig>> {
    let Some(raw) = cli.instance.as_deref() else {
        return Ok(None);
    };
    let profile = lemvue_config::Profile {
        instance: raw.to_owned(),
        ..lemvue_config::Profile::default()
    };
    let mut config = lemvue_config::profile_to_instance_config(&profile, "cli", defaults)?;
    if let Some(jwt) = &cli.jwt {
        config.auth = AuthCredentials::Jwt(SecretString::from(jwt.clone()));
    }
    Ok(Some(config))
}

/// Write `--instance` into the config file under `name`. Tokens are not
/// written; sign in again or point `jwt_env` at one.
fn save_profile(cfg: &mut lemvue_config::Config, name: &str, instance: &str) -> Result<()> {
    cfg.insert_profile(
        name,
        lemvue_config::Profile {
            instance: instance.to_owned(),
            ..lemvue_config::Profile::default()
        },
    );
    lemvue_config::save_config(cfg).wrap_err("could not save the config file")?;
    info!(profile = name, path = %lemvue_config::config_path().display(), "profile saved");
    Ok(())
}

/// Priority: CLI flags > config profile.
fn resolve_startup(cli: &Cli) -> Result<Startup> {
    let mut cfg = lemvue_config::load_config().unwrap_or_else(|e| {
        warn!(error = %e, "config unreadable, using defaults");
        lemvue_config::Config::default()
    });

    if let (Some(name), Some(instance)) = (&cli.save_profile, &cli.instance) {
        save_profile(&mut cfg, name, instance)?;
    }

    let instance = match config_from_flags(cli, &cfg.defaults)? {
        Some(config) => config,
        None => {
            let (name, profile) = cfg.profile(cli.profile.as_deref()).map_err(|e| {
                eyre!(
                    "{e}\n\nPass --instance <url> or add a profile to {}",
                    lemvue_config::config_path().display()
                )
            })?;
            lemvue_config::profile_to_instance_config(profile, name, &cfg.defaults)
                .wrap_err_with(|| format!("profile '{name}' is invalid"))?
        }
    };

    Ok(Startup {
        instance,
        start_route: cli
            .route
            .clone()
            .unwrap_or_else(|| cfg.defaults.start_route.clone()),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks go in before the terminal changes mode
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    let startup = resolve_startup(&cli)?;
    let route: Route = startup
        .start_route
        .parse()
        .wrap_err("invalid start route")?;

    info!(url = %startup.instance.url, route = %route, "starting lemvue");

    let storage = Arc::new(MemoryStorage::new());
    let instance = Instance::new(startup.instance, Services::new(), storage)?;

    if let Err(e) = instance.connect().await {
        warn!(error = %e, "connect failed, continuing without a session");
    }

    let payload = match prefetch(&instance, &route).await {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, route = %route, "initial prefetch failed");
            None
        }
    };

    let mut app = App::new(instance, route, payload);
    app.run().await?;

    Ok(())
}
