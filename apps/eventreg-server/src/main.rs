use anyhow::{anyhow, Context, Result};
use api_ingress::{build_openapi, ApiIngress, ApiIngressConfig};
use clap::{Parser, Subcommand};
use db::{ConnectOpts, DbHandle};
use event_registration::{EventRegistration, EventRegistrationConfig};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const API_INGRESS: &str = "api_ingress";

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps "sqlite::memory:" as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if dsn.eq_ignore_ascii_case("sqlite::memory:") || dsn.eq_ignore_ascii_case("sqlite://:memory:")
    {
        return Ok("sqlite::memory:".to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if let Some(dir) = p.parent() {
        if create_dirs {
            std::fs::create_dir_all(dir)?;
        }
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

/// EventReg Server - event catalog and capacity-bounded registration
#[derive(Parser)]
#[command(name = "eventreg-server")]
#[command(about = "EventReg Server - event catalog and capacity-bounded registration")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Normalized home_dir is applied inside
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("EventReg Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config).await,
    }
}

/// Detect DB backend from URL scheme.
fn detect_from_dsn(cfg: &DatabaseConfig) -> Result<&'static str> {
    let raw = cfg.url.trim().to_owned();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }
    if raw.eq_ignore_ascii_case("sqlite::memory:") {
        return Ok("sqlite");
    }

    let url = Url::parse(&raw).map_err(|e| anyhow!("Invalid database DSN '{}': {}", raw, e))?;

    match url.scheme() {
        "sqlite" => Ok("sqlite"),
        "postgres" | "postgresql" => Ok("postgres"),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

/// Ingress section with `bind_addr` filled from `server` when unset or when
/// `--port` was given.
fn ingress_config(config: &AppConfig, args: &CliArgs) -> Result<ApiIngressConfig> {
    let mut ingress: ApiIngressConfig = config.module_config(API_INGRESS)?;
    if ingress.bind_addr.trim().is_empty() || args.port.is_some() {
        ingress.bind_addr = format!("{}:{}", config.server.host, config.server.port);
    }
    Ok(ingress)
}

async fn connect_db(db_config: &DatabaseConfig, base_dir: &Path) -> Result<DbHandle> {
    let backend = detect_from_dsn(db_config)?;

    let mut dsn = db_config.url.trim().to_owned();
    if dsn.starts_with("sqlite://") {
        dsn = absolutize_sqlite_dsn(&dsn, base_dir, true)?;
    }

    let connect_opts = ConnectOpts {
        max_conns: db_config.max_conns,
        acquire_timeout: Some(Duration::from_secs(5)),
        sqlite_busy_timeout: db_config
            .busy_timeout_ms
            .map(|ms| Duration::from_millis(u64::from(ms))),
        create_sqlite_dirs: true,
        ..Default::default()
    };

    tracing::info!(backend, dsn = %dsn, "Connecting to database");
    let db = DbHandle::connect(&dsn, connect_opts)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected DB backend: {:?}", db.engine());
    Ok(db)
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Initializing modules...");

    let db_config = config
        .database
        .clone()
        .context("Database configuration is required")?;
    let db = connect_db(&db_config, Path::new(&config.server.home_dir)).await?;

    let module_cfg: EventRegistrationConfig = config.module_config(EventRegistration::NAME)?;
    let module = EventRegistration::new();
    module.migrate(&db).await?;
    module.init(&module_cfg, &db);

    let ingress = ApiIngress::new(ingress_config(&config, &args)?);
    let router = ingress.build_router(module.router()?, build_openapi([module.openapi()]));

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Shutdown signal received"),
            Err(e) => tracing::error!(error = %e, "Failed to listen for shutdown signal"),
        }
        on_signal.cancel();
    });

    ingress.serve(router, cancel).await?;
    db.close().await;
    tracing::info!("EventReg Server stopped");
    Ok(())
}

async fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    if let Some(db) = &config.database {
        detect_from_dsn(db)?;
    }
    let _: EventRegistrationConfig = config.module_config(EventRegistration::NAME)?;
    let _: ApiIngressConfig = config.module_config(API_INGRESS)?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use db::DbEngine;

    #[test]
    fn relative_sqlite_paths_resolve_under_home() {
        let dsn = absolutize_sqlite_dsn("sqlite://db/app.db?mode=rwc", Path::new("/srv/eventreg"), false)
            .unwrap();
        assert_eq!(dsn, "sqlite:///srv/eventreg/db/app.db?mode=rwc");
        assert_eq!(
            absolutize_sqlite_dsn("sqlite://:memory:", Path::new("/x"), false).unwrap(),
            "sqlite::memory:"
        );
        assert!(absolutize_sqlite_dsn("sqlite://", Path::new("/x"), false).is_err());
    }

    #[test]
    fn dsn_schemes() {
        let cfg = |url: &str| DatabaseConfig {
            url: url.to_string(),
            max_conns: None,
            busy_timeout_ms: None,
        };
        assert_eq!(detect_from_dsn(&cfg("sqlite::memory:")).unwrap(), "sqlite");
        assert_eq!(detect_from_dsn(&cfg("postgres://u@h/db")).unwrap(), "postgres");
        assert!(detect_from_dsn(&cfg("mysql://h/db")).is_err());
        assert!(detect_from_dsn(&cfg("  ")).is_err());

        // The pool opener must accept whatever passes here.
        for dsn in [
            "sqlite::memory:",
            "sqlite://db/app.db",
            "sqlite3://db/app.db",
            "postgres://u@h/db",
            "postgresql://u@h/db",
        ] {
            let engine = DbHandle::detect(dsn).ok().map(|e| match e {
                DbEngine::Sqlite => "sqlite",
                DbEngine::Postgres => "postgres",
            });
            assert_eq!(detect_from_dsn(&cfg(dsn)).ok(), engine, "{dsn}");
        }
    }

    #[tokio::test]
    async fn postgres_dsns_reach_the_driver() {
        let cfg = DatabaseConfig {
            url: "postgres://u:p@127.0.0.1:1/x".to_string(),
            max_conns: Some(1),
            busy_timeout_ms: None,
        };
        let err = match connect_db(&cfg, Path::new(".")).await {
            Ok(_) => panic!("nothing listens on port 1"),
            Err(e) => format!("{e:#}"),
        };
        assert!(err.starts_with("Failed to connect to database"), "{err}");
        assert!(!err.contains("Feature not enabled"), "{err}");
    }

    #[test]
    fn bind_addr_follows_server_section() {
        let mut config = AppConfig::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 9123;
        let ingress = ingress_config(&config, &CliArgs::default()).unwrap();
        assert_eq!(ingress.bind_addr, "127.0.0.1:9123");

        config.modules.insert(
            API_INGRESS.to_string(),
            serde_json_value(r#"{"bind_addr": "0.0.0.0:8000"}"#),
        );
        assert_eq!(
            ingress_config(&config, &CliArgs::default()).unwrap().bind_addr,
            "0.0.0.0:8000"
        );
        let with_port = CliArgs {
            port: Some(9123),
            ..Default::default()
        };
        assert_eq!(
            ingress_config(&config, &with_port).unwrap().bind_addr,
            "127.0.0.1:9123"
        );
    }

    fn serde_json_value(raw: &str) -> serde_json::Value {
        serde_json::from_str(raw).unwrap()
    }
}
