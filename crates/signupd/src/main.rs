// # signupd - Signup Registry Daemon
//
// This is a THIN integration layer: all registration logic lives in
// signup-core. The daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing the runtime
// 3. Wiring roster source, record store, audit log, and mail transport
//    into the signup engine
// 4. Serving the HTTP router until shutdown
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// - `SIGNUP_BIND`: HTTP bind address (default 127.0.0.1:8080)
// - `SIGNUP_ROSTER_PATH`: Path to the externally-refreshed roster JSON
// - `SIGNUP_STORE_TYPE`: Record store type (file, memory)
// - `SIGNUP_RECORDS_DIR`: Records directory (for the file store)
// - `SIGNUP_AUDIT_LOG`: Optional audit log path (file store only)
// - `SIGNUP_MAILER_TYPE`: Mail transport (http, log)
// - `SIGNUP_MAILER_URL`: Mail gateway endpoint (for the http mailer)
// - `SIGNUP_LOG_LEVEL`: trace|debug|info|warn|error (default info)
//
// ## Example
//
// ```bash
// export SIGNUP_BIND=0.0.0.0:8080
// export SIGNUP_ROSTER_PATH=/etc/signup/roster.json
// export SIGNUP_STORE_TYPE=file
// export SIGNUP_RECORDS_DIR=/var/lib/signup/records
// export SIGNUP_AUDIT_LOG=/var/lib/signup/audit.log
// export SIGNUP_MAILER_TYPE=http
// export SIGNUP_MAILER_URL=https://mailer.internal/send
//
// signupd
// ```

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

use signup_core::audit::FileAuditLog;
use signup_core::config::{HttpConfig, MailerConfig, RosterConfig, SignupConfig, StoreConfig};
use signup_core::mail::LogMailTransport;
use signup_core::traits::{MailTransport, RecordStore};
use signup_core::{FileRecordStore, FileRosterSource, MemoryRecordStore, SignupEngine};
use signup_http::AppState;
use signup_mailer_http::HttpMailTransport;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum SignupExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<SignupExitCode> for ExitCode {
    fn from(code: SignupExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration as read from the environment
struct Config {
    bind: String,
    roster_path: String,
    store_type: String,
    records_dir: Option<String>,
    audit_log: Option<String>,
    mailer_type: String,
    mailer_url: Option<String>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            bind: env::var("SIGNUP_BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            roster_path: env::var("SIGNUP_ROSTER_PATH")?,
            store_type: env::var("SIGNUP_STORE_TYPE").unwrap_or_else(|_| "file".to_string()),
            records_dir: env::var("SIGNUP_RECORDS_DIR").ok(),
            audit_log: env::var("SIGNUP_AUDIT_LOG").ok(),
            mailer_type: env::var("SIGNUP_MAILER_TYPE").unwrap_or_else(|_| "http".to_string()),
            mailer_url: env::var("SIGNUP_MAILER_URL").ok(),
            log_level: env::var("SIGNUP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    ///
    /// Everything cheap to check is checked here, before the runtime
    /// starts: enumerated types, required pairings, path existence,
    /// and the bind address format.
    fn validate(&self) -> Result<()> {
        if !std::path::Path::new(&self.roster_path).exists() {
            anyhow::bail!(
                "SIGNUP_ROSTER_PATH does not exist: {}. \
                The roster document is maintained externally; point this at it.",
                self.roster_path
            );
        }

        match self.store_type.as_str() {
            "file" => {
                if self.records_dir.as_ref().is_none_or(|d| d.is_empty()) {
                    anyhow::bail!(
                        "SIGNUP_RECORDS_DIR is required when SIGNUP_STORE_TYPE=file. \
                        Set it via: export SIGNUP_RECORDS_DIR=/var/lib/signup/records"
                    );
                }
            }
            "memory" => {
                if self.audit_log.is_some() {
                    anyhow::bail!("SIGNUP_AUDIT_LOG is only supported with SIGNUP_STORE_TYPE=file");
                }
            }
            other => anyhow::bail!(
                "SIGNUP_STORE_TYPE '{}' is not supported. Supported types: file, memory",
                other
            ),
        }

        match self.mailer_type.as_str() {
            "http" => {
                let url = self.mailer_url.as_deref().unwrap_or_default();
                if url.is_empty() {
                    anyhow::bail!(
                        "SIGNUP_MAILER_URL is required when SIGNUP_MAILER_TYPE=http. \
                        Set it via: export SIGNUP_MAILER_URL=https://mailer.internal/send"
                    );
                }
                if !url.starts_with("https://") && !url.starts_with("http://") {
                    anyhow::bail!(
                        "SIGNUP_MAILER_URL must use HTTP or HTTPS scheme. Got: {}",
                        url
                    );
                }
                if url.starts_with("http://") {
                    eprintln!(
                        "WARNING: SIGNUP_MAILER_URL uses HTTP (not HTTPS). \
                              Tokens travel over this link; consider using HTTPS."
                    );
                }
            }
            "log" => {}
            other => anyhow::bail!(
                "SIGNUP_MAILER_TYPE '{}' is not supported. Supported types: http, log",
                other
            ),
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => anyhow::bail!(
                "SIGNUP_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                other
            ),
        }

        // Reuse the library-level validation for everything typed
        self.to_signup_config().validate()?;
        Ok(())
    }

    /// Convert to the typed core configuration
    fn to_signup_config(&self) -> SignupConfig {
        SignupConfig {
            roster: RosterConfig {
                path: self.roster_path.clone(),
            },
            store: match self.store_type.as_str() {
                "memory" => StoreConfig::Memory,
                _ => StoreConfig::File {
                    dir: self.records_dir.clone().unwrap_or_default(),
                    audit_log: self.audit_log.clone(),
                },
            },
            mailer: match self.mailer_type.as_str() {
                "log" => MailerConfig::Log,
                _ => MailerConfig::Http {
                    endpoint: self.mailer_url.clone().unwrap_or_default(),
                },
            },
            http: HttpConfig {
                bind: self.bind.clone(),
            },
        }
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return SignupExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return SignupExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return SignupExitCode::ConfigError.into();
    }

    info!("Starting signupd daemon");

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return SignupExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {}", e);
            SignupExitCode::RuntimeError
        } else {
            SignupExitCode::CleanShutdown
        }
    })
    .into()
}

/// Run the daemon
async fn run_daemon(config: Config) -> Result<()> {
    let signup_config = config.to_signup_config();

    // Record store (with optional audit trail)
    let store: Box<dyn RecordStore> = match &signup_config.store {
        StoreConfig::File { dir, audit_log } => {
            let mut store = FileRecordStore::new(dir).await?;
            if let Some(path) = audit_log {
                info!("Audit log: {}", path);
                store = store.with_audit(Arc::new(FileAuditLog::new(path).await?));
            }
            info!("Record store: file ({})", dir);
            Box::new(store)
        }
        StoreConfig::Memory => {
            info!("Record store: memory (records are lost on restart)");
            Box::new(MemoryRecordStore::new())
        }
    };

    // Mail transport
    let mailer: Box<dyn MailTransport> = match &signup_config.mailer {
        MailerConfig::Http { endpoint } => {
            info!("Mail transport: http ({})", endpoint);
            Box::new(HttpMailTransport::new(endpoint))
        }
        MailerConfig::Log => {
            info!("Mail transport: log (no delivery happens)");
            Box::new(LogMailTransport::new())
        }
    };

    // Roster source, re-read per registration request
    info!("Roster: {}", signup_config.roster.path);
    let roster = Box::new(FileRosterSource::new(&signup_config.roster.path));

    let engine = Arc::new(SignupEngine::new(roster, store, mailer));
    let app = signup_http::router(AppState::new(engine));

    let listener = tokio::net::TcpListener::bind(&signup_config.http.bind).await?;
    info!("Listening on http://{}", signup_config.http.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown())
        .await?;

    info!("Shutting down daemon");
    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
#[cfg(unix)]
async fn wait_for_shutdown() {
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to setup SIGTERM handler: {}", e);
            return;
        }
    };
    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to setup SIGINT handler: {}", e);
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM"),
        _ = sigint.recv() => info!("Received SIGINT"),
    }
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to wait for CTRL-C: {}", e);
    }
}
