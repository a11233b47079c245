mod commands;
mod render;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use gms_client::ClientConfig;
use gms_core::{Role, Stage};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Graduation cover-letter workflow tool.
#[derive(Parser)]
#[command(name = "gms", version, about = "Graduation cover-letter workflow tool")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log reconciliation and request details to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Path to the TOML config file (default: ./gms.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a saved API response into canonical cover-letter state
    Reconcile {
        /// Path to a JSON file holding a list or single-record response
        file: PathBuf,
    },

    /// Show what a role may do with the cover letters in a saved response
    Actions {
        /// Path to a JSON file holding a list or single-record response
        file: PathBuf,
        /// Acting role (default: [identity] role from config)
        #[arg(long)]
        role: Option<Role>,
    },

    /// Compute a signature transition locally, without contacting the backend
    Sign {
        /// Path to a JSON file holding a single-record response
        file: PathBuf,
        /// Signing role (default: [identity] role from config)
        #[arg(long)]
        role: Option<Role>,
        /// Name recorded as signer (default: [identity] name from config)
        #[arg(long)]
        signer: Option<String>,
        /// Signature timestamp, RFC 3339 (default: now)
        #[arg(long, value_parser = parse_timestamp)]
        at: Option<time::OffsetDateTime>,
        /// Require the transition to land on this stage
        #[arg(long, value_parser = parse_stage)]
        to: Option<Stage>,
    },

    /// List the cover letters visible to a role
    List {
        #[arg(long)]
        role: Option<Role>,
    },

    /// Fetch one cover letter and the role's available actions
    Show {
        /// Cover letter entry ID
        entry_id: String,
        #[arg(long)]
        role: Option<Role>,
    },

    /// Sign a cover letter on the backend after a local pre-flight check
    RemoteSign {
        /// Cover letter entry ID
        entry_id: String,
        #[arg(long)]
        role: Option<Role>,
        #[arg(long)]
        signer: Option<String>,
    },

    /// Reject a cover letter on the backend
    Reject {
        /// Cover letter entry ID
        entry_id: String,
        #[arg(long)]
        role: Option<Role>,
        /// Reason shown to the student
        #[arg(long)]
        reason: String,
    },
}

/// Settings shared by every subcommand.
pub(crate) struct Context {
    pub output: OutputFormat,
    pub quiet: bool,
    config_path: Option<PathBuf>,
}

impl Context {
    /// Load configuration or exit with a reported error.
    pub fn config(&self) -> ClientConfig {
        match ClientConfig::load(self.config_path.as_deref()) {
            Ok(config) => {
                tracing::debug!(
                    path = ?self.config_path,
                    base_url = ?config.api.base_url,
                    has_token = config.api.token.is_some(),
                    "configuration loaded"
                );
                config
            }
            Err(e) => fail(&format!("error: {}", e), self),
        }
    }

    /// The explicit role, else the configured one.
    pub fn role(&self, explicit: Option<Role>) -> Role {
        if let Some(role) = explicit {
            return role;
        }
        match self.config().identity.role {
            Some(role) => role,
            None => fail(
                "error: no role given; pass --role or set [identity] role in the config file",
                self,
            ),
        }
    }

    /// The explicit signer name, else the configured one.
    pub fn signer(&self, explicit: Option<String>) -> String {
        if let Some(name) = explicit {
            return name;
        }
        match self.config().identity.name {
            Some(name) => name,
            None => fail(
                "error: no signer given; pass --signer or set [identity] name in the config file",
                self,
            ),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let ctx = Context {
        output: cli.output,
        quiet: cli.quiet,
        config_path: cli.config,
    };

    match cli.command {
        Commands::Reconcile { file } => {
            commands::local::cmd_reconcile(&file, &ctx);
        }
        Commands::Actions { file, role } => {
            let role = ctx.role(role);
            commands::local::cmd_actions(&file, role, &ctx);
        }
        Commands::Sign {
            file,
            role,
            signer,
            at,
            to,
        } => {
            let role = ctx.role(role);
            let signer = ctx.signer(signer);
            let at = at.unwrap_or_else(time::OffsetDateTime::now_utc);
            commands::local::cmd_sign(&file, role, &signer, at, to, &ctx);
        }
        Commands::List { role } => {
            let role = ctx.role(role);
            commands::remote::cmd_list(role, &ctx);
        }
        Commands::Show { entry_id, role } => {
            let role = ctx.role(role);
            commands::remote::cmd_show(&entry_id, role, &ctx);
        }
        Commands::RemoteSign {
            entry_id,
            role,
            signer,
        } => {
            let role = ctx.role(role);
            let signer = ctx.signer(signer);
            commands::remote::cmd_remote_sign(&entry_id, role, &signer, &ctx);
        }
        Commands::Reject {
            entry_id,
            role,
            reason,
        } => {
            let role = ctx.role(role);
            commands::remote::cmd_reject(&entry_id, role, &reason, &ctx);
        }
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let filter = match (verbose, quiet) {
        (_, true) => "off",
        (true, false) => "debug",
        (false, false) => "warn",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();
}

fn parse_timestamp(raw: &str) -> Result<time::OffsetDateTime, String> {
    time::OffsetDateTime::parse(raw, &time::format_description::well_known::Rfc3339)
        .map_err(|e| format!("expected an RFC 3339 timestamp: {}", e))
}

fn parse_stage(raw: &str) -> Result<Stage, String> {
    Stage::parse(raw).ok_or_else(|| format!("unknown stage '{}'", raw))
}

/// Read and parse a JSON file, exiting with a reported error on failure.
pub(crate) fn read_json(path: &Path, ctx: &Context) -> serde_json::Value {
    let content = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(_) => fail(&format!("error: file not found: {}", path.display()), ctx),
    };
    match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => fail(
            &format!("error: invalid JSON in {}: {}", path.display(), e),
            ctx,
        ),
    }
}

/// Report `msg` and exit with status 1.
pub(crate) fn fail(msg: &str, ctx: &Context) -> ! {
    report_error(msg, ctx.output, ctx.quiet);
    process::exit(1);
}

/// Report an error in the appropriate output format.
///
/// In JSON mode, outputs `{"error": "..."}` to stderr.
/// In text mode, outputs the message to stderr.
/// If quiet, suppresses output entirely.
pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
