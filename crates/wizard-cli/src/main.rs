//! CLI de operación de wizards.
//!
//! `wizard-cli demo [--pg]`                 recorre el wizard de ejemplo
//! `wizard-cli show --type T --id N`        muestra un wizard persistido
//! `wizard-cli list [--type T] [--limit N]` lista los más recientes
//! `wizard-cli delete --type T --id N`      elimina un wizard
//! `wizard-cli purge [--type T] [--ttl-hours H]` elimina wizards abandonados
//! `wizard-cli validate --rules R --value V` prueba reglas de validación

mod demo;

use std::process::ExitCode;

use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use log::{error, info};
use serde_json::{json, Value};
use thiserror::Error;
use wizard_core::validation::{parse_rules, RuleParseError};
use wizard_core::{DefinitionError, InMemoryWizardRepository, JsonResponseRenderer, LoggingEventSink, RuleSet,
                  RuleValidator, Validator, WizardEngine, WizardError, WizardId, WizardRepository, WizardRequest,
                  WizardResponse};
use wizard_persistence::{build_dev_pool_from_env, PersistenceError, PgWizardRepository, PoolProvider};

#[derive(Parser)]
#[command(name = "wizard-cli")]
#[command(about = "Operate multi-step wizards")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the sample onboarding wizard end to end
    Demo {
        /// Persist to Postgres (DATABASE_URL) instead of memory
        #[arg(long)]
        pg: bool,
    },

    /// Print a stored wizard
    Show {
        #[arg(long = "type")]
        wizard_type: String,
        #[arg(long)]
        id: WizardId,
    },

    /// List recently updated wizards
    List {
        #[arg(long = "type")]
        wizard_type: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },

    /// Delete a stored wizard
    Delete {
        #[arg(long = "type")]
        wizard_type: String,
        #[arg(long)]
        id: WizardId,
    },

    /// Delete wizards not updated within the TTL
    Purge {
        #[arg(long = "type")]
        wizard_type: Option<String>,
        #[arg(long, env = "WIZARD_TTL_HOURS", default_value_t = 24)]
        ttl_hours: i64,
    },

    /// Validate a value against pipe-separated rules (e.g. "required|email")
    Validate {
        #[arg(long)]
        rules: String,
        /// JSON value; anything that is not valid JSON is taken as a string
        #[arg(long)]
        value: String,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Definition(#[from] DefinitionError),
    #[error(transparent)]
    Rules(#[from] RuleParseError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("wizard `{wizard_type}` #{id} not found")]
    NotFound { wizard_type: String, id: WizardId },
    #[error("validation failed")]
    Invalid,
}

impl CliError {
    fn exit_code(&self) -> u8 {
        match self {
            Self::NotFound { .. } => 4,
            Self::Persistence(_) => 5,
            Self::Invalid => 6,
            Self::Wizard(e) if e.is_not_found() => 4,
            _ => 1,
        }
    }
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Demo { pg: false } => run_demo(InMemoryWizardRepository::new()),
        Command::Demo { pg: true } => run_demo(pg_repository()?),
        Command::Show { wizard_type, id } => {
            let row = pg_repository()?.find(&wizard_type, id)?
                                      .ok_or(CliError::NotFound { wizard_type, id })?;
            print_json(&json!({
                "id": row.id,
                "type": row.wizard_type,
                "data": row.data,
                "created_at": row.created_at,
                "updated_at": row.updated_at,
            }))
        }
        Command::List { wizard_type, limit } => {
            for row in pg_repository()?.recent(wizard_type.as_deref(), limit)? {
                println!("{:>8}  {:<24} {}", row.id, row.wizard_type, row.updated_at.to_rfc3339());
            }
            Ok(())
        }
        Command::Delete { wizard_type, id } => {
            pg_repository()?.delete_wizard(&wizard_type, id)
                            .map_err(WizardError::from)?;
            info!("deleted {wizard_type} #{id}");
            Ok(())
        }
        Command::Purge { wizard_type, ttl_hours } => {
            let cutoff = Utc::now() - Duration::hours(ttl_hours);
            let deleted = pg_repository()?.purge_expired(wizard_type.as_deref(), cutoff)?;
            info!("purged {deleted} wizard(s) not updated since {}", cutoff.to_rfc3339());
            Ok(())
        }
        Command::Validate { rules, value } => validate(&rules, &value),
    }
}

fn pg_repository() -> Result<PgWizardRepository<PoolProvider>, PersistenceError> {
    let pool = build_dev_pool_from_env()?;
    Ok(PgWizardRepository::new(PoolProvider { pool }))
}

fn print_json(value: &impl serde::Serialize) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_demo<R>(repository: R) -> Result<(), CliError>
    where R: WizardRepository
{
    let def = demo::demo_definition()?;
    let mut engine = WizardEngine::new(repository, LoggingEventSink::new(), JsonResponseRenderer);
    let mut id: Option<WizardId> = None;

    for (label, step, input) in demo::demo_script() {
        println!("== {label}");
        let request = WizardRequest::from(input);
        let result = match (id, step) {
            (Some(id), Some(step)) => engine.update(&def, &request, id, step),
            _ => engine.store(&def, &request),
        };
        match result {
            Ok(response) => {
                if let WizardResponse::Redirect { url } = &response {
                    id = id.or_else(|| url.split('/').nth(3).and_then(|s| s.parse().ok()));
                }
                print_json(&response)?;
            }
            Err(WizardError::InvalidInput(errors)) => print_json(&json!({ "errors": errors }))?,
            Err(e) => return Err(e.into()),
        }
    }

    if let Some(id) = id {
        let response = engine.show(&def, &WizardRequest::new(), id, Some("confirm"))?;
        if let WizardResponse::Render { wizard, .. } = response {
            println!("== summary");
            print_json(&wizard)?;
        }
    }
    Ok(())
}

fn validate(rules: &str, raw: &str) -> Result<(), CliError> {
    let value: Value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    let mut rule_set = RuleSet::new();
    rule_set.insert("value".to_string(), parse_rules(rules)?);
    let mut input = wizard_core::DataMap::new();
    input.insert("value".to_string(), value);

    match RuleValidator.validate(&input, &rule_set) {
        Ok(validated) => print_json(&json!({ "valid": true, "value": validated.get("value") })),
        Err(errors) => {
            print_json(&json!({ "valid": false, "errors": errors }))?;
            Err(CliError::Invalid)
        }
    }
}
