// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Operator commands that work directly on a taskboard database file.

use std::path::PathBuf;
use std::process::ExitCode as ProcessExitCode;

use clap::{error::ErrorKind, Parser, Subcommand};
use serde_json::{json, Value};
use taskboard_auth::{
    hash_password_with, JwtSigner, TokenSubject, DEFAULT_PBKDF2_ITERATIONS,
};
use taskboard_model::{validate_password, Email, PersonName, Role, ValidationError};
use taskboard_store::{NewUser, SqliteStore, StoreError, UserRecord};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

const MIN_SECRET_BYTES: usize = 32;

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(about = "Taskboard database operations")]
struct Cli {
    /// SQLite database file (`:memory:` for a throwaway database).
    #[arg(
        long,
        global = true,
        env = "TASKBOARD_DB_PATH",
        default_value = "taskboard.sqlite"
    )]
    db: PathBuf,
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[arg(
        long,
        global = true,
        env = "TASKBOARD_PASSWORD_ITERATIONS",
        default_value_t = DEFAULT_PBKDF2_ITERATIONS
    )]
    password_iterations: u32,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Db {
        #[command(subcommand)]
        command: DbCommand,
    },
    User {
        #[command(subcommand)]
        command: UserCommand,
    },
    Token {
        #[command(subcommand)]
        command: TokenCommand,
    },
}

#[derive(Subcommand)]
enum DbCommand {
    /// Apply pending migrations and print the schema version.
    Migrate,
}

#[derive(Subcommand)]
enum UserCommand {
    Create {
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "USER")]
        role: String,
    },
    List,
    /// Grant USER or MANAGER.
    SetRole {
        #[arg(long)]
        email: String,
        #[arg(long)]
        role: String,
    },
}

#[derive(Subcommand)]
enum TokenCommand {
    /// Mint an access token for an existing account.
    Issue {
        #[arg(long)]
        email: String,
        #[arg(long, env = "TASKBOARD_JWT_SECRET", hide_env_values = true)]
        secret: String,
        #[arg(long, default_value_t = 3600)]
        ttl_secs: i64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    Usage = 2,
    Validation = 3,
    Store = 4,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.0)
    }
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            Self::Usage(_) => ExitCode::Usage,
            Self::Validation(_) => ExitCode::Validation,
            Self::Store(_) => ExitCode::Store,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Usage(_) => "usage_error",
            Self::Validation(_) => "validation_error",
            Self::Store(StoreError::NotFound(_)) => "not_found",
            Self::Store(StoreError::Conflict(_)) => "conflict",
            Self::Store(_) => "store_failure",
        }
    }
}

pub fn main_entry() -> ProcessExitCode {
    let wants_json = std::env::args().any(|arg| arg == "--json");
    match run() {
        Ok(()) => ProcessExitCode::from(ExitCode::Success as u8),
        Err(err) => {
            emit_error(&err, wants_json);
            ProcessExitCode::from(err.exit_code() as u8)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run() -> Result<(), CliError> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{err}");
                return Ok(());
            }
            _ => return Err(CliError::Usage(err.to_string())),
        },
    };
    init_tracing();

    let store = SqliteStore::open(&cli.db)?;
    let version = store.migrate()?;
    info!(db = %cli.db.display(), schema_version = version, "database opened");

    let output = match cli.command {
        Commands::Db {
            command: DbCommand::Migrate,
        } => json!({"schema_version": version}),
        Commands::User { command } => run_user(&store, command, cli.password_iterations)?,
        Commands::Token {
            command:
                TokenCommand::Issue {
                    email,
                    secret,
                    ttl_secs,
                },
        } => issue_token(&store, &email, &secret, ttl_secs)?,
    };
    emit(&output, cli.json);
    Ok(())
}

fn user_json(user: &UserRecord) -> Value {
    json!({
        "id": user.id.get(),
        "email": user.email.as_str(),
        "firstName": user.first_name,
        "lastName": user.last_name,
        "role": user.role.as_str(),
        "twoFactorEnabled": user.two_factor_enabled,
    })
}

fn run_user(
    store: &SqliteStore,
    command: UserCommand,
    iterations: u32,
) -> Result<Value, CliError> {
    match command {
        UserCommand::Create {
            email,
            first_name,
            last_name,
            password,
            role,
        } => {
            let new_user = NewUser {
                first_name: PersonName::parse(&first_name)?.into(),
                last_name: PersonName::parse(&last_name)?.into(),
                email: Email::parse(&email)?,
                password_hash: {
                    validate_password(&password)?;
                    hash_password_with(&password, iterations)
                },
                role: Role::parse(&role)?,
            };
            let user = store.create_user(&new_user)?;
            info!(user_id = %user.id, role = %user.role, "user created");
            Ok(user_json(&user))
        }
        UserCommand::List => {
            let users = store.list_users()?;
            Ok(Value::Array(users.iter().map(user_json).collect()))
        }
        UserCommand::SetRole { email, role } => {
            let role = Role::parse_assignable(&role)?;
            let user = store.set_role(&Email::parse(&email)?, role)?;
            Ok(user_json(&user))
        }
    }
}

fn issue_token(
    store: &SqliteStore,
    email: &str,
    secret: &str,
    ttl_secs: i64,
) -> Result<Value, CliError> {
    if secret.len() < MIN_SECRET_BYTES {
        return Err(CliError::Validation(format!(
            "secret must be at least {MIN_SECRET_BYTES} bytes"
        )));
    }
    if ttl_secs <= 0 {
        return Err(CliError::Validation("ttl must be > 0".to_string()));
    }
    let email = Email::parse(email)?;
    let user = store
        .user_by_email(&email)?
        .ok_or(StoreError::NotFound("user"))?;
    let signer = JwtSigner::new(secret.as_bytes().to_vec(), ttl_secs);
    let now = chrono::Utc::now().timestamp();
    let token = signer
        .issue(
            &TokenSubject {
                user_id: user.id,
                email: &user.email,
                role: user.role,
                first_name: &user.first_name,
                last_name: &user.last_name,
            },
            now,
        )
        .map_err(|e| CliError::Validation(e.to_string()))?;
    Ok(json!({"token": token, "expires_at": now.saturating_add(ttl_secs)}))
}

fn emit(value: &Value, json_mode: bool) {
    if json_mode {
        println!("{value}");
        return;
    }
    match value {
        Value::Array(rows) => {
            println!("{:<6} {:<32} {:<10} NAME", "ID", "EMAIL", "ROLE");
            for row in rows {
                println!(
                    "{:<6} {:<32} {:<10} {} {}",
                    row["id"],
                    row["email"].as_str().unwrap_or_default(),
                    row["role"].as_str().unwrap_or_default(),
                    row["firstName"].as_str().unwrap_or_default(),
                    row["lastName"].as_str().unwrap_or_default(),
                );
            }
        }
        Value::Object(map) => {
            for (key, v) in map {
                match v {
                    Value::String(s) => println!("{key}: {s}"),
                    other => println!("{key}: {other}"),
                }
            }
        }
        other => println!("{other}"),
    }
}

fn emit_error(error: &CliError, json_mode: bool) {
    if json_mode {
        eprintln!(
            "{}",
            json!({"code": error.code(), "message": error.to_string()})
        );
    } else {
        eprintln!("error: {error}");
    }
}
