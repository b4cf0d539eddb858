//! kcadmin CLI
//!
//! Command-line front end for the Keycloak admin REST API.
//!
//! # Usage
//!
//! ```bash
//! # Check that the configured credentials work
//! kcadmin token
//!
//! # Search users in the configured realm
//! kcadmin users list --search jane --max 20
//!
//! # Show a client from another realm as JSON
//! kcadmin --realm partners --format json clients get 5f1c...
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use kcadmin_core::{
    Criteria, KeycloakAdmin, KeycloakConfig, TokenStorage, load_config, load_config_from_path,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kcadmin")]
#[command(about = "Manage Keycloak realms from the command line")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Realm to operate on, overriding the configured one
    #[arg(short, long, global = true)]
    realm: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Obtain an access token and show its claims
    Token,

    /// Realm users
    #[command(subcommand)]
    Users(UserCommands),

    /// Realm clients
    #[command(subcommand)]
    Clients(ClientCommands),

    /// Brokered identity providers
    #[command(subcommand)]
    Idps(IdpCommands),
}

#[derive(Subcommand)]
enum UserCommands {
    /// List users
    List {
        /// Match username, email, first or last name
        #[arg(short, long)]
        search: Option<String>,

        /// Index of the first result
        #[arg(long)]
        first: Option<u32>,

        /// Maximum number of results
        #[arg(short, long)]
        max: Option<u32>,
    },

    /// Show a user by id
    Get {
        /// User id
        id: String,
    },
}

#[derive(Subcommand)]
enum ClientCommands {
    /// List clients
    List {
        /// Only the client with this client_id
        #[arg(long)]
        client_id: Option<String>,
    },

    /// Show a client by its UUID
    Get {
        /// Client UUID (not the client_id)
        uuid: String,
    },
}

#[derive(Subcommand)]
enum IdpCommands {
    /// List identity providers
    List,

    /// Show an identity provider by alias
    Get {
        /// Provider alias
        alias: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = resolve_config(cli.config.as_ref(), cli.realm.as_deref())?;
    let admin = KeycloakAdmin::new(&config).context("Failed to set up the admin client")?;

    match cli.command {
        Commands::Token => show_token(&admin, cli.format).await,
        Commands::Users(command) => users(&admin, command, cli.format).await,
        Commands::Clients(command) => clients(&admin, command, cli.format).await,
        Commands::Idps(command) => identity_providers(&admin, command, cli.format).await,
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(path: Option<&PathBuf>, realm: Option<&str>) -> Result<KeycloakConfig> {
    let mut config = match path {
        Some(path) => load_config_from_path(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => load_config().context("Failed to load config")?,
    };

    if let Some(realm) = realm {
        config.realm = realm.to_string();
    }

    tracing::debug!("Using {} realm {}", config.base_url, config.realm);
    Ok(config)
}

#[derive(Serialize)]
struct TokenStatus {
    client_id: Option<String>,
    subject: Option<String>,
    expires_at: Option<String>,
    expires_in_secs: Option<i64>,
}

async fn show_token(admin: &KeycloakAdmin, format: OutputFormat) -> Result<()> {
    let client = admin.client();
    client.authorize().await.context("Authorization failed")?;

    let token = client
        .storage()
        .retrieve_access_token()
        .context("No access token stored after authorization")?;

    let claims = token.claims();
    let status = TokenStatus {
        client_id: claims.azp.clone(),
        subject: claims.sub.clone(),
        expires_at: token.expires_at().map(|at| at.to_rfc3339()),
        expires_in_secs: token
            .expires_at()
            .map(|at| (at - chrono::Utc::now()).num_seconds()),
    };

    match format {
        OutputFormat::Json => print_json(&status),
        OutputFormat::Text => {
            println!("Authorized against {}", client.base_url());
            println!("  Client:  {}", status.client_id.as_deref().unwrap_or("-"));
            println!("  Subject: {}", status.subject.as_deref().unwrap_or("-"));
            match (&status.expires_at, status.expires_in_secs) {
                (Some(at), Some(secs)) => println!("  Expires: {} ({}s)", at, secs),
                _ => println!("  Expires: never"),
            }
            Ok(())
        }
    }
}

async fn users(admin: &KeycloakAdmin, command: UserCommands, format: OutputFormat) -> Result<()> {
    match command {
        UserCommands::List { search, first, max } => {
            let criteria = user_criteria(search, first, max);
            let users = admin
                .users()
                .all(criteria, None)
                .await
                .context("Failed to list users")?;

            match format {
                OutputFormat::Json => print_json(&users),
                OutputFormat::Text => {
                    if users.is_empty() {
                        println!("No users found.");
                    }
                    for user in &users {
                        println!(
                            "{}\t{}\t{}",
                            user.id.as_deref().unwrap_or("-"),
                            user.username.as_deref().unwrap_or("-"),
                            user.email.as_deref().unwrap_or("-"),
                        );
                    }
                    Ok(())
                }
            }
        }
        UserCommands::Get { id } => {
            let user = admin
                .users()
                .get(&id, None)
                .await
                .with_context(|| format!("Failed to get user {}", id))?;
            print_json(&user)
        }
    }
}

fn user_criteria(search: Option<String>, first: Option<u32>, max: Option<u32>) -> Option<Criteria> {
    let mut criteria = Criteria::new();
    if let Some(search) = search {
        criteria.set("search", search);
    }
    if let Some(first) = first {
        criteria.set("first", first);
    }
    if let Some(max) = max {
        criteria.set("max", max);
    }
    (!criteria.is_empty()).then_some(criteria)
}

async fn clients(
    admin: &KeycloakAdmin,
    command: ClientCommands,
    format: OutputFormat,
) -> Result<()> {
    match command {
        ClientCommands::List { client_id } => {
            let criteria = client_id.map(|id| Criteria::new().with("clientId", id));
            let clients = admin
                .clients()
                .all(criteria, None)
                .await
                .context("Failed to list clients")?;

            match format {
                OutputFormat::Json => print_json(&clients),
                OutputFormat::Text => {
                    for client in &clients {
                        println!(
                            "{}\t{}\t{}",
                            client.id.as_deref().unwrap_or("-"),
                            client.client_id.as_deref().unwrap_or("-"),
                            if client.enabled.unwrap_or(false) { "enabled" } else { "disabled" },
                        );
                    }
                    Ok(())
                }
            }
        }
        ClientCommands::Get { uuid } => {
            let client = admin
                .clients()
                .get(&uuid, None)
                .await
                .with_context(|| format!("Failed to get client {}", uuid))?;
            print_json(&client)
        }
    }
}

async fn identity_providers(
    admin: &KeycloakAdmin,
    command: IdpCommands,
    format: OutputFormat,
) -> Result<()> {
    match command {
        IdpCommands::List => {
            let providers = admin
                .identity_providers()
                .all(None, None)
                .await
                .context("Failed to list identity providers")?;

            match format {
                OutputFormat::Json => print_json(&providers),
                OutputFormat::Text => {
                    for provider in &providers {
                        println!(
                            "{}\t{}",
                            provider.alias.as_deref().unwrap_or("-"),
                            provider.provider_id.as_deref().unwrap_or("-"),
                        );
                    }
                    Ok(())
                }
            }
        }
        IdpCommands::Get { alias } => {
            let provider = admin
                .identity_providers()
                .get(&alias, None)
                .await
                .with_context(|| format!("Failed to get identity provider {}", alias))?;
            print_json(&provider)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to format output")?;
    println!("{}", json);
    Ok(())
}
