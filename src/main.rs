//! site-admin: manage website content from the command line.
//!
//! Every command goes through the same resilient client the dashboard uses:
//! bearer token from the token file, transparent retries for transient
//! failures, and a forced logout when the backend answers 401.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::Value;

use site_content_client::auth::{AuthApi, Credentials, FileTokenStore, Session, TokenStore};
use site_content_client::config::{self, validation::validate_config, ClientConfig, ConfigError};
use site_content_client::content::{Collection, ContentApi, Product, SectionKey};
use site_content_client::observability::logging;
use site_content_client::upload::{UploadKind, Uploader};
use site_content_client::{ApiClient, ApiResult};

/// Token file used when neither the config nor the command line names one.
const DEFAULT_TOKEN_FILE: &str = ".site-admin-token";

#[derive(Parser)]
#[command(name = "site-admin")]
#[command(about = "Manage website content from the command line", long_about = None)]
struct Cli {
    /// Backend base URL (overrides config file and API_BASE_URL)
    #[arg(short, long)]
    url: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// File holding the login token
    #[arg(short, long)]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Remove the stored token
    Logout,
    /// Read or write a content section
    Section {
        #[command(subcommand)]
        action: SectionCommand,
    },
    /// Upload an image or video and print its URL
    Upload {
        #[arg(value_enum)]
        kind: MediaKind,
        path: PathBuf,
    },
    /// Browse the product catalog
    Products {
        #[command(subcommand)]
        action: ProductCommand,
    },
}

#[derive(Subcommand)]
enum SectionCommand {
    /// Print a section's content
    Get { section: String, page: String },
    /// Replace a section's content with the JSON in a file
    Set {
        section: String,
        page: String,
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum ProductCommand {
    /// List all products
    List,
    /// Show one product
    Get { id: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum MediaKind {
    Image,
    Video,
}

impl From<MediaKind> for UploadKind {
    fn from(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Image => UploadKind::Image,
            MediaKind::Video => UploadKind::Video,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };
    logging::init(&config.observability);

    tracing::debug!(base_url = %config.api.base_url, "Configuration loaded");

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = %e, "Command failed");
            eprintln!("Error: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<ClientConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => config::load_from_env()?,
    };
    if let Some(url) = &cli.url {
        config.api.base_url = url.clone();
    }
    if let Some(path) = &cli.token_file {
        config.auth.token_path = Some(path.to_string_lossy().into_owned());
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

async fn run(cli: Cli, config: ClientConfig) -> ApiResult<()> {
    let token_path = config
        .auth
        .token_path
        .clone()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_FILE));
    let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::open(&token_path)?);
    let session = Session::new(store);
    let client = ApiClient::new(&config, Arc::new(session.clone()))?;

    match cli.command {
        Commands::Login { email, password } => {
            let auth = AuthApi::new(client, session);
            auth.login(&Credentials { email, password }).await?;
            println!("Logged in. Token saved to {}", token_path.display());
        }
        Commands::Logout => {
            AuthApi::new(client, session).logout()?;
            println!("Logged out.");
        }
        Commands::Section { action } => {
            let content = ContentApi::new(client);
            match action {
                SectionCommand::Get { section, page } => {
                    let value: Value = content.get_section(&SectionKey::new(section, page)).await?;
                    print_json(&value)?;
                }
                SectionCommand::Set { section, page, file } => {
                    let value = read_json(&file).await?;
                    let key = SectionKey::new(section, page);
                    content.upsert_section(&key, &value).await?;
                    println!("Saved section {}", key);
                }
            }
        }
        Commands::Upload { kind, path } => {
            let uploader = Uploader::new(client, config.upload.clone());
            let url = uploader.upload_path(kind.into(), &path).await?;
            println!("{}", url);
        }
        Commands::Products { action } => {
            let products = Collection::<Product>::new(client);
            match action {
                ProductCommand::List => print_json(&products.list().await?)?,
                ProductCommand::Get { id } => print_json(&products.get(&id).await?)?,
            }
        }
    }

    Ok(())
}

async fn read_json(path: &Path) -> ApiResult<Value> {
    let text = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&text)?)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> ApiResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
