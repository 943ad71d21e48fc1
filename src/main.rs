use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use facebook_page_stats::graph::DEFAULT_GRAPH_URL;
use facebook_page_stats::schema::FIELDS;
use facebook_page_stats::{
    AuthProvider, ConfigParams, Connector, DataRequest, DataSource, DateRange, FormatOptions, GraphClient,
    OAuthCredentials, OAuthService, RequestedField, StaticToken, TokenStore, write_pages_to_csv, write_rows_to_csv,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    mode: Mode,

    /// Access token to use instead of the stored OAuth token
    #[arg(long, env = "FACEBOOK_ACCESS_TOKEN", hide_env_values = true, global = true)]
    access_token: Option<String>,

    #[arg(long, env = "FACEBOOK_GRAPH_URL", default_value = DEFAULT_GRAPH_URL, global = true)]
    graph_url: String,

    /// Where the OAuth token is kept
    #[arg(long, env = "FACEBOOK_TOKEN_FILE", global = true)]
    token_file: Option<PathBuf>,

    #[arg(long, env = "FACEBOOK_CLIENT_ID", global = true)]
    client_id: Option<String>,

    #[arg(long, env = "FACEBOOK_CLIENT_SECRET", hide_env_values = true, global = true)]
    client_secret: Option<String>,

    #[arg(long, env = "FACEBOOK_REDIRECT_URI", default_value = "http://localhost:8080/callback", global = true)]
    redirect_uri: String,
}

#[derive(Subcommand, Clone)]
enum Mode {
    #[command(flatten)]
    Report(ReportCommand),
    #[command(flatten)]
    Auth(AuthCommand),
}

#[derive(Subcommand, Clone)]
enum ReportCommand {
    /// Print the connector's config form
    Config,
    /// Print every field the connector offers
    Schema,
    /// Fetch post statistics for a page
    Data {
        #[arg(short, long)]
        page_id: Option<String>,
        /// basic, engagement or reactions
        #[arg(short, long)]
        metric_type: Option<String>,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        /// Comma separated field ids, all fields when omitted
        #[arg(short, long, value_delimiter = ',')]
        fields: Vec<String>,
        /// Serve built-in sample posts instead of calling the Graph API
        #[arg(long)]
        mock: bool,
        /// Strip non-ASCII characters from text fields
        #[arg(long)]
        ascii: bool,
        /// Write CSV here instead of printing JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the pages the authorized user manages
    Pages {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Report whether the current token is accepted
    AuthStatus,
}

#[derive(Subcommand, Clone)]
enum AuthCommand {
    /// Print the URL that grants the connector access
    AuthUrl,
    /// Exchange the code from the OAuth redirect for a token
    AuthCallback {
        #[arg(long)]
        code: String,
    },
    /// Forget the stored token
    ResetAuth,
}

fn oauth_service(cli: &Cli) -> Result<OAuthService> {
    let store = match &cli.token_file {
        Some(path) => TokenStore::new(path),
        None => TokenStore::default_location().context("could not determine a config directory for the token file")?,
    };
    let credentials = OAuthCredentials {
        client_id: cli.client_id.clone().unwrap_or_default(),
        client_secret: cli.client_secret.clone().unwrap_or_default(),
        redirect_uri: cli.redirect_uri.clone(),
    };
    Ok(OAuthService::new(credentials, store))
}

fn require_client_credentials(cli: &Cli) -> Result<()> {
    if cli.client_id.is_none() || cli.client_secret.is_none() {
        anyhow::bail!("FACEBOOK_CLIENT_ID and FACEBOOK_CLIENT_SECRET are required for authorization");
    }
    Ok(())
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} [{elapsed_precise}] {msg}")?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    Ok(pb)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn authorize(cli: &Cli, command: AuthCommand) -> Result<()> {
    let oauth = oauth_service(cli)?;
    match command {
        AuthCommand::AuthUrl => {
            require_client_credentials(cli)?;
            println!("{}", oauth.authorization_url()?);
        }
        AuthCommand::AuthCallback { code } => {
            require_client_credentials(cli)?;
            oauth.handle_callback(&code).await?;
            println!("Authorization complete. The token is stored in {}", oauth.store().path().display());
        }
        AuthCommand::ResetAuth => {
            oauth.reset()?;
            println!("Stored authorization removed");
        }
    }
    Ok(())
}

async fn run<A: AuthProvider>(command: ReportCommand, connector: Connector<A>) -> Result<()> {
    match command {
        ReportCommand::Config => print_json(&connector.get_config())?,
        ReportCommand::Schema => print_json(&connector.get_schema())?,
        ReportCommand::Data {
            page_id,
            metric_type,
            start,
            end,
            fields,
            mock,
            ascii,
            output,
        } => {
            let fields = if fields.is_empty() {
                FIELDS.iter().map(|f| f.id.to_string()).collect()
            } else {
                fields
            };
            let request = DataRequest {
                config_params: ConfigParams { page_id, metric_type },
                date_range: DateRange::new(start, end)?,
                fields: fields.iter().map(|name| RequestedField { name: name.clone() }).collect(),
            };

            let connector = connector
                .with_source(if mock { DataSource::Mock } else { DataSource::Live })
                .with_format(FormatOptions { ascii_text: ascii });

            let pb = spinner("Fetching page posts...")?;
            let result = connector.get_data(&request).await;
            pb.finish_and_clear();
            let response = result?;

            match output {
                Some(path) => {
                    write_rows_to_csv(&fields, &response.rows, &path)?;
                    info!(rows = response.rows.len(), path = %path.display(), "wrote CSV");
                }
                None => print_json(&response)?,
            }
        }
        ReportCommand::Pages { output } => {
            let pb = spinner("Fetching pages...")?;
            let result = connector.list_pages().await;
            pb.finish_and_clear();
            let pages = result?;

            match output {
                Some(path) => write_pages_to_csv(&pages, &path)?,
                None => print_json(&pages)?,
            }
        }
        ReportCommand::AuthStatus => {
            if connector.auth().has_valid_auth(connector.graph()).await {
                println!("Authorized");
            } else {
                println!("Not authorized");
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.mode.clone() {
        Mode::Auth(command) => authorize(&cli, command).await,
        Mode::Report(command) => {
            let graph = GraphClient::with_base_url(&cli.graph_url);
            match cli.access_token.clone() {
                Some(token) => run(command, Connector::new(graph, StaticToken::new(token))).await,
                None => run(command, Connector::new(graph, oauth_service(&cli)?)).await,
            }
        }
    }
}
