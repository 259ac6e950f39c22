//! Grab binary.
//!
//! ```bash
//! grab install --workspace T0123 --bot-token xoxb-... --wiki-url https://wiki/api.php ...
//! grab serve --workspace T0123
//! ```
//!
//! Without `--workspace`, `serve` reads everything from the environment.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use grab_core::{config, GrabConfig, GrabContext};
use grab_persistence::{CredentialStore, WorkspaceCredentials};
use grab_slack::{serve, AppState, ServerConfig, SignatureVerifier, SlackClient, SlackConfig};
use grab_wiki::{MediaWikiClient, WikiConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Grab - save Slack threads to a wiki
#[derive(Parser, Debug)]
#[command(name = "grab", version)]
#[command(about = "Save Slack conversation threads as MediaWiki articles")]
struct Args {
    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the Slack intake server
    Serve {
        /// Load credentials recorded by `grab install` for this workspace
        #[arg(long, env = "GRAB_WORKSPACE")]
        workspace: Option<String>,

        /// Bind host
        #[arg(long, env = "GRAB_HOST", default_value = "0.0.0.0")]
        host: String,

        /// Bind port
        #[arg(short, long, env = "GRAB_PORT", default_value = "8080")]
        port: u16,
    },

    /// Record credentials for a workspace
    Install {
        /// Slack workspace (team) id
        #[arg(long)]
        workspace: String,

        #[arg(long, env = "SLACK_BOT_TOKEN", hide_env_values = true)]
        bot_token: String,

        #[arg(long, env = "SLACK_SIGNING_SECRET", hide_env_values = true)]
        signing_secret: Option<String>,

        /// MediaWiki api.php URL
        #[arg(long, env = "WIKI_URL")]
        wiki_url: String,

        #[arg(long, env = "WIKI_UNAME")]
        wiki_username: String,

        #[arg(long, env = "WIKI_PWORD", hide_env_values = true)]
        wiki_password: String,

        /// LDAP domain for wiki login
        #[arg(long, env = "WIKI_DOMAIN")]
        wiki_domain: Option<String>,
    },

    /// List workspaces with recorded credentials
    Workspaces,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from the state directory first
    let env_path = config::env_file();
    if env_path.exists() {
        let _ = dotenvy::from_path(&env_path);
    }
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let filter = match args.verbose {
        0 => "grab=info,grab_slack=info,grab_core=info,grab_wiki=info",
        1 => "grab=debug,grab_slack=debug,grab_core=debug,grab_wiki=debug,tower_http=info",
        2 => "grab=trace,grab_slack=trace,grab_core=trace,grab_wiki=trace,tower_http=debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let store = CredentialStore::new(config::credentials_dir());

    match args.command {
        Command::Serve {
            workspace,
            host,
            port,
        } => {
            let (slack, wiki) = match workspace {
                Some(id) => from_credentials(store.load(&id)?)?,
                None => (SlackConfig::from_env()?, WikiConfig::from_env()?),
            };
            run_server(slack, wiki, ServerConfig::new(host, port)).await?;
        }
        Command::Install {
            workspace,
            bot_token,
            signing_secret,
            wiki_url,
            wiki_username,
            wiki_password,
            wiki_domain,
        } => {
            // Validate the token shape before recording it
            SlackConfig::new(bot_token.as_str())?;

            let mut credentials = WorkspaceCredentials::new(
                workspace,
                bot_token,
                wiki_url,
                wiki_username,
                wiki_password,
            );
            credentials.signing_secret = signing_secret;
            credentials.wiki_domain = wiki_domain;
            store.save(&credentials)?;

            info!(workspace = %credentials.workspace_id, "Credentials recorded");
            println!(
                "Recorded credentials for {} in {}",
                credentials.workspace_id,
                store.base_path().display()
            );
        }
        Command::Workspaces => {
            let all = store.list()?;
            if all.is_empty() {
                println!("No workspaces installed. Run `grab install` first.");
            }
            for credentials in all {
                println!(
                    "{}\t{}\tinstalled {}",
                    credentials.workspace_id,
                    credentials.wiki_url,
                    credentials.installed_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
    }

    Ok(())
}

/// Builds client configs from stored credentials. Set environment
/// variables take precedence over stored values.
fn from_credentials(
    credentials: WorkspaceCredentials,
) -> Result<(SlackConfig, WikiConfig), Box<dyn std::error::Error>> {
    let env = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

    let slack = SlackConfig::new(env("SLACK_BOT_TOKEN").unwrap_or(credentials.bot_token))?
        .with_signing_secret(env("SLACK_SIGNING_SECRET").or(credentials.signing_secret));

    let wiki = WikiConfig::new(
        env("WIKI_URL").unwrap_or(credentials.wiki_url),
        env("WIKI_UNAME").unwrap_or(credentials.wiki_username),
        env("WIKI_PWORD").unwrap_or(credentials.wiki_password),
    )
    .with_domain(env("WIKI_DOMAIN").or(credentials.wiki_domain));

    Ok((slack, wiki))
}

async fn run_server(
    slack: SlackConfig,
    wiki: WikiConfig,
    server: ServerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let grab_config = GrabConfig::from_env();

    let verifier = slack.signing_secret.clone().map(SignatureVerifier::new);
    if verifier.is_none() {
        warn!("SLACK_SIGNING_SECRET is not set; requests will not be verified");
    }

    let chat = Arc::new(SlackClient::new(slack)?);
    let wiki = MediaWikiClient::connect(wiki.with_edit_summary(grab_config.edit_summary.clone()))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Wiki login failed");
            e
        })?;
    info!(wiki = %wiki.config().api_url, "Logged in to wiki");

    let grab = GrabContext::new(chat, Arc::new(wiki), grab_config);
    let state = AppState::new(server.clone(), grab, verifier);

    serve(&server, state).await?;
    Ok(())
}
