use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use logo_client::{CurrentGeneration, HttpBackend, LogoClient, LogoForm, LogoStore, ProjectCache};
use logo_types::consts::{self, DEFAULT_PROMPT, PROCESSING_HINT};
use logo_types::{Generation, LogoStyle};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Generate logos and browse your projects
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL of the logo server
    #[arg(long)]
    api_url: Option<String>,

    /// User to act as
    #[arg(long)]
    user: Option<String>,

    /// Where projects generated from this machine are remembered
    #[arg(long)]
    cache: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a new logo
    Create {
        #[arg(long)]
        prompt: Option<String>,

        /// none, monogram, abstract or mascot
        #[arg(long, default_value = "none", value_parser = parse_style)]
        style: LogoStyle,
    },
    /// Ask for a prompt idea
    Suggest {
        #[arg(long, default_value = "none", value_parser = parse_style)]
        style: LogoStyle,
    },
    /// List your finished logos, newest first
    List,
    /// Show one generation
    Show { id: String },
    /// Logos generated from this machine
    History,
}

fn parse_style(tag: &str) -> Result<LogoStyle, String> {
    LogoStyle::ALL
        .into_iter()
        .find(|style| style.as_str() == tag.trim().to_ascii_lowercase())
        .ok_or_else(|| format!("unknown style: {}", tag))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("logo_client=info")),
        )
        .without_time()
        .with_target(false)
        .finish()
        .init();

    dotenv::dotenv().ok();
    let args = Args::parse();

    let api_url = args.api_url.unwrap_or_else(consts::get_api_url);
    let cache_path = args.cache.unwrap_or_else(consts::get_cache_path);
    let cache = ProjectCache::load(&cache_path).await?;

    let mut client = LogoClient::new(HttpBackend::new(api_url), LogoStore::new()).with_cache(cache);
    if let Some(user) = args.user.or_else(consts::get_user_id) {
        client = client.signed_in(user);
    }

    match args.command {
        Command::Create { prompt, style } => {
            let form = LogoForm {
                prompt: prompt.unwrap_or_else(|| DEFAULT_PROMPT.to_string()),
                style,
            };
            create(client, form).await?;
        }
        Command::Suggest { style } => {
            let prompt = client.suggest_prompt(style).await?;
            println!("{} {}", "Prompt:".green(), prompt);
        }
        Command::List => {
            let projects = client.projects().await?;
            if projects.is_empty() {
                println!("{}", "No logos yet".yellow());
            }
            for project in &projects {
                print_project(project);
            }
        }
        Command::Show { id } => {
            let project = client.project(&id).await?;
            print_project(&project);
            if let Some(error) = &project.error {
                println!("  {} {}", "Error:".red(), error);
            }
        }
        Command::History => {
            for project in client.cached_projects().await {
                print_project(&project);
            }
        }
    }

    Ok(())
}

async fn create(client: LogoClient<HttpBackend>, form: LogoForm) -> Result<()> {
    let mut rx = client.store().subscribe();
    let watcher = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let current = rx.borrow_and_update().current.clone();
            print_transition(&current);
        }
    });

    let outcome = client.generate_logo(form).await;

    // the watcher exits once the store is gone
    drop(client);
    watcher.await?;

    outcome.map(|_| ()).map_err(|e| anyhow!("Logo generation failed: {}", e))
}

fn print_transition(current: &CurrentGeneration) {
    match current {
        CurrentGeneration::Idle => {}
        CurrentGeneration::Processing { prompt, style } => {
            println!("{} {} ({})", "Generating:".cyan(), prompt, style);
            println!("{}", PROCESSING_HINT.dimmed());
        }
        CurrentGeneration::Done {
            logo_url,
            project_id,
            ..
        } => {
            println!("{} {}", "Done:".green(), logo_url);
            println!("{} {}", "Project:".green(), project_id);
        }
        CurrentGeneration::Error { message, .. } => {
            println!("{} {}", "Error:".red(), message);
        }
    }
}

fn print_project(project: &Generation) {
    println!(
        "{} [{}] {} ({}) {}",
        project.id.cyan(),
        project.status,
        project.prompt,
        project.style,
        project.image_url.as_deref().unwrap_or("-")
    );
}
