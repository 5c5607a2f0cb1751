//! GitInsights - Personal GitHub analytics
//!
//! Main entry point for the GitInsights CLI.

use anyhow::Context;
use clap::{Parser, Subcommand};
use gitinsights::config::{validate_config_result, InsightsConfig};
use gitinsights::github::{merge_languages, HttpTransport};
use gitinsights::{ok_or_empty, AggregatorConfig, ErrorKind, Insights, InsightsError, RepoSource};
use serde::Serialize;
use std::process;
use std::sync::Arc;

/// GitInsights - statistics across your public and private GitHub repositories
#[derive(Parser, Debug)]
#[command(name = "gitinsights")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: ~/.config/gitinsights/config.yaml)
    #[arg(short, long)]
    config: Option<String>,

    /// GitHub token (falls back to the config's `token_env` variable)
    #[arg(short, long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default configuration file
    Init,

    /// Print the authenticated login
    Login,

    /// Show login, location, avatar and account creation date
    Profile,

    /// Bytes of code per language
    Languages {
        /// Single repository (OWNER/NAME) instead of every visible repository
        #[arg(short, long)]
        repo: Option<String>,

        /// Sum all repositories into one breakdown
        #[arg(short, long)]
        merged: bool,
    },

    /// Opened and closed issue counts
    Issues,

    /// Number of personal commits across public and private repositories
    Commits,

    /// Lines added by the most recent personal commits
    Lines,

    /// Created, forked and starred repository counts
    Repos,

    /// Dates of the first repository and the first commit
    FirstDates,

    /// Every metric at once
    Summary,
}

#[tokio::main]
async fn main() {
    if let Err(e) = gitinsights::logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        if let Some(err) = e.downcast_ref::<InsightsError>() {
            match err.kind() {
                ErrorKind::Auth => {
                    eprintln!("Your token was rejected. Create a new one and log in again.")
                }
                ErrorKind::Remote => eprintln!("GitHub request failed. Try again later."),
                ErrorKind::Empty | ErrorKind::Other => {}
            }
        }
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Init = cli.command {
        let path = cli
            .config
            .map(Into::into)
            .unwrap_or_else(InsightsConfig::default_path);
        InsightsConfig::new().save(&path)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let config = match cli.config {
        Some(ref path) => InsightsConfig::load(path)?,
        None => InsightsConfig::load_default()?,
    };
    validate_config_result(&config)?;

    let token = match cli.token {
        Some(token) => token,
        None => config.token()?,
    };

    let transport = HttpTransport::new(&config, token).context("Failed to create GitHub client")?;
    let insights = Insights::new(Arc::new(transport), AggregatorConfig::from(&config));

    match cli.command {
        Commands::Init => unreachable!("handled above"),
        Commands::Login => {
            let login = insights.login().await?;
            print_value(cli.json, &login, |login| println!("{}", login))?;
        }
        Commands::Profile => {
            let user = insights.user().await?;
            print_value(cli.json, &user, |user| {
                println!("Login:      {}", user.login);
                println!("Location:   {}", user.location.as_deref().unwrap_or("-"));
                println!("Avatar:     {}", user.avatar_url);
                println!("Joined:     {}", user.created_at.format("%Y-%m-%d"));
            })?;
        }
        Commands::Languages { repo, merged } => {
            let breakdowns = match repo {
                Some(full_name) => vec![insights.repo_languages(&full_name).await?],
                None => insights.user_languages().await?,
            };
            if merged {
                let totals = merge_languages(&breakdowns);
                print_value(cli.json, &totals, |totals| {
                    let mut rows: Vec<_> = totals.iter().collect();
                    rows.sort_by(|a, b| b.1.cmp(a.1));
                    for (language, bytes) in rows {
                        println!("  {:<20} {:>12}", language, bytes);
                    }
                })?;
            } else {
                print_value(cli.json, &breakdowns, |breakdowns| {
                    for (index, breakdown) in breakdowns.iter().enumerate() {
                        let languages: Vec<_> = breakdown.keys().map(String::as_str).collect();
                        println!("  #{:<3} {}", index + 1, languages.join(", "));
                    }
                })?;
            }
        }
        Commands::Issues => {
            let (opened, closed) = futures::try_join!(
                insights.user_opened_issues(),
                insights.user_closed_issues()
            )?;
            let counts = IssueCounts { opened, closed };
            print_value(cli.json, &counts, |counts| {
                println!("Opened issues:  {}", counts.opened);
                println!("Closed issues:  {}", counts.closed);
            })?;
        }
        Commands::Commits => {
            let commits = insights.user_count_commits().await?;
            print_value(cli.json, &commits, |commits| {
                println!("Commits:  {}", commits)
            })?;
        }
        Commands::Lines => {
            let lines = insights.user_count_coded_lines().await?;
            let window = insights.config().recent_commit_window;
            print_value(cli.json, &lines, |lines| {
                println!("Lines added in the last {} commits:  {}", window, lines)
            })?;
        }
        Commands::Repos => {
            let (created, forked, stars) = futures::try_join!(
                insights.user_count_created_repositories(),
                insights.user_count_forked_repositories(),
                insights.user_count_stars_repositories()
            )?;
            let counts = RepoCounts {
                created,
                forked,
                stars,
                public_forks: insights
                    .repos_count_forked_repositories(RepoSource::Public)
                    .await?,
            };
            print_value(cli.json, &counts, |counts| {
                println!("Created repositories:  {}", counts.created);
                println!("Forked repositories:   {} ({} public)", counts.forked, counts.public_forks);
                println!("Stars:                 {}", counts.stars);
            })?;
        }
        Commands::FirstDates => {
            let (repository, commit) = futures::join!(
                insights.user_first_repository_date(),
                insights.user_first_commit_date()
            );
            let dates = FirstDates {
                repository: ok_or_empty(repository)?,
                commit: ok_or_empty(commit)?,
            };
            print_value(cli.json, &dates, |dates| {
                println!("First repository:  {}", format_date(dates.repository));
                println!("First commit:      {}", format_date(dates.commit));
            })?;
        }
        Commands::Summary => {
            let summary = insights.summary().await?;
            print_value(cli.json, &summary, |s| {
                println!("GitInsights for {}", s.login);
                println!();
                println!("  Location:              {}", s.location.as_deref().unwrap_or("-"));
                println!("  Joined:                {}", s.created_at.format("%Y-%m-%d"));
                println!("  First repository:      {}", format_date(s.first_repository_date));
                println!("  First commit:          {}", format_date(s.first_commit_date));
                println!();
                println!("  Opened issues:         {}", s.opened_issues);
                println!("  Closed issues:         {}", s.closed_issues);
                println!("  Commits:               {}", s.commits);
                println!("  Coded lines:           {}", s.coded_lines);
                println!();
                println!("  Created repositories:  {}", s.created_repositories);
                println!("  Forked repositories:   {}", s.forked_repositories);
                println!("  Stars:                 {}", s.stars);
            })?;
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct IssueCounts {
    opened: usize,
    closed: usize,
}

#[derive(Serialize)]
struct RepoCounts {
    created: usize,
    forked: usize,
    stars: u64,
    public_forks: usize,
}

#[derive(Serialize)]
struct FirstDates {
    repository: Option<chrono::DateTime<chrono::Utc>>,
    commit: Option<chrono::DateTime<chrono::Utc>>,
}

fn format_date(date: Option<chrono::DateTime<chrono::Utc>>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn print_value<T: Serialize>(json: bool, value: &T, human: impl FnOnce(&T)) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        human(value);
    }
    Ok(())
}
