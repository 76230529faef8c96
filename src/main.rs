use andes_news::aggregator::Aggregator;
use andes_news::config::Config;
use andes_news::filter::{FilterRequest, KeywordPolicy, parse_keywords};
use andes_news::sites::SiteKind;
use andes_news::{NewsRequest, NewsService};
use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Parser)]
#[command(
    name = "andes-news",
    about = "Union news aggregator: scrape, rank and filter ANDES-SN and CSP-Conlutas news"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct FilterArgs {
    /// Keep only items mentioning one of these words
    #[arg(long = "include")]
    include: Vec<String>,

    /// Drop items mentioning any of these words
    #[arg(long = "exclude")]
    exclude: Vec<String>,

    /// Extra include keywords as one comma/space separated string
    #[arg(long)]
    keywords: Option<String>,

    /// Match against titles only, not summaries
    #[arg(long)]
    title_only: bool,

    #[arg(long)]
    case_sensitive: bool,

    /// Fill empty keyword lists from the [filter] defaults
    #[arg(long)]
    defaults: bool,
}

impl FilterArgs {
    fn into_request(self) -> FilterRequest {
        let mut include = self.include;
        if let Some(raw) = self.keywords.as_deref() {
            include.extend(parse_keywords(raw));
        }
        FilterRequest {
            include,
            exclude: self.exclude,
            title_only: self.title_only,
            case_sensitive: self.case_sensitive,
            use_defaults: self.defaults.then_some(true),
        }
    }
}

#[derive(clap::Subcommand)]
enum Command {
    /// Fetch, rank and filter the latest news, printed as JSON
    News {
        /// Path to config file
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,

        /// Number of items (clamped to the configured limit)
        #[arg(long)]
        max: Option<usize>,

        /// Only scrape these sites
        #[arg(long = "site", value_enum)]
        sites: Vec<SiteKind>,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// List configured sites
    Sites {
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,
    },

    /// Show the effective keyword filter without scraping
    FilterSummary {
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,

        #[command(flatten)]
        filter: FilterArgs,
    },
}

fn load_config(path: &Path) -> Config {
    match Config::load(path) {
        Ok(config) => config,
        Err(e) => {
            if path.exists() {
                warn!("{e}; falling back to defaults");
            }
            Config::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("andes_news=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::News {
            config,
            max,
            sites,
            filter,
        } => {
            let cfg = load_config(&config);
            let mut aggregator = Aggregator::from_config(&cfg)?;
            aggregator.restrict_to(&sites)?;
            let service = NewsService::new(aggregator, &cfg);
            let request = NewsRequest {
                max_items: max,
                filter: filter.into_request(),
            };
            let response = service.fetch(&request).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Command::Sites { config } => {
            let cfg = load_config(&config);
            for site in &cfg.sites {
                let adapter = site.kind.build(site.base_url.as_deref())?;
                let primary = if site.kind == cfg.aggregator.primary_site {
                    " (primary)"
                } else {
                    ""
                };
                let state = if site.enabled { "enabled" } else { "disabled" };
                println!(
                    "{:<14} {:<14} {:<9} {}{primary}",
                    site.kind.to_string(),
                    adapter.name(),
                    state,
                    adapter.page_url(0)
                );
            }
            Ok(())
        }
        Command::FilterSummary { config, filter } => {
            let cfg = load_config(&config);
            let policy = KeywordPolicy::from(&cfg.filter);
            let summary = policy.summary(&filter.into_request());
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
    }
}
