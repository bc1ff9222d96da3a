use clap::Parser;
use deepl_scraper::cli::{CacheAction, Cli, Commands};
use deepl_scraper::types::config::Config;
use deepl_scraper::TranslatorResult;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> TranslatorResult<()> {
    let cli = Cli::parse();

    // Load configuration first (no logging yet)
    let config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::default_config()
    };

    // CLI flags take precedence over config
    let log_level = if cli.quiet {
        "error".to_string()
    } else if cli.verbose {
        "debug".to_string()
    } else {
        config.general.log_level.clone()
    };

    let filter = EnvFilter::from_default_env().add_directive(
        format!("deepl_scraper={}", log_level)
            .parse()
            .unwrap_or_else(|_| {
                "deepl_scraper=info"
                    .parse()
                    .expect("fallback directive is valid")
            }),
    );

    let json_logs = config.general.log_format.eq_ignore_ascii_case("json");
    tracing_subscriber::registry()
        .with(filter)
        .with(json_logs.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json_logs).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();

    tracing::debug!("Configuration loaded from: {}", cli.config.display());

    match cli.command {
        Commands::Init { path } => {
            deepl_scraper::cli::commands::init(path).await?;
        }
        Commands::Translate {
            text,
            from,
            to,
            concurrent,
            json,
        } => {
            deepl_scraper::cli::commands::translate(text, from, &to, concurrent, json, &config)
                .await?;
        }
        #[cfg(feature = "server")]
        Commands::Serve { host, port } => {
            deepl_scraper::cli::commands::serve(host, port, &config).await?;
        }
        Commands::Cache { action } => match action {
            CacheAction::Stats => deepl_scraper::cli::commands::cache_stats(&config).await?,
            CacheAction::List { limit } => {
                deepl_scraper::cli::commands::cache_list(limit, &config).await?
            }
            CacheAction::Clear => deepl_scraper::cli::commands::cache_clear(&config).await?,
        },
        Commands::Doctor => {
            deepl_scraper::cli::commands::doctor(&config).await?;
        }
        Commands::Version => {
            deepl_scraper::cli::commands::version();
        }
    }

    Ok(())
}
