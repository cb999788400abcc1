use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::app::run::execute;
use crate::app::summary::render_summary;
use crate::cli::{Cli, Commands, RunArgs};
use crate::config::Config;
use crate::core::annotations::{AnnotationName, AnnotationStore, HttpAnnotationStore};
use crate::observability::init_logging;
use crate::transport::{ApiClient, ApiRequest, ApiTransport};

pub async fn dispatch(cli: Cli) -> Result<()> {
    let Cli {
        config: config_path,
        verbose,
        command,
    } = cli;

    match command {
        Commands::Init { force } => init_config(config_path.as_deref(), force),

        Commands::Check => {
            let config = load_config(config_path.as_deref(), verbose)?;
            check(&config).await
        }

        Commands::Run(args) => {
            let mut config = load_config(config_path.as_deref(), verbose)?;
            run_once(&mut config, &args).await
        }
    }
}

fn load_config(path: Option<&Path>, verbose: bool) -> Result<Config> {
    let config = Config::load(path)?;
    init_logging(&config.logging, verbose)?;
    info!(config = %config.config_path.display(), "configuration loaded");
    Ok(config)
}

fn init_config(path: Option<&Path>, force: bool) -> Result<()> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => Config::default_path()?,
    };
    Config::write_template(&path, force)?;
    println!("Wrote config template to {}", path.display());
    println!("Fill in [connection] and run `planwatch check`.");
    Ok(())
}

/// One reconciliation pass. The summary is printed whether or not the run
/// succeeded; a fatal error then becomes the process's exit status.
async fn run_once(config: &mut Config, args: &RunArgs) -> Result<()> {
    args.apply_to(config);
    let client = ApiClient::from_config(config);

    let outcome = execute(config, &client).await;
    let stats = &outcome.stats;
    info!(
        success = outcome.is_success(),
        processed = stats.devices_processed,
        updated = stats.devices_updated,
        skipped = stats.devices_skipped,
        would_update = stats.devices_would_update,
        definitions_created = stats.definitions_created,
        errors = stats.errors,
        plans_available = ?stats.plans_available,
        "run summary"
    );
    println!("{}", render_summary(&outcome));

    outcome.into_result().context("planwatch run failed")
}

/// Read-only connectivity check.
async fn check(config: &Config) -> Result<()> {
    config.validate()?;
    println!("Config        {} (valid)", config.config_path.display());

    let client = ApiClient::from_config(config);
    client
        .authenticate()
        .await
        .with_context(|| format!("Could not authenticate against {}", client.base_url()))?;
    println!("Token         ok ({})", client.base_url());

    let probe = ApiRequest::get("plans", &config.endpoints.plans)
        .query_param("page", "0")
        .query_param("page-size", "1");
    match client.execute(probe).await {
        Ok(_) => println!("Update plans  available"),
        Err(err) if err.is_feature_unavailable() => {
            println!("Update plans  unavailable ({err}); runs will report No Plan");
        }
        Err(err) => return Err(err).context("Plan endpoint probe failed"),
    }

    let store = HttpAnnotationStore::new(&client, &config.endpoints, config.sync.page_size);
    let definitions = store
        .list_definitions()
        .await
        .context("Could not list annotation definitions")?;
    let missing: Vec<String> = AnnotationName::ALL
        .iter()
        .map(ToString::to_string)
        .filter(|name| !definitions.iter().any(|def| &def.name == name))
        .collect();
    if missing.is_empty() {
        println!("Definitions   all {} present", AnnotationName::ALL.len());
    } else {
        println!(
            "Definitions   missing: {}{}",
            missing.join(", "),
            if config.sync.create_missing_definitions {
                " (will be created)"
            } else {
                " (set sync.create_missing_definitions or pass --create-definitions)"
            }
        );
    }
    Ok(())
}
