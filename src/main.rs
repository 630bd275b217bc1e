use std::io;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bibliocatalog::config::Config;
use bibliocatalog::infrastructure::persistence;
use bibliocatalog::services::Catalog;
use bibliocatalog::shell::Shell;
use bibliocatalog::{PersistenceError, seed};

/// Value following `--profile`, if any
fn profile_from_args(args: impl IntoIterator<Item = String>) -> Option<String> {
    let mut args = args.into_iter();
    args.position(|arg| arg == "--profile")?;
    args.next()
}

fn main() -> io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bibliocatalog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    // Check for --profile CLI argument
    let profile = profile_from_args(std::env::args());
    let config = Config::from_lookup(|key| match (key, &profile) {
        ("PROFILE", Some(profile)) => Some(profile.clone()),
        _ => std::env::var(key).ok(),
    });
    tracing::info!("Using catalog file {}", config.data_file.display());

    let mut catalog = Catalog::new(config.loan_policy());
    match persistence::load_catalog(&config.data_file, &mut catalog) {
        Ok(_) => {}
        Err(PersistenceError::NotFound(_)) => {
            tracing::info!("No catalog file yet, starting empty");
        }
        Err(e) => {
            tracing::error!("Failed to load catalog: {}", e);
            eprintln!("Could not load {}: {}", config.data_file.display(), e);
            match persistence::preserve_unreadable(&config.data_file) {
                Ok(kept) => eprintln!("Starting empty; the old file is kept as {}", kept.display()),
                Err(e) => {
                    tracing::error!("Failed to keep unreadable catalog: {}", e);
                    eprintln!("The unreadable file could not be copied; refusing to overwrite it.");
                    return Err(io::Error::other(e.to_string()));
                }
            }
        }
    }

    if let Err(e) = seed::ensure_default_admin(&mut catalog) {
        tracing::error!("Failed to create default admin: {}", e);
    }

    // Check for seed flag
    if config.seed_demo {
        tracing::info!("Seeding demo data...");
        if let Err(e) = seed::seed_demo_data(&mut catalog) {
            tracing::error!("Failed to seed data: {}", e);
        }
    }

    let stdin = io::stdin();
    let mut shell = Shell::new(catalog, &config.data_file, stdin.lock(), io::stdout());
    shell.run()?;

    let catalog = shell.into_catalog();
    if let Err(e) = persistence::save_catalog(&config.data_file, &catalog) {
        tracing::error!("Failed to save catalog: {}", e);
        eprintln!("Could not save {}: {}", config.data_file.display(), e);
    }
    Ok(())
}
