//! Gems storefront CLI.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! gems products --category rings --sort price-low
//!
//! # Manage the cart
//! gems cart add 1 --quantity 2 --option size=52
//! gems cart update 1 3
//! gems cart remove 1
//! gems cart show
//!
//! # Switch to the authenticated cart
//! gems login -e amina@example.com -p secret
//!
//! # Place an order from a YAML or JSON form
//! gems checkout --form order.yaml
//! ```
//!
//! State lives under `GEMS_DATA_DIR` (default `.gems`), so the cart
//! survives between invocations.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gems_storefront::catalog::SortBy;
use gems_storefront::config::{ConfigError, StorefrontConfig};
use gems_storefront::state::AppState;

use gems_core::ProductCategory;

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "gems")]
#[command(author, version, about = "Gems storefront: catalog, cart and checkout")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog products
    Products {
        /// Only show one category
        #[arg(short, long)]
        category: Option<ProductCategory>,

        /// Match against name and description
        #[arg(short, long)]
        search: Option<String>,

        #[arg(long)]
        min_price: Option<Decimal>,

        #[arg(long)]
        max_price: Option<Decimal>,

        /// Sort order (`newest`, `price-low`, `price-high`, `rating`)
        #[arg(long, default_value = "newest")]
        sort: SortBy,
    },
    /// Inspect and change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Log in (any non-empty credentials are accepted)
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Log out and return to the guest cart
    Logout,
    /// Check out the current cart
    Checkout {
        /// YAML or JSON file with the checkout form
        #[arg(short, long)]
        form: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a product
    Add {
        product_id: String,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        /// Extra option stored on the line, as `key=value`
        #[arg(short, long = "option", value_parser = commands::cart::parse_option)]
        options: Vec<(String, String)>,
    },
    /// Set a line's quantity (0 or less removes it)
    Update {
        /// Line id or product id
        item: String,

        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove {
        /// Line id or product id
        item: String,
    },
    /// Empty the cart
    Clear,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Exit status for a command that failed.
const EXIT_FAILURE: u8 = 1;

/// Exit status for unusable configuration.
const EXIT_CONFIG: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    ExitCode::from(execute(cli, StorefrontConfig::from_env()).await)
}

/// Run one command and return the process exit status.
///
/// The Sentry guard lives only inside this function, so it is dropped
/// (flushing queued events) before `main` returns.
async fn execute(cli: Cli, config: Result<StorefrontConfig, ConfigError>) -> u8 {
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            output::failure(&format!("Invalid configuration: {e}"));
            return EXIT_CONFIG;
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Logs go to stderr so command output stays clean
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "gems_storefront=info,gems=info".into());

    // A subscriber may already be installed when run more than once in a
    // process (tests); the first one stays
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .try_init();

    let state = AppState::new(config);

    // Commands print their own failures; infrastructure errors are
    // reported to Sentry where they occur
    match run(cli, &state).await {
        Ok(()) => 0,
        Err(e) => {
            tracing::debug!("Command failed: {e}");
            EXIT_FAILURE
        }
    }
}

async fn run(cli: Cli, state: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Products {
            category,
            search,
            min_price,
            max_price,
            sort,
        } => commands::products::list(state, category, search, min_price, max_price, sort),
        Commands::Cart { action } => {
            commands::sync_cart(state).await;
            match action {
                CartAction::Show => commands::cart::show(state),
                CartAction::Add {
                    product_id,
                    quantity,
                    options,
                } => commands::cart::add(state, &product_id, quantity, options).await?,
                CartAction::Update { item, quantity } => {
                    commands::cart::update(state, &item, quantity).await?;
                }
                CartAction::Remove { item } => commands::cart::remove(state, &item).await?,
                CartAction::Clear => commands::cart::clear(state).await?,
            }
        }
        Commands::Login { email, password } => {
            commands::auth::login(state, &email, &password).await?;
        }
        Commands::Logout => commands::auth::logout(state).await,
        Commands::Checkout { form } => {
            commands::sync_cart(state).await;
            commands::checkout::run(state, &form).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_update_accepts_negative_quantity() {
        let cli = Cli::try_parse_from(["gems", "cart", "update", "1", "-5"]);
        assert!(matches!(
            cli,
            Ok(Cli {
                command: Commands::Cart {
                    action: CartAction::Update { quantity: -5, .. }
                }
            })
        ));
    }

    #[test]
    fn test_add_collects_options() {
        let cli = Cli::try_parse_from([
            "gems", "cart", "add", "1", "-q", "2", "-o", "size=52", "-o", "engraving=A",
        ]);
        let Ok(Cli {
            command:
                Commands::Cart {
                    action: CartAction::Add { options, quantity, .. },
                },
        }) = cli
        else {
            panic!("expected cart add");
        };
        assert_eq!(quantity, 2);
        assert_eq!(options.len(), 2);
    }

    #[test]
    fn test_products_parses_filters() {
        let cli = Cli::try_parse_from([
            "gems", "products", "-c", "bracelets", "--sort", "price-high", "--max-price", "250",
        ]);
        assert!(matches!(
            cli,
            Ok(Cli {
                command: Commands::Products {
                    category: Some(ProductCategory::Bracelets),
                    sort: SortBy::PriceHigh,
                    ..
                }
            })
        ));
    }

    fn config_in(dir: &tempfile::TempDir) -> StorefrontConfig {
        StorefrontConfig {
            data_dir: dir.path().to_path_buf(),
            ..StorefrontConfig::default()
        }
    }

    #[tokio::test]
    async fn test_execute_returns_success_status() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from(["gems", "cart", "show"]).unwrap();
        assert_eq!(execute(cli, Ok(config_in(&dir))).await, 0);
    }

    #[tokio::test]
    async fn test_failed_command_returns_failure_status() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.yaml");
        let cli =
            Cli::try_parse_from(["gems", "checkout", "--form", missing.to_str().unwrap()]).unwrap();
        assert_eq!(execute(cli, Ok(config_in(&dir))).await, EXIT_FAILURE);
    }

    #[tokio::test]
    async fn test_execute_reports_bad_configuration() {
        let cli = Cli::try_parse_from(["gems", "logout"]).unwrap();
        let config = Err(ConfigError::InvalidEnvVar(
            "GEMS_PAYMENT_DELAY_MS".to_string(),
            "invalid digit".to_string(),
        ));
        assert_eq!(execute(cli, config).await, EXIT_CONFIG);
    }
}
