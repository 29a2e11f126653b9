//! Beach Stall CLI - order from the stall from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Log in (password may also come from BEACHSTALL_PASSWORD)
//! stall login -e asha@example.com -p 'secret'
//!
//! # Browse the menu
//! stall menu
//! stall menu --category "Coastal Curries"
//!
//! # Manage the cart
//! stall cart add <product-id> -q 2
//! stall cart dec <product-id>
//! stall cart
//!
//! # Place the order
//! stall checkout --address "12 Beach Road" --city Kochi --phone 9876543210 --payment upi
//!
//! # Book a table
//! stall book --date 2026-12-24 --category table
//! ```
//!
//! # Commands
//!
//! - `login` / `logout` / `whoami` - Session management
//! - `menu` - List products by section
//! - `cart` - Show or change the cart
//! - `checkout` - Place an order from the cart
//! - `orders` - Order history
//! - `book` - Book an event or a table

#![cfg_attr(not(test), forbid(unsafe_code))]

use beachstall_client::{ClientConfig, Storefront};
use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "stall")]
#[command(author, version, about = "Beach Stall storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and remember the session
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "BEACHSTALL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show who is logged in
    Whoami,
    /// List the menu
    Menu {
        /// Only show this category (e.g. "Biryani")
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },
    /// Place an order from the current cart
    Checkout {
        /// Flat, house number and street
        #[arg(long)]
        address: String,

        #[arg(long)]
        city: String,

        #[arg(long)]
        phone: String,

        /// Payment method (`upi`, `card`, `cod`)
        #[arg(long, default_value = "upi")]
        payment: String,
    },
    /// Show past orders
    Orders,
    /// Book an event or a table
    Book {
        /// Event date, `YYYY-MM-DD` or RFC 3339
        #[arg(short, long)]
        date: String,

        /// Booking category (`wedding`, `photography`, `table`)
        #[arg(short, long, default_value = "table")]
        category: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart (default)
    Show,
    /// Add a product from the menu
    Add {
        product_id: String,

        #[arg(short, long, default_value_t = 1)]
        quantity: i32,
    },
    /// Increase a line's quantity by one
    Inc { product_id: String },
    /// Decrease a line's quantity by one
    Dec { product_id: String },
    /// Remove a line
    Remove { product_id: String },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
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

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing with EnvFilter and Sentry integration
    // Defaults to warn so command output is not interleaved with logs
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "beachstall_client=warn,beachstall_cli=warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    // Sentry guard must outlive every command
    let _sentry_guard = init_sentry(&config);

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, &config).await;

    if let Err(e) = result {
        tracing::debug!(error = ?e, "Command failed");
        #[allow(clippy::print_stderr)]
        {
            eprintln!("Error: {e}");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut storefront = Storefront::from_config(config);
    storefront.start().await;

    match cli.command {
        Commands::Login { email, password } => {
            commands::account::login(&mut storefront, &email, password).await?;
        }
        Commands::Logout => commands::account::logout(&mut storefront)?,
        Commands::Whoami => commands::account::whoami(&storefront),
        Commands::Menu { category } => {
            commands::menu::list(&storefront, category.as_deref()).await?;
        }
        Commands::Cart { action } => match action.unwrap_or(CartAction::Show) {
            CartAction::Show => commands::cart::show(&storefront),
            CartAction::Add {
                product_id,
                quantity,
            } => commands::cart::add(&storefront, &product_id, quantity).await?,
            CartAction::Inc { product_id } => {
                commands::cart::adjust(&storefront, &product_id, 1).await?;
            }
            CartAction::Dec { product_id } => {
                commands::cart::adjust(&storefront, &product_id, -1).await?;
            }
            CartAction::Remove { product_id } => {
                commands::cart::remove(&storefront, &product_id).await?;
            }
        },
        Commands::Checkout {
            address,
            city,
            phone,
            payment,
        } => {
            let form = commands::checkout::CheckoutForm {
                address,
                city,
                phone,
                payment,
            };
            commands::checkout::place_order(&storefront, form).await?;
        }
        Commands::Orders => commands::orders::list(&storefront).await?,
        Commands::Book { date, category } => {
            commands::booking::book(&storefront, &date, &category).await?;
        }
    }
    Ok(())
}
