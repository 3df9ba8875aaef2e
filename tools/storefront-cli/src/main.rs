//! Storefront CLI - command line client for the storefront backend.
//!
//! Commands:
//! - `storefront products` - Browse the catalog
//! - `storefront product` - Show one product
//! - `storefront cart` - Manage the persisted cart
//! - `storefront checkout` - Place an order and pay for it
//! - `storefront track` - Track an order by number
//! - `storefront admin` - Admin console
//! - `storefront config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::{
    AdminArgs, CartArgs, CheckoutArgs, ConfigArgs, ProductArgs, ProductsArgs, TrackArgs,
};

/// Storefront CLI - browse, buy, track and administer a storefront
#[derive(Parser)]
#[command(name = "storefront")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products(ProductsArgs),

    /// Show a product
    Product(ProductArgs),

    /// Show or change the cart
    Cart(CartArgs),

    /// Check out the cart
    Checkout(CheckoutArgs),

    /// Track an order
    Track(TrackArgs),

    /// Admin console
    Admin(AdminArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Log to stderr; `RUST_LOG` wins over the verbosity flag.
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "warn,storefront_cli=debug,storefront_api=debug,storefront_commerce=debug,storefront_data=debug"
        } else {
            "warn"
        })
    });
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(verbose)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Setup output formatting
    let output = output::Output::new(cli.json);

    // Load config
    let config_path = cli.config.as_deref();
    let ctx = match context::Context::load(config_path, output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    // Execute command
    let result = match cli.command {
        Commands::Products(args) => commands::catalog::list(args, &ctx).await,
        Commands::Product(args) => commands::catalog::show(args, &ctx).await,
        Commands::Cart(args) => commands::cart::run(args, &ctx).await,
        Commands::Checkout(args) => commands::checkout::run(args, &ctx).await,
        Commands::Track(args) => commands::track::run(args, &ctx).await,
        Commands::Admin(args) => commands::admin::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
