//! CLI command implementations.

pub mod admin;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod track;

use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use storefront_api::PaymentFilter;
use storefront_commerce::checkout::OrderStatus;

/// Arguments for the products command.
#[derive(Args)]
pub struct ProductsArgs {
    /// Search text.
    #[arg(short, long)]
    pub search: Option<String>,

    /// Lowest list price.
    #[arg(long)]
    pub min_price: Option<Decimal>,

    /// Highest price after discount.
    #[arg(long)]
    pub max_price: Option<Decimal>,

    /// Maximum number of products to fetch.
    #[arg(short, long)]
    pub limit: Option<u32>,

    /// Show the featured listing instead.
    #[arg(long, conflicts_with_all = ["search", "min_price", "max_price", "limit"])]
    pub featured: bool,
}

/// Arguments for the product command.
#[derive(Args)]
pub struct ProductArgs {
    /// Product ID.
    pub id: String,
}

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: Option<CartCommand>,
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// Show the cart.
    Show,
    /// Add a product.
    Add {
        /// Product ID.
        id: String,
        /// Quantity to add.
        #[arg(short, long, default_value = "1")]
        quantity: i64,
    },
    /// Set a line's quantity; 0 removes it.
    Update {
        /// Product ID.
        id: String,
        /// New quantity.
        #[arg(allow_hyphen_values = true)]
        quantity: i64,
    },
    /// Remove a line.
    Remove {
        /// Product ID.
        id: String,
    },
    /// Empty the cart.
    Clear {
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the checkout command. Missing fields are prompted for.
#[derive(Args)]
pub struct CheckoutArgs {
    /// Full name.
    #[arg(long)]
    pub name: Option<String>,

    /// Email address.
    #[arg(long)]
    pub email: Option<String>,

    /// 10-digit phone number.
    #[arg(long)]
    pub phone: Option<String>,

    /// Street address.
    #[arg(long)]
    pub address: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    #[arg(long)]
    pub state: Option<String>,

    /// 6-digit pincode.
    #[arg(long)]
    pub pincode: Option<String>,

    /// Payment id reported by the gateway; skips the payment prompt.
    #[arg(long, requires = "signature")]
    pub payment_id: Option<String>,

    /// Payment signature reported by the gateway.
    #[arg(long, requires = "payment_id")]
    pub signature: Option<String>,
}

/// Arguments for the track command.
#[derive(Args)]
pub struct TrackArgs {
    /// Order number, e.g. ORD-1001.
    pub order_number: String,
}

/// Arguments for the admin command.
#[derive(Args)]
pub struct AdminArgs {
    #[command(subcommand)]
    pub command: AdminCommand,
}

/// Product fields for admin create/update.
#[derive(Args, Default)]
pub struct ProductFields {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// List price.
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Discount percentage (0-100).
    #[arg(long)]
    pub discount: Option<Decimal>,

    #[arg(long)]
    pub stock: Option<i64>,

    /// Image URL; repeat for several. Replaces the existing list.
    #[arg(long = "image")]
    pub images: Vec<String>,
}

#[derive(Subcommand)]
pub enum AdminCommand {
    /// Log in to the admin console.
    Login {
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Forget the stored admin token.
    Logout,
    /// Show dashboard figures.
    Stats,
    /// List all products.
    Products,
    /// Create a product.
    ProductCreate(ProductFields),
    /// Update a product; unspecified fields keep their values.
    ProductUpdate {
        /// Product ID.
        id: String,
        #[command(flatten)]
        fields: ProductFields,
    },
    /// Delete a product.
    ProductDelete {
        /// Product ID.
        id: String,
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
    /// List orders.
    Orders {
        /// Only orders in this status.
        #[arg(long)]
        status: Option<OrderStatus>,
    },
    /// Update an order's status or tracking number.
    OrderUpdate {
        /// Order ID or order number.
        order: String,
        #[arg(long)]
        status: Option<OrderStatus>,
        /// Courier tracking number; empty clears it.
        #[arg(long)]
        tracking_id: Option<String>,
    },
    /// Create a shipment for a paid order.
    Ship {
        /// Order ID or order number.
        order: String,
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
    /// Show the payment ledger.
    Payments {
        #[arg(long, default_value = "all")]
        filter: PaymentFilter,
    },
    /// Change the admin password.
    ChangePassword,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// API root to write into the file.
        #[arg(long, default_value = "http://localhost:8000/api")]
        base_url: String,
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the configuration.
    Validate,
}
