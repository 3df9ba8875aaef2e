//! Admin console commands.

use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use dialoguer::{Confirm, Input, Password};
use serde_json::json;
use storefront_api::{AdminSession, OrderUpdate, PaymentFilter, PaymentLedger};
use storefront_cache::FileStore;
use storefront_commerce::catalog::{Product, ProductInput};
use storefront_commerce::checkout::OrderStatus;
use storefront_commerce::{Currency, Money, ProductId};

use super::track::print_order;
use super::{AdminArgs, AdminCommand, ProductFields};
use crate::context::Context;
use crate::output::order_badge;

type Session = AdminSession<Arc<FileStore>>;

/// Run the admin command.
pub async fn run(args: AdminArgs, ctx: &Context) -> Result<()> {
    let admin = ctx.admin()?;
    let currency = ctx.config.currency()?;

    match args.command {
        AdminCommand::Login { username } => login(&admin, username, ctx).await,
        AdminCommand::Logout => {
            admin.logout()?;
            ctx.output.success("Logged out");
            Ok(())
        }
        AdminCommand::Stats => stats(&admin, currency, ctx).await,
        AdminCommand::Products => products(&admin, currency, ctx).await,
        AdminCommand::ProductCreate(fields) => create_product(&admin, fields, ctx).await,
        AdminCommand::ProductUpdate { id, fields } => update_product(&admin, &id, fields, ctx).await,
        AdminCommand::ProductDelete { id, yes } => delete_product(&admin, &id, yes, ctx).await,
        AdminCommand::Orders { status } => orders(&admin, status, currency, ctx).await,
        AdminCommand::OrderUpdate {
            order,
            status,
            tracking_id,
        } => update_order(&admin, &order, status, tracking_id, ctx).await,
        AdminCommand::Ship { order, yes } => ship(&admin, &order, yes, currency, ctx).await,
        AdminCommand::Payments { filter } => payments(&admin, filter, currency, ctx).await,
        AdminCommand::ChangePassword => change_password(&admin, ctx).await,
    }
}

async fn login(admin: &Session, username: Option<String>, ctx: &Context) -> Result<()> {
    let username = match username {
        Some(name) => name,
        None => Input::new().with_prompt("Username").interact_text()?,
    };
    let password = Password::new().with_prompt("Password").interact()?;

    let spinner = ctx.output.spinner("Logging in...");
    let result = admin.login(username.trim(), &password).await;
    spinner.finish_and_clear();
    result.context("Login failed")?;

    ctx.output.success(&format!("Logged in as {}", username.trim()));
    Ok(())
}

async fn stats(admin: &Session, currency: Currency, ctx: &Context) -> Result<()> {
    let stats = admin.stats().await?;
    if ctx.output.is_json() {
        ctx.output.json(&stats);
        return Ok(());
    }
    ctx.output.header("Dashboard");
    ctx.output.kv("products", &stats.total_products.to_string());
    ctx.output.kv("orders", &stats.total_orders.to_string());
    ctx.output.kv("pending orders", &stats.pending_orders.to_string());
    ctx.output.kv(
        "revenue",
        &Money::new(stats.total_revenue, currency).display(),
    );
    Ok(())
}

async fn products(admin: &Session, currency: Currency, ctx: &Context) -> Result<()> {
    let products = admin.list_products().await?;
    if ctx.output.is_json() {
        ctx.output.json(&products);
        return Ok(());
    }
    ctx.output.header("Products");
    let widths = [24, 32, 12, 8, 6];
    ctx.output
        .table_row(&["ID", "NAME", "PRICE", "DISC %", "STOCK"], &widths);
    for product in &products {
        ctx.output.table_row(
            &[
                product.id.as_str(),
                &product.name,
                &Money::new(product.price, currency).display(),
                &product.discount.normalize().to_string(),
                &product.stock.to_string(),
            ],
            &widths,
        );
    }
    ctx.output.info(&format!("{} product(s)", products.len()));
    Ok(())
}

async fn create_product(admin: &Session, fields: ProductFields, ctx: &Context) -> Result<()> {
    if fields.name.is_none() || fields.price.is_none() {
        bail!("--name and --price are required");
    }
    let input = fields.apply(ProductInput::from(&Product::new("", "", Default::default())));
    admin.create_product(&input).await?;
    ctx.output.success(&format!("Created product {}", input.name));
    Ok(())
}

async fn update_product(
    admin: &Session,
    id: &str,
    fields: ProductFields,
    ctx: &Context,
) -> Result<()> {
    let id = ProductId::new(id.trim());
    let current = admin
        .list_products()
        .await?
        .into_iter()
        .find(|p| p.id == id)
        .with_context(|| format!("Product {} not found", id))?;
    let input = fields.apply(ProductInput::from(&current));
    admin.update_product(&id, &input).await?;
    ctx.output.success(&format!("Updated product {}", input.name));
    Ok(())
}

async fn delete_product(admin: &Session, id: &str, yes: bool, ctx: &Context) -> Result<()> {
    let id = ProductId::new(id.trim());
    if !yes
        && !Confirm::new()
            .with_prompt(format!("Delete product {}?", id))
            .default(false)
            .interact()?
    {
        ctx.output.info("Cancelled");
        return Ok(());
    }
    admin.delete_product(&id).await?;
    ctx.output.success(&format!("Deleted product {}", id));
    Ok(())
}

async fn orders(
    admin: &Session,
    status: Option<OrderStatus>,
    currency: Currency,
    ctx: &Context,
) -> Result<()> {
    let orders: Vec<_> = admin
        .list_orders()
        .await?
        .into_iter()
        .filter(|o| status.map_or(true, |s| o.order_status == s))
        .collect();
    if ctx.output.is_json() {
        ctx.output.json(&orders);
        return Ok(());
    }
    ctx.output.header("Orders");
    let widths = [14, 20, 12, 10, 10, 18];
    ctx.output.table_row(
        &["ORDER", "CUSTOMER", "TOTAL", "PAYMENT", "STATUS", "PLACED"],
        &widths,
    );
    for order in &orders {
        ctx.output.table_row(
            &[
                order.order_number.as_str(),
                &order.customer_name,
                &Money::new(order.total, currency).display(),
                order.payment_status.as_str(),
                order.order_status.as_str(),
                &order.created_at_display(),
            ],
            &widths,
        );
    }
    ctx.output.info(&format!("{} order(s)", orders.len()));
    Ok(())
}

async fn update_order(
    admin: &Session,
    key: &str,
    status: Option<OrderStatus>,
    tracking_id: Option<String>,
    ctx: &Context,
) -> Result<()> {
    if status.is_none() && tracking_id.is_none() {
        bail!("Nothing to update: pass --status and/or --tracking-id");
    }
    let order = admin.find_order(key).await?;
    let id = order
        .id
        .clone()
        .context("Order has no backend id")?;

    let mut update = OrderUpdate::from_order(&order);
    if let Some(status) = status {
        update.order_status = status;
    }
    if let Some(tracking_id) = tracking_id {
        update.tracking_id = tracking_id.trim().to_string();
    }
    admin.update_order(&id, &update).await?;

    if ctx.output.is_json() {
        ctx.output.json(&update);
    }
    ctx.output.success(&format!(
        "Order {} is now {}",
        order.order_number,
        order_badge(update.order_status)
    ));
    Ok(())
}

async fn ship(
    admin: &Session,
    key: &str,
    yes: bool,
    currency: Currency,
    ctx: &Context,
) -> Result<()> {
    let order = admin.find_order(key).await?;
    storefront_api::admin::check_shippable(&order)?;

    if !ctx.output.is_json() {
        print_order(&order, currency, ctx);
    }
    if !yes
        && !Confirm::new()
            .with_prompt(format!("Create a shipment for {}?", order.order_number))
            .default(true)
            .interact()?
    {
        ctx.output.info("Cancelled");
        return Ok(());
    }

    let spinner = ctx.output.spinner("Creating shipment...");
    let result = admin.create_shipment(&order).await;
    spinner.finish_and_clear();
    let response = result.context("Failed to create shipment")?;

    if ctx.output.is_json() {
        ctx.output.json(&response);
    }
    ctx.output
        .success(&format!("Shipment created for {}", order.order_number));
    Ok(())
}

async fn payments(
    admin: &Session,
    filter: PaymentFilter,
    currency: Currency,
    ctx: &Context,
) -> Result<()> {
    let ledger = PaymentLedger::from_orders(&admin.list_orders().await?);
    let shown: Vec<_> = ledger.filter(filter).collect();

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "filter": filter,
            "paid_count": ledger.paid_count,
            "pending_count": ledger.pending_count,
            "failed_count": ledger.failed_count,
            "total_revenue": Money::new(ledger.total_revenue, currency).display_amount(),
            "pending_amount": Money::new(ledger.pending_amount, currency).display_amount(),
            "orders": shown,
        }));
        return Ok(());
    }

    ctx.output.header("Payments");
    ctx.output.kv(
        "revenue",
        &format!(
            "{} from {} paid order(s)",
            Money::new(ledger.total_revenue, currency),
            ledger.paid_count
        ),
    );
    ctx.output.kv(
        "pending",
        &format!(
            "{} across {} order(s)",
            Money::new(ledger.pending_amount, currency),
            ledger.pending_count
        ),
    );
    ctx.output.kv("failed", &ledger.failed_count.to_string());

    ctx.output.header(&format!("Transactions ({})", filter));
    let widths = [14, 20, 12, 22, 10];
    for order in shown {
        let payment = order
            .payment_id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        ctx.output.table_row(
            &[
                order.order_number.as_str(),
                &order.customer_name,
                &Money::new(order.total, currency).display(),
                &payment,
                order.payment_status.as_str(),
            ],
            &widths,
        );
    }
    Ok(())
}

async fn change_password(admin: &Session, ctx: &Context) -> Result<()> {
    let old = Password::new().with_prompt("Current password").interact()?;
    let new = Password::new().with_prompt("New password").interact()?;
    let confirm = Password::new().with_prompt("Confirm new password").interact()?;

    admin.change_password(&old, &new, &confirm).await?;
    ctx.output.success("Password changed");
    Ok(())
}

impl ProductFields {
    /// Overlay the given fields onto `input`.
    fn apply(self, mut input: ProductInput) -> ProductInput {
        if let Some(name) = self.name {
            input.name = name;
        }
        if let Some(description) = self.description {
            input.description = description;
        }
        if let Some(price) = self.price {
            input.price = price;
        }
        if let Some(discount) = self.discount {
            input.discount = discount;
        }
        if let Some(stock) = self.stock {
            input.stock = stock;
        }
        if !self.images.is_empty() {
            input.images = ProductInput::parse_images(&self.images.join("\n"));
        }
        input
    }
}
