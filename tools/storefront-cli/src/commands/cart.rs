//! Cart commands.

use anyhow::{bail, Context as _, Result};
use dialoguer::Confirm;
use serde::Serialize;
use storefront_commerce::cart::{CartLineItem, CartSummary};
use storefront_commerce::{Currency, Money, ProductId};

use super::{CartArgs, CartCommand};
use crate::context::Context;

#[derive(Serialize)]
struct CartView<'a> {
    items: &'a [CartLineItem],
    #[serde(flatten)]
    summary: CartSummary,
}

/// Run the cart command.
pub async fn run(args: CartArgs, ctx: &Context) -> Result<()> {
    match args.command.unwrap_or(CartCommand::Show) {
        CartCommand::Show => show(ctx),
        CartCommand::Add { id, quantity } => add(&id, quantity, ctx).await,
        CartCommand::Update { id, quantity } => update(&id, quantity, ctx),
        CartCommand::Remove { id } => remove(&id, ctx),
        CartCommand::Clear { yes } => clear(yes, ctx),
    }
}

fn show(ctx: &Context) -> Result<()> {
    let cart = ctx.cart()?;
    print_cart(&cart.get_cart(), cart.summary(), cart.currency(), ctx);
    Ok(())
}

async fn add(id: &str, quantity: i64, ctx: &Context) -> Result<()> {
    if quantity < 1 {
        bail!("Quantity must be at least 1");
    }
    let api = ctx.api()?;
    let spinner = ctx.output.spinner("Loading product...");
    let result = api.get_product(&ProductId::new(id.trim())).await;
    spinner.finish_and_clear();
    let product = result.context("Failed to load product")?;

    if !product.in_stock() {
        bail!("{} is out of stock", product.name);
    }

    let cart = ctx.cart()?;
    let items = cart.add_item(&product, quantity);
    let in_cart = items
        .iter()
        .find(|item| item.product_id == product.id)
        .map_or(0, |item| item.quantity);
    if in_cart > product.stock {
        ctx.output.warn(&format!(
            "Only {} of {} in stock; the order may be rejected",
            product.stock, product.name
        ));
    }
    ctx.output
        .success(&format!("Added {} × {} to cart", quantity, product.name));
    print_cart(&items, cart.summary(), cart.currency(), ctx);
    Ok(())
}

fn update(id: &str, quantity: i64, ctx: &Context) -> Result<()> {
    let cart = ctx.cart()?;
    let id = ProductId::new(id.trim());
    if !cart.get_cart().iter().any(|item| item.product_id == id) {
        bail!("Product {} is not in the cart", id);
    }
    let items = cart.update_quantity(&id, quantity);
    if quantity <= 0 {
        ctx.output.success(&format!("Removed {} from cart", id));
    } else {
        ctx.output
            .success(&format!("Set quantity of {} to {}", id, quantity));
    }
    print_cart(&items, cart.summary(), cart.currency(), ctx);
    Ok(())
}

fn remove(id: &str, ctx: &Context) -> Result<()> {
    let cart = ctx.cart()?;
    let id = ProductId::new(id.trim());
    let before = cart.get_count();
    let items = cart.remove_item(&id);
    if cart.get_count() == before {
        ctx.output.info(&format!("Product {} was not in the cart", id));
    } else {
        ctx.output.success(&format!("Removed {} from cart", id));
    }
    print_cart(&items, cart.summary(), cart.currency(), ctx);
    Ok(())
}

fn clear(yes: bool, ctx: &Context) -> Result<()> {
    let cart = ctx.cart()?;
    if cart.is_empty() {
        ctx.output.info("Cart is already empty");
        return Ok(());
    }
    if !yes
        && !Confirm::new()
            .with_prompt(format!("Remove all {} item(s) from the cart?", cart.get_count()))
            .default(false)
            .interact()?
    {
        ctx.output.info("Cancelled");
        return Ok(());
    }
    cart.clear();
    ctx.output.success("Cart cleared");
    Ok(())
}

/// Print cart lines and totals.
pub fn print_cart(items: &[CartLineItem], summary: CartSummary, currency: Currency, ctx: &Context) {
    if ctx.output.is_json() {
        ctx.output.json(&CartView { items, summary });
        return;
    }

    ctx.output.header("Cart");
    if items.is_empty() {
        ctx.output.info("Your cart is empty");
        return;
    }

    let widths = [24, 32, 6, 12, 12];
    ctx.output
        .table_row(&["ID", "PRODUCT", "QTY", "PRICE", "TOTAL"], &widths);
    for item in items {
        let price = Money::new(item.price, currency).display();
        let total = Money::new(item.line_total(), currency).display();
        ctx.output.table_row(
            &[
                item.product_id.as_str(),
                &item.product_name,
                &item.quantity.to_string(),
                &price,
                &total,
            ],
            &widths,
        );
    }
    ctx.output.kv("items", &summary.count.to_string());
    ctx.output.kv("total", &summary.total.display());
}
