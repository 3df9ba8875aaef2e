//! Product browsing.

use anyhow::{Context as _, Result};
use storefront_api::ProductQuery;
use storefront_commerce::catalog::Product;
use storefront_commerce::{Currency, Money, ProductId};

use super::{ProductArgs, ProductsArgs};
use crate::context::Context;
use crate::output::truncate;

/// Run the products command.
pub async fn list(args: ProductsArgs, ctx: &Context) -> Result<()> {
    let query = build_query(&args);
    let api = ctx.api()?;

    let spinner = ctx.output.spinner("Loading products...");
    let result = api.list_products(&query).await;
    spinner.finish_and_clear();
    let products = result.context("Failed to load products")?;

    if ctx.output.is_json() {
        ctx.output.json(&products);
        return Ok(());
    }

    ctx.output.header(if args.featured {
        "Featured Products"
    } else {
        "Products"
    });
    if products.is_empty() {
        ctx.output.info("No products found");
        return Ok(());
    }

    let currency = api.currency();
    let widths = [24, 32, 12, 10, 8];
    ctx.output
        .table_row(&["ID", "NAME", "PRICE", "DISCOUNT", "STOCK"], &widths);
    for product in &products {
        let unit = product.discounted_price().unwrap_or(product.price);
        let price = Money::new(unit, currency).display();
        let discount = if product.has_discount() {
            format!("{}% off", product.discount.normalize())
        } else {
            String::new()
        };
        let stock = if product.in_stock() {
            product.stock.to_string()
        } else {
            "sold out".to_string()
        };
        ctx.output.table_row(
            &[product.id.as_str(), &product.name, &price, &discount, &stock],
            &widths,
        );
    }
    ctx.output.info(&format!("{} product(s)", products.len()));

    Ok(())
}

/// Run the product command.
pub async fn show(args: ProductArgs, ctx: &Context) -> Result<()> {
    let api = ctx.api()?;
    let id = ProductId::new(args.id.trim());

    let spinner = ctx.output.spinner("Loading product...");
    let result = api.get_product(&id).await;
    spinner.finish_and_clear();
    let product = result?;

    if ctx.output.is_json() {
        ctx.output.json(&product);
        return Ok(());
    }

    print_product(&product, api.currency(), ctx);
    Ok(())
}

fn build_query(args: &ProductsArgs) -> ProductQuery {
    if args.featured {
        return ProductQuery::featured();
    }
    let mut query = ProductQuery::new();
    if let Some(search) = &args.search {
        query = query.search(search.as_str());
    }
    if let Some(min) = args.min_price {
        query = query.min_price(min);
    }
    if let Some(max) = args.max_price {
        query = query.max_price(max);
    }
    if let Some(limit) = args.limit {
        query = query.limit(limit);
    }
    query
}

fn print_product(product: &Product, currency: Currency, ctx: &Context) {
    ctx.output.header(&product.name);
    ctx.output.kv("id", product.id.as_str());
    let price = Money::new(product.discounted_price().unwrap_or(product.price), currency);
    if product.has_discount() {
        ctx.output.kv(
            "price",
            &format!(
                "{} (was {}, {}% off)",
                price,
                Money::new(product.price, currency),
                product.discount.normalize()
            ),
        );
    } else {
        ctx.output.kv("price", &price.display());
    }
    ctx.output.kv(
        "stock",
        &if product.in_stock() {
            format!("{} in stock", product.stock)
        } else {
            "Out of stock".to_string()
        },
    );
    if let Some(description) = product.description.as_deref().filter(|d| !d.is_empty()) {
        ctx.output.kv("description", &truncate(description, 200));
    }
    for image in &product.images {
        ctx.output.list_item(image);
    }
}
