//! Order tracking.

use anyhow::Result;
use console::style;
use storefront_commerce::checkout::{OrderStatus, TrackedOrder};
use storefront_commerce::{Currency, Money};

use super::TrackArgs;
use crate::context::Context;
use crate::output::{order_badge, payment_badge};

/// Run the track command.
pub async fn run(args: TrackArgs, ctx: &Context) -> Result<()> {
    let api = ctx.api()?;

    let spinner = ctx.output.spinner("Looking up order...");
    let result = api.track_order(&args.order_number).await;
    spinner.finish_and_clear();
    let order = result?;

    if ctx.output.is_json() {
        ctx.output.json(&order);
        return Ok(());
    }

    print_order(&order, api.currency(), ctx);
    Ok(())
}

/// Print an order with its timeline and items.
pub fn print_order(order: &TrackedOrder, currency: Currency, ctx: &Context) {
    ctx.output.header(&format!("Order {}", order.order_number));
    ctx.output.kv("placed", &order.created_at_display());
    ctx.output.kv("status", &order_badge(order.order_status));
    ctx.output.kv("payment", &payment_badge(order.payment_status));
    if let Some(tracking) = order.tracking_id.as_deref().filter(|t| !t.is_empty()) {
        ctx.output.kv("tracking", tracking);
    }

    if !ctx.output.is_json() {
        println!();
        for line in timeline(order.order_status) {
            println!("  {}", line);
        }
    }

    ctx.output.header("Items");
    let widths = [32, 6, 12];
    for item in &order.items {
        ctx.output.table_row(
            &[
                &item.product_name,
                &format!("× {}", item.quantity),
                &Money::new(item.line_total(), currency).display(),
            ],
            &widths,
        );
    }
    if let Some(subtotal) = order.subtotal {
        ctx.output
            .kv("subtotal", &Money::new(subtotal, currency).display());
    }
    ctx.output
        .kv("total", &Money::new(order.total, currency).display());

    ctx.output.header("Shipping to");
    ctx.output.kv("name", &order.customer_name);
    ctx.output.kv("address", &order.address_line());
    ctx.output.kv("phone", &order.customer_phone);
    ctx.output.kv("email", &order.customer_email);
}

/// One line per timeline step, or a single line for cancelled and
/// unrecognised statuses.
fn timeline(status: OrderStatus) -> Vec<String> {
    match status {
        OrderStatus::Cancelled => {
            return vec![format!("{} This order was cancelled", style("✗").red())];
        }
        OrderStatus::Unknown => {
            return vec![format!("{} Status not available", style("?").dim())];
        }
        _ => {}
    }
    OrderStatus::TIMELINE
        .iter()
        .map(|step| {
            if status.has_reached(*step) {
                format!("{} {}", style("●").green(), step.display_name())
            } else {
                format!("{} {}", style("○").dim(), style(step.display_name()).dim())
            }
        })
        .collect()
}
