//! Checkout with a terminal payment widget.

use anyhow::{bail, Result};
use console::style;
use dialoguer::{Input, Select};
use serde_json::json;
use storefront_commerce::checkout::{
    CheckoutOrchestrator, CheckoutState, PaymentChannel, PaymentEvent, PaymentReceipt,
    PaymentRequest, PaymentWidget, ShippingDetails,
};
use storefront_commerce::PaymentId;
use tracing::debug;

use super::cart::print_cart;
use super::CheckoutArgs;
use crate::context::Context;

/// Stands in for the hosted payment widget.
///
/// `open` hands the session to a blocking prompt and returns at once; the
/// prompt's answer comes back through the payment channel like a widget
/// callback would.
struct TerminalWidget {
    channel: PaymentChannel,
    payment_key: Option<String>,
    preset: Option<(String, String)>,
}

impl PaymentWidget for TerminalWidget {
    fn open(&self, request: PaymentRequest) -> Result<(), String> {
        if self.payment_key.is_none() {
            return Err("payment key is not configured".to_string());
        }
        debug!(session_id = %request.session_id, "Opening terminal payment widget");

        if let Some((payment_id, signature)) = &self.preset {
            self.channel.send(PaymentEvent::succeeded(PaymentReceipt {
                order_session_id: request.session_id,
                payment_id: PaymentId::new(payment_id.as_str()),
                signature: signature.clone(),
            }));
            return Ok(());
        }

        let runtime = tokio::runtime::Handle::try_current().map_err(|e| e.to_string())?;
        let channel = self.channel.clone();
        runtime.spawn_blocking(move || {
            channel.send(prompt_payment(&request));
        });
        Ok(())
    }
}

/// Ask the customer how the payment went. Any prompt error counts as the
/// widget being dismissed.
fn prompt_payment(request: &PaymentRequest) -> PaymentEvent {
    eprintln!();
    eprintln!("{}", style(&request.store_name).bold());
    eprintln!("  {}", request.description);
    eprintln!(
        "  Amount: {} ({} {})",
        style(request.amount.display()).bold(),
        request.amount.minor_units().unwrap_or_default(),
        request.amount.currency.code()
    );
    eprintln!("  Session: {}", request.session_id);
    eprintln!("  Payer: {} <{}>", request.prefill.name, request.prefill.email);

    let session = request.session_id.clone();
    let choice = Select::new()
        .with_prompt("Payment")
        .items(&["Enter payment confirmation", "Payment failed", "Cancel"])
        .default(0)
        .interact();

    match choice {
        Ok(0) => {
            let payment_id: Result<String, _> = Input::new().with_prompt("Payment ID").interact_text();
            let signature: Result<String, _> = Input::new().with_prompt("Signature").interact_text();
            match (payment_id, signature) {
                (Ok(payment_id), Ok(signature)) => PaymentEvent::succeeded(PaymentReceipt {
                    order_session_id: session,
                    payment_id: PaymentId::new(payment_id.trim()),
                    signature: signature.trim().to_string(),
                }),
                _ => PaymentEvent::cancelled(session),
            }
        }
        Ok(1) => {
            let reason = Input::<String>::new()
                .with_prompt("Reason")
                .default("Payment declined".to_string())
                .interact_text()
                .unwrap_or_else(|_| "Payment declined".to_string());
            PaymentEvent::failed(session, reason)
        }
        _ => PaymentEvent::cancelled(session),
    }
}

/// Run the checkout command.
pub async fn run(args: CheckoutArgs, ctx: &Context) -> Result<()> {
    let cart = ctx.cart()?;
    if cart.is_empty() {
        bail!("Your cart is empty");
    }
    if !ctx.output.is_json() {
        print_cart(&cart.get_cart(), cart.summary(), cart.currency(), ctx);
    }

    let details = collect_details(args.shipping_details(), ctx.output.is_json())?;
    let preset = args.payment_id.zip(args.signature);

    let (channel, mut events) = PaymentChannel::pair();
    let widget = TerminalWidget {
        channel,
        payment_key: ctx.config.store.payment_key.clone(),
        preset,
    };
    let mut checkout = CheckoutOrchestrator::new(cart, ctx.api()?, widget)
        .with_store_name(ctx.config.store.name.clone());

    let state = checkout.run_to_completion(details, &mut events).await?;
    report(&state, ctx)
}

impl CheckoutArgs {
    fn shipping_details(&self) -> ShippingDetails {
        ShippingDetails {
            customer_name: self.name.clone().unwrap_or_default(),
            customer_email: self.email.clone().unwrap_or_default(),
            customer_phone: self.phone.clone().unwrap_or_default(),
            shipping_address: self.address.clone().unwrap_or_default(),
            shipping_city: self.city.clone().unwrap_or_default(),
            shipping_state: self.state.clone().unwrap_or_default(),
            shipping_pincode: self.pincode.clone().unwrap_or_default(),
        }
    }
}

/// Prompt for any blank field unless running non-interactively.
fn collect_details(mut details: ShippingDetails, non_interactive: bool) -> Result<ShippingDetails> {
    if non_interactive {
        return Ok(details);
    }
    let fields: [(&str, &mut String); 7] = [
        ("Full name", &mut details.customer_name),
        ("Email", &mut details.customer_email),
        ("Phone", &mut details.customer_phone),
        ("Address", &mut details.shipping_address),
        ("City", &mut details.shipping_city),
        ("State", &mut details.shipping_state),
        ("Pincode", &mut details.shipping_pincode),
    ];
    for (label, value) in fields {
        if value.trim().is_empty() {
            *value = Input::new().with_prompt(label).interact_text()?;
        }
    }
    Ok(details)
}

fn report(state: &CheckoutState, ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        let body = match state {
            CheckoutState::Completed { order_number } => {
                json!({ "state": state.as_str(), "order_number": order_number })
            }
            CheckoutState::Failed(failure) => json!({
                "state": state.as_str(),
                "reason": failure.code(),
                "message": failure.to_string(),
            }),
            other => json!({ "state": other.as_str() }),
        };
        ctx.output.json(&body);
    }

    match state {
        CheckoutState::Completed { order_number } => {
            ctx.output.success(&format!("Order placed: {}", order_number));
            ctx.output.info(&format!(
                "Track it with: storefront track {}",
                order_number
            ));
            Ok(())
        }
        CheckoutState::Idle => {
            ctx.output.info("Payment cancelled. Your cart has been kept.");
            Ok(())
        }
        CheckoutState::Failed(failure) => {
            bail!("{}", failure)
        }
        other => bail!("Checkout stopped in state {}", other),
    }
}
