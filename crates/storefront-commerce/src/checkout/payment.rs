//! Payment widget seam.
//!
//! The hosted payment widget is callback driven. Here it is split in two: a
//! synchronous [`PaymentWidget::open`] handoff, and a [`PaymentChannel`] the
//! widget's callbacks push [`PaymentEvent`]s into. Every event carries the
//! session id it belongs to, so the orchestrator can drop late callbacks from
//! an abandoned attempt.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::ids::{OrderNumber, PaymentId, PaymentSessionId};
use crate::money::Money;

/// Customer details pre-filled in the widget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PaymentPrefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

/// Everything the widget needs to take one payment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentRequest {
    pub session_id: PaymentSessionId,
    pub order_number: OrderNumber,
    /// Amount confirmed by the backend at order creation.
    pub amount: Money,
    pub store_name: String,
    pub description: String,
    pub prefill: PaymentPrefill,
}

/// Identifiers the widget reports on success, to be verified by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentReceipt {
    pub order_session_id: PaymentSessionId,
    pub payment_id: PaymentId,
    pub signature: String,
}

/// How a payment session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Succeeded(PaymentReceipt),
    Failed(String),
    /// The customer dismissed the widget.
    Cancelled,
}

/// A widget callback, tagged with its session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentEvent {
    pub session_id: PaymentSessionId,
    pub outcome: PaymentOutcome,
}

impl PaymentEvent {
    pub fn succeeded(receipt: PaymentReceipt) -> Self {
        Self {
            session_id: receipt.order_session_id.clone(),
            outcome: PaymentOutcome::Succeeded(receipt),
        }
    }

    pub fn failed(session_id: PaymentSessionId, reason: impl Into<String>) -> Self {
        Self {
            session_id,
            outcome: PaymentOutcome::Failed(reason.into()),
        }
    }

    pub fn cancelled(session_id: PaymentSessionId) -> Self {
        Self {
            session_id,
            outcome: PaymentOutcome::Cancelled,
        }
    }
}

/// An external payment widget.
pub trait PaymentWidget: Send + Sync {
    /// Open the widget for a payment session.
    ///
    /// Returns once the widget has taken over; the result arrives later as a
    /// [`PaymentEvent`]. An error means the widget could not be opened.
    fn open(&self, request: PaymentRequest) -> Result<(), String>;
}

impl<W: PaymentWidget + ?Sized> PaymentWidget for &W {
    fn open(&self, request: PaymentRequest) -> Result<(), String> {
        (**self).open(request)
    }
}

impl<W: PaymentWidget + ?Sized> PaymentWidget for std::sync::Arc<W> {
    fn open(&self, request: PaymentRequest) -> Result<(), String> {
        (**self).open(request)
    }
}

/// Sending half of the payment event channel, held by widget callbacks.
#[derive(Debug, Clone)]
pub struct PaymentChannel {
    tx: mpsc::UnboundedSender<PaymentEvent>,
}

/// Receiving half of the payment event channel, drained by the orchestrator.
#[derive(Debug)]
pub struct PaymentEvents {
    rx: mpsc::UnboundedReceiver<PaymentEvent>,
}

impl PaymentChannel {
    /// Create a connected channel pair.
    pub fn pair() -> (PaymentChannel, PaymentEvents) {
        let (tx, rx) = mpsc::unbounded_channel();
        (PaymentChannel { tx }, PaymentEvents { rx })
    }

    /// Deliver an event. Returns `false` if nobody is listening any more.
    pub fn send(&self, event: PaymentEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

impl PaymentEvents {
    /// Wait for the next event; `None` once every sender is gone.
    pub async fn next(&mut self) -> Option<PaymentEvent> {
        self.rx.recv().await
    }

    /// Take an event if one is already queued.
    pub fn try_next(&mut self) -> Option<PaymentEvent> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_delivers_in_order() {
        let (channel, mut events) = PaymentChannel::pair();
        let session = PaymentSessionId::new("order_1");

        assert!(channel.send(PaymentEvent::failed(session.clone(), "declined")));
        assert!(channel.send(PaymentEvent::cancelled(session.clone())));

        assert_eq!(
            events.next().await.map(|e| e.outcome),
            Some(PaymentOutcome::Failed("declined".to_string()))
        );
        assert_eq!(events.try_next().map(|e| e.outcome), Some(PaymentOutcome::Cancelled));
        assert!(events.try_next().is_none());
    }

    #[tokio::test]
    async fn test_closed_channel_ends_stream() {
        let (channel, mut events) = PaymentChannel::pair();
        drop(channel);
        assert!(events.next().await.is_none());
    }

    #[test]
    fn test_succeeded_event_uses_receipt_session() {
        let event = PaymentEvent::succeeded(PaymentReceipt {
            order_session_id: PaymentSessionId::new("order_9"),
            payment_id: PaymentId::new("pay_1"),
            signature: "sig".to_string(),
        });
        assert_eq!(event.session_id.as_str(), "order_9");
    }
}
