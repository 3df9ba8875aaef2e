use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;
use storefront_cache::MemoryStore;
use storefront_commerce::checkout::BackendResult;
use storefront_commerce::prelude::*;

struct FakeBackend {
    create: Mutex<Option<BackendResult<OrderHandle>>>,
    verify: BackendResult<()>,
    created: Mutex<Vec<CreateOrderRequest>>,
    verified: Mutex<Vec<PaymentReceipt>>,
}

impl FakeBackend {
    fn new(create: BackendResult<OrderHandle>, verify: BackendResult<()>) -> Arc<Self> {
        Arc::new(Self {
            create: Mutex::new(Some(create)),
            verify,
            created: Mutex::new(Vec::new()),
            verified: Mutex::new(Vec::new()),
        })
    }

    fn created(&self) -> Vec<CreateOrderRequest> {
        self.created.lock().unwrap().clone()
    }

    fn verified(&self) -> Vec<PaymentReceipt> {
        self.verified.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderBackend for FakeBackend {
    async fn create_order(&self, request: &CreateOrderRequest) -> BackendResult<OrderHandle> {
        self.created.lock().unwrap().push(request.clone());
        self.create
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(BackendError::Network("no more responses".to_string())))
    }

    async fn verify_payment(&self, receipt: &PaymentReceipt) -> BackendResult<()> {
        self.verified.lock().unwrap().push(receipt.clone());
        self.verify.clone()
    }
}

#[derive(Default)]
struct RecordingWidget {
    opened: Mutex<Vec<PaymentRequest>>,
    refuse: bool,
}

impl RecordingWidget {
    fn opened(&self) -> Vec<PaymentRequest> {
        self.opened.lock().unwrap().clone()
    }
}

impl PaymentWidget for RecordingWidget {
    fn open(&self, request: PaymentRequest) -> Result<(), String> {
        if self.refuse {
            return Err("script blocked".to_string());
        }
        self.opened.lock().unwrap().push(request);
        Ok(())
    }
}

type Checkout =
    CheckoutOrchestrator<Arc<MemoryStore>, Arc<FakeBackend>, Arc<RecordingWidget>>;

fn details() -> ShippingDetails {
    ShippingDetails {
        customer_name: "Asha Rao".to_string(),
        customer_email: "asha@example.com".to_string(),
        customer_phone: "9876543210".to_string(),
        shipping_address: "12 MG Road".to_string(),
        shipping_city: "Bengaluru".to_string(),
        shipping_state: "Karnataka".to_string(),
        shipping_pincode: "560001".to_string(),
    }
}

fn handle(session: Option<&str>, total: i64) -> OrderHandle {
    OrderHandle {
        order_number: OrderNumber::new("ORD-1001"),
        total: Money::new(Decimal::from(total), Currency::INR),
        payment_session_id: session.map(PaymentSessionId::new),
    }
}

fn receipt(session: &str) -> PaymentReceipt {
    PaymentReceipt {
        order_session_id: PaymentSessionId::new(session),
        payment_id: PaymentId::new("pay_1"),
        signature: "sig".to_string(),
    }
}

fn filled_cart() -> Arc<CartStore<Arc<MemoryStore>>> {
    let cart = Arc::new(CartStore::new(
        Arc::new(MemoryStore::new()),
        "cart",
        Currency::INR,
    ));
    let mut kettle = Product::new("P2", "Kettle", Decimal::from(200));
    kettle.discount = Decimal::from(50);
    cart.add_item(&kettle, 3);
    cart.add_item(&Product::new("P7", "Mug", Decimal::new(4950, 2)), 1);
    cart
}

fn checkout(
    cart: &Arc<CartStore<Arc<MemoryStore>>>,
    backend: &Arc<FakeBackend>,
    widget: &Arc<RecordingWidget>,
) -> Checkout {
    CheckoutOrchestrator::new(cart.clone(), backend.clone(), widget.clone())
}

#[tokio::test]
async fn test_happy_path_clears_cart_once() {
    let cart = filled_cart();
    let backend = FakeBackend::new(Ok(handle(Some("order_A"), 360)), Ok(()));
    let widget = Arc::new(RecordingWidget::default());
    let mut flow = checkout(&cart, &backend, &widget);
    let mut clears = cart.subscribe();
    clears.borrow_and_update();

    flow.submit(details()).await.unwrap();
    assert_eq!(flow.state(), &CheckoutState::AwaitingPayment);
    assert_eq!(flow.active_session().map(|s| s.as_str()), Some("order_A"));

    let sent = backend.created();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].items.len(), 2);
    assert_eq!(sent[0].subtotal, Decimal::new(34950, 2));

    let opened = widget.opened();
    assert_eq!(opened.len(), 1);
    assert_eq!(opened[0].description, "Order ORD-1001");
    assert_eq!(opened[0].prefill.contact, "9876543210");

    let disposition = flow
        .handle_payment_event(PaymentEvent::succeeded(receipt("order_A")))
        .await;
    assert_eq!(disposition, EventDisposition::Applied);
    assert_eq!(
        flow.state(),
        &CheckoutState::Completed {
            order_number: OrderNumber::new("ORD-1001")
        }
    );
    assert!(cart.is_empty());
    assert_eq!(backend.verified(), vec![receipt("order_A")]);
    assert!(flow.active_session().is_none());
    assert!(flow.last_error().is_none());
    assert!(clears.has_changed().unwrap());
}

#[tokio::test]
async fn test_widget_amount_comes_from_backend_total() {
    let cart = filled_cart();
    let backend = FakeBackend::new(Ok(handle(Some("order_A"), 400)), Ok(()));
    let widget = Arc::new(RecordingWidget::default());
    let mut flow = checkout(&cart, &backend, &widget);

    flow.submit(details()).await.unwrap();

    let opened = widget.opened();
    assert_eq!(opened[0].amount.amount, Decimal::from(400));
    assert_eq!(opened[0].amount.minor_units(), Some(40000));
    assert_ne!(opened[0].amount, cart.get_total());
}

#[tokio::test]
async fn test_missing_session_fails_with_cart_intact() {
    let cart = filled_cart();
    let before = cart.get_cart();
    let backend = FakeBackend::new(Ok(handle(None, 360)), Ok(()));
    let widget = Arc::new(RecordingWidget::default());
    let mut flow = checkout(&cart, &backend, &widget);

    flow.submit(details()).await.unwrap();

    assert_eq!(
        flow.state(),
        &CheckoutState::Failed(CheckoutFailure::GatewayNotConfigured)
    );
    assert_eq!(flow.last_error(), Some(&CheckoutFailure::GatewayNotConfigured));
    assert_eq!(cart.get_cart(), before);
    assert!(widget.opened().is_empty());
}

#[tokio::test]
async fn test_cancel_returns_to_idle_with_cart_intact() {
    let cart = filled_cart();
    let before = cart.get_cart();
    let backend = FakeBackend::new(Ok(handle(Some("order_A"), 360)), Ok(()));
    let widget = Arc::new(RecordingWidget::default());
    let mut flow = checkout(&cart, &backend, &widget);

    flow.submit(details()).await.unwrap();
    let disposition = flow
        .handle_payment_event(PaymentEvent::cancelled(PaymentSessionId::new("order_A")))
        .await;

    assert_eq!(disposition, EventDisposition::Applied);
    assert_eq!(flow.state(), &CheckoutState::Idle);
    assert!(flow.last_error().is_none());
    assert_eq!(cart.get_cart(), before);
    assert!(backend.verified().is_empty());
}

#[tokio::test]
async fn test_verification_failure_keeps_cart() {
    let cart = filled_cart();
    let before = cart.get_cart();
    let backend = FakeBackend::new(
        Ok(handle(Some("order_A"), 360)),
        Err(BackendError::Rejected {
            status: 400,
            message: "Invalid signature".to_string(),
        }),
    );
    let widget = Arc::new(RecordingWidget::default());
    let mut flow = checkout(&cart, &backend, &widget);

    flow.submit(details()).await.unwrap();
    flow.handle_payment_event(PaymentEvent::succeeded(receipt("order_A")))
        .await;

    assert!(matches!(
        flow.state(),
        CheckoutState::Failed(CheckoutFailure::Verification(_))
    ));
    assert_eq!(cart.get_cart(), before);
}

#[tokio::test]
async fn test_network_failure_is_retryable() {
    let cart = filled_cart();
    let backend = FakeBackend::new(
        Err(BackendError::Network("connection refused".to_string())),
        Ok(()),
    );
    let widget = Arc::new(RecordingWidget::default());
    let mut flow = checkout(&cart, &backend, &widget);

    flow.submit(details()).await.unwrap();
    assert_eq!(flow.last_error().map(|e| e.code()), Some("network"));
    assert!(!cart.is_empty());

    // A failed attempt may be retried directly.
    assert!(flow.submit(details()).await.is_ok());
    assert_eq!(backend.created().len(), 2);
}

#[tokio::test]
async fn test_stale_event_is_ignored() {
    let cart = filled_cart();
    let backend = FakeBackend::new(Ok(handle(Some("order_B"), 360)), Ok(()));
    let widget = Arc::new(RecordingWidget::default());
    let mut flow = checkout(&cart, &backend, &widget);

    // Before any attempt.
    let early = flow
        .handle_payment_event(PaymentEvent::succeeded(receipt("order_A")))
        .await;
    assert_eq!(early, EventDisposition::Ignored);
    assert_eq!(flow.state(), &CheckoutState::Idle);

    flow.submit(details()).await.unwrap();
    let stale = flow
        .handle_payment_event(PaymentEvent::succeeded(receipt("order_A")))
        .await;
    assert_eq!(stale, EventDisposition::Ignored);
    assert_eq!(flow.state(), &CheckoutState::AwaitingPayment);
    assert!(backend.verified().is_empty());
    assert!(!cart.is_empty());
}

#[tokio::test]
async fn test_submit_while_awaiting_payment_is_rejected() {
    let cart = filled_cart();
    let backend = FakeBackend::new(Ok(handle(Some("order_A"), 360)), Ok(()));
    let widget = Arc::new(RecordingWidget::default());
    let mut flow = checkout(&cart, &backend, &widget);

    flow.submit(details()).await.unwrap();
    let second = flow.submit(details()).await;

    assert!(matches!(second, Err(CommerceError::CheckoutInFlight(_))));
    assert_eq!(flow.state(), &CheckoutState::AwaitingPayment);
    assert_eq!(backend.created().len(), 1);
}

#[tokio::test]
async fn test_empty_cart_and_invalid_form_fail_before_backend() {
    let empty = Arc::new(CartStore::new(
        Arc::new(MemoryStore::new()),
        "cart",
        Currency::INR,
    ));
    let backend = FakeBackend::new(Ok(handle(Some("order_A"), 1)), Ok(()));
    let widget = Arc::new(RecordingWidget::default());

    let mut flow = checkout(&empty, &backend, &widget);
    flow.submit(details()).await.unwrap();
    assert_eq!(flow.last_error(), Some(&CheckoutFailure::EmptyCart));

    let cart = filled_cart();
    let mut flow = checkout(&cart, &backend, &widget);
    let mut bad = details();
    bad.shipping_pincode = "5600".to_string();
    flow.submit(bad).await.unwrap();
    assert_eq!(
        flow.last_error(),
        Some(&CheckoutFailure::Validation("Pincode must be 6 digits".to_string()))
    );
    assert!(backend.created().is_empty());
}

#[tokio::test]
async fn test_widget_open_failure() {
    let cart = filled_cart();
    let backend = FakeBackend::new(Ok(handle(Some("order_A"), 360)), Ok(()));
    let widget = Arc::new(RecordingWidget {
        refuse: true,
        ..Default::default()
    });
    let mut flow = checkout(&cart, &backend, &widget);

    flow.submit(details()).await.unwrap();
    assert_eq!(flow.last_error().map(|e| e.code()), Some("widget_unavailable"));
    assert!(flow.active_session().is_none());
    assert!(!cart.is_empty());
}

#[tokio::test]
async fn test_run_to_completion_over_channel() {
    let cart = filled_cart();
    let backend = FakeBackend::new(Ok(handle(Some("order_A"), 360)), Ok(()));
    let widget = Arc::new(RecordingWidget::default());
    let mut flow = checkout(&cart, &backend, &widget);

    let (channel, mut events) = PaymentChannel::pair();
    channel.send(PaymentEvent::failed(PaymentSessionId::new("order_old"), "late"));
    channel.send(PaymentEvent::succeeded(receipt("order_A")));

    let state = flow.run_to_completion(details(), &mut events).await.unwrap();
    assert!(matches!(state, CheckoutState::Completed { .. }));
    assert!(cart.is_empty());

    assert!(flow.reset());
    assert_eq!(flow.state(), &CheckoutState::Idle);
}

#[tokio::test]
async fn test_closed_channel_counts_as_cancel() {
    let cart = filled_cart();
    let backend = FakeBackend::new(Ok(handle(Some("order_A"), 360)), Ok(()));
    let widget = Arc::new(RecordingWidget::default());
    let mut flow = checkout(&cart, &backend, &widget);

    let (channel, mut events) = PaymentChannel::pair();
    drop(channel);

    let state = flow.run_to_completion(details(), &mut events).await.unwrap();
    assert_eq!(state, CheckoutState::Idle);
    assert!(!cart.is_empty());
}

#[tokio::test]
async fn test_payment_failure_keeps_cart_and_skips_verify() {
    let cart = filled_cart();
    let before = cart.get_cart();
    let backend = FakeBackend::new(Ok(handle(Some("order_A"), 360)), Ok(()));
    let widget = Arc::new(RecordingWidget::default());
    let mut flow = checkout(&cart, &backend, &widget);

    flow.submit(details()).await.unwrap();
    let disposition = flow
        .handle_payment_event(PaymentEvent::failed(
            PaymentSessionId::new("order_A"),
            "card declined",
        ))
        .await;

    assert_eq!(disposition, EventDisposition::Applied);
    assert_eq!(
        flow.state(),
        &CheckoutState::Failed(CheckoutFailure::PaymentFailed("card declined".to_string()))
    );
    assert_eq!(flow.last_error().map(|e| e.code()), Some("payment_failed"));
    assert!(flow.active_session().is_none());
    assert_eq!(cart.get_cart(), before);
    assert!(backend.verified().is_empty());
}

#[tokio::test]
async fn test_cancel_only_while_awaiting_payment() {
    let cart = filled_cart();
    let before = cart.get_cart();
    let backend = FakeBackend::new(Ok(handle(Some("order_A"), 360)), Ok(()));
    let widget = Arc::new(RecordingWidget::default());
    let mut flow = checkout(&cart, &backend, &widget);

    assert!(!flow.cancel());
    assert_eq!(flow.state(), &CheckoutState::Idle);

    flow.submit(details()).await.unwrap();
    assert!(flow.cancel());
    assert_eq!(flow.state(), &CheckoutState::Idle);
    assert!(flow.active_session().is_none());
    assert!(flow.last_error().is_none());
    assert_eq!(cart.get_cart(), before);
    assert!(!flow.cancel());

    // The cancelled session can no longer complete the order.
    let late = flow
        .handle_payment_event(PaymentEvent::succeeded(receipt("order_A")))
        .await;
    assert_eq!(late, EventDisposition::Ignored);
    assert!(backend.verified().is_empty());

    // Nothing to cancel once the attempt has failed.
    let failing = FakeBackend::new(Err(BackendError::Network("down".to_string())), Ok(()));
    let mut flow = checkout(&cart, &failing, &widget);
    flow.submit(details()).await.unwrap();
    assert!(!flow.cancel());
    assert!(matches!(flow.state(), CheckoutState::Failed(_)));
}

#[tokio::test]
async fn test_callback_after_terminal_state_is_ignored() {
    let cart = filled_cart();
    let backend = FakeBackend::new(Ok(handle(Some("order_A"), 360)), Ok(()));
    let widget = Arc::new(RecordingWidget::default());
    let mut flow = checkout(&cart, &backend, &widget);

    flow.submit(details()).await.unwrap();
    flow.handle_payment_event(PaymentEvent::succeeded(receipt("order_A")))
        .await;
    assert!(matches!(flow.state(), CheckoutState::Completed { .. }));

    // The customer starts a new cart before the duplicate callback lands.
    cart.add_item(&Product::new("P9", "Spoon", Decimal::from(30)), 1);
    let mut changes = cart.subscribe();
    changes.borrow_and_update();

    let duplicate = flow
        .handle_payment_event(PaymentEvent::succeeded(receipt("order_A")))
        .await;
    assert_eq!(duplicate, EventDisposition::Ignored);
    assert!(matches!(flow.state(), CheckoutState::Completed { .. }));
    assert_eq!(cart.get_count(), 1);
    assert!(!changes.has_changed().unwrap());
    assert_eq!(backend.verified().len(), 1);

    // Same after a failed payment.
    let cart = filled_cart();
    let backend = FakeBackend::new(Ok(handle(Some("order_B"), 360)), Ok(()));
    let mut flow = checkout(&cart, &backend, &widget);
    flow.submit(details()).await.unwrap();
    flow.handle_payment_event(PaymentEvent::failed(
        PaymentSessionId::new("order_B"),
        "declined",
    ))
    .await;

    let late = flow
        .handle_payment_event(PaymentEvent::succeeded(receipt("order_B")))
        .await;
    assert_eq!(late, EventDisposition::Ignored);
    assert!(matches!(
        flow.state(),
        CheckoutState::Failed(CheckoutFailure::PaymentFailed(_))
    ));
    assert!(!cart.is_empty());
    assert!(backend.verified().is_empty());
}
