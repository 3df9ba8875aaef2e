//! Persisted cart store.

use std::sync::{Mutex, MutexGuard};

use storefront_cache::{CacheError, KvStore, Slot};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::cart::{items_count, items_total, CartLineItem, CartSummary};
use crate::catalog::Product;
use crate::ids::ProductId;
use crate::money::{Currency, Money};

/// The single owner of the customer's cart.
///
/// Every mutation runs as one load, modify, persist unit under an internal
/// lock, so concurrent readers only ever see a whole cart. Persistence is
/// best effort: when the store is unavailable the change still takes effect
/// in memory and callers are not told. Malformed persisted data reads as an
/// empty cart.
///
/// # Example
///
/// ```rust,ignore
/// let cart = CartStore::new(FileStore::open(dir)?, "cart", Currency::INR);
/// cart.add_item(&product, 1);
/// println!("{} items, {}", cart.get_count(), cart.get_total());
/// ```
pub struct CartStore<S> {
    slot: Slot<Vec<CartLineItem>, S>,
    currency: Currency,
    /// Last cart this store produced; read back when the store fails.
    mirror: Mutex<Vec<CartLineItem>>,
    summary: watch::Sender<CartSummary>,
}

impl<S: KvStore> CartStore<S> {
    /// Bind a cart to a named slot in `store`.
    pub fn new(store: S, slot_name: impl Into<String>, currency: Currency) -> Self {
        let slot = Slot::new(store, slot_name);
        let items = read_slot(&slot, &[]);
        let (summary, _) = watch::channel(CartSummary::from_items(&items, currency));
        Self {
            slot,
            currency,
            mirror: Mutex::new(items),
            summary,
        }
    }

    /// Currency the cart totals are expressed in.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Current cart contents in insertion order.
    pub fn get_cart(&self) -> Vec<CartLineItem> {
        let mirror = self.lock();
        read_slot(&self.slot, &mirror)
    }

    /// Add `quantity` units of a product.
    ///
    /// Increments an existing line for the same product; otherwise appends a
    /// line priced at the product's discounted price. A quantity below 1 is a
    /// no-op, as is a new product whose price cannot be discounted.
    pub fn add_item(&self, product: &Product, quantity: i64) -> Vec<CartLineItem> {
        if quantity < 1 {
            debug!(product_id = %product.id, quantity, "Ignoring add with non-positive quantity");
            return self.get_cart();
        }
        self.mutate(|items| {
            match items.iter_mut().find(|i| i.product_id == product.id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(quantity);
                }
                None => match CartLineItem::from_product(product, quantity) {
                    Some(item) => items.push(item),
                    None => {
                        warn!(
                            product_id = %product.id,
                            price = %product.price,
                            discount = %product.discount,
                            "Ignoring product with unusable price"
                        );
                        return false;
                    }
                },
            }
            debug!(product_id = %product.id, quantity, "Added to cart");
            true
        })
    }

    /// Set a line's quantity exactly. A quantity of 0 or less removes the
    /// line; an unknown product leaves the cart unchanged.
    pub fn update_quantity(&self, product_id: &ProductId, quantity: i64) -> Vec<CartLineItem> {
        if quantity <= 0 {
            return self.remove_item(product_id);
        }
        self.mutate(|items| match items.iter_mut().find(|i| &i.product_id == product_id) {
            Some(existing) => {
                existing.quantity = quantity;
                debug!(product_id = %product_id, quantity, "Updated cart quantity");
                true
            }
            None => false,
        })
    }

    /// Remove a product's line if present. The cart is persisted either way.
    pub fn remove_item(&self, product_id: &ProductId) -> Vec<CartLineItem> {
        self.mutate(|items| {
            items.retain(|i| &i.product_id != product_id);
            debug!(product_id = %product_id, "Removed from cart");
            true
        })
    }

    /// Empty the cart. Idempotent.
    pub fn clear(&self) {
        let mut mirror = self.lock();
        mirror.clear();
        if let Err(e) = self.slot.clear() {
            warn!(slot = self.slot.name(), error = %e, "Cart cleared in memory only");
        }
        debug!("Cleared cart");
        self.publish(&mirror);
    }

    /// `Σ(price × quantity)`; rounded only when displayed.
    pub fn get_total(&self) -> Money {
        Money::new(items_total(&self.get_cart()), self.currency)
    }

    /// `Σ(quantity)`, for badge display.
    pub fn get_count(&self) -> i64 {
        items_count(&self.get_cart())
    }

    /// Check if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.get_cart().is_empty()
    }

    /// Current count and total.
    pub fn summary(&self) -> CartSummary {
        CartSummary::from_items(&self.get_cart(), self.currency)
    }

    /// Receive a fresh [`CartSummary`] after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<CartSummary> {
        self.summary.subscribe()
    }

    fn mutate(&self, apply: impl FnOnce(&mut Vec<CartLineItem>) -> bool) -> Vec<CartLineItem> {
        let mut mirror = self.lock();
        let mut items = read_slot(&self.slot, &mirror);
        let changed = apply(&mut items);
        if changed {
            if let Err(e) = self.slot.store(&items) {
                warn!(slot = self.slot.name(), error = %e, "Cart change kept in memory only");
            }
        }
        *mirror = items.clone();
        if changed {
            self.publish(&items);
        }
        items
    }

    fn publish(&self, items: &[CartLineItem]) {
        self.summary
            .send_replace(CartSummary::from_items(items, self.currency));
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CartLineItem>> {
        self.mirror.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Read the persisted cart, falling back to `fallback` when the store itself
/// fails and to an empty cart when the stored value is malformed.
fn read_slot<S: KvStore>(
    slot: &Slot<Vec<CartLineItem>, S>,
    fallback: &[CartLineItem],
) -> Vec<CartLineItem> {
    match slot.load() {
        Ok(Some(items)) => normalize(items),
        Ok(None) => Vec::new(),
        Err(CacheError::SerializeError(e)) => {
            warn!(slot = slot.name(), error = %e, "Discarding malformed cart");
            Vec::new()
        }
        Err(e) => {
            warn!(slot = slot.name(), error = %e, "Cart storage unavailable, using memory");
            fallback.to_vec()
        }
    }
}

/// Drop lines with a non-positive quantity and merge duplicate product ids,
/// so a hand-edited store cannot break the cart's invariants.
fn normalize(items: Vec<CartLineItem>) -> Vec<CartLineItem> {
    let mut out: Vec<CartLineItem> = Vec::with_capacity(items.len());
    for item in items.into_iter().filter(|i| i.quantity > 0) {
        match out.iter_mut().find(|o| o.product_id == item.product_id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(item.quantity),
            None => out.push(item),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rust_decimal::Decimal;
    use std::collections::HashSet;
    use std::sync::Arc;
    use storefront_cache::MemoryStore;

    fn product(id: &str, price: i64, discount: i64) -> Product {
        let mut p = Product::new(id, format!("Product {id}"), Decimal::from(price));
        p.discount = Decimal::from(discount);
        p.images = vec![format!("{id}.jpg")];
        p
    }

    fn store() -> (Arc<MemoryStore>, CartStore<Arc<MemoryStore>>) {
        let backing = Arc::new(MemoryStore::new());
        let cart = CartStore::new(backing.clone(), "cart", Currency::INR);
        (backing, cart)
    }

    #[test]
    fn test_update_to_zero_removes_line() {
        let (_, cart) = store();
        cart.add_item(&product("P1", 100, 0), 2);
        assert_eq!(cart.get_total().display_amount(), "200.00");

        let items = cart.update_quantity(&ProductId::new("P1"), 0);
        assert!(items.is_empty());
        assert!(cart.get_cart().is_empty());
        assert_eq!(cart.get_total().display_amount(), "0.00");
    }

    #[test]
    fn test_repeated_add_merges_discounted_line() {
        let (_, cart) = store();
        let p2 = product("P2", 200, 50);
        cart.add_item(&p2, 1);
        cart.add_item(&p2, 2);

        let items = cart.get_cart();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id.as_str(), "P2");
        assert_eq!(items[0].price, Decimal::from(100));
        assert_eq!(items[0].quantity, 3);
        assert_eq!(items[0].image, "P2.jpg");
        assert_eq!(cart.get_total().display_amount(), "300.00");
        assert_eq!(cart.get_count(), 3);
    }

    #[test]
    fn test_discount_above_hundred_never_goes_negative() {
        let (_, cart) = store();
        cart.add_item(&product("P1", 100, 150), 1);

        let items = cart.get_cart();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].price, Decimal::ZERO);
        assert_eq!(cart.get_total().display_amount(), "0.00");
    }

    #[test]
    fn test_negative_discount_and_negative_price() {
        let (_, cart) = store();
        cart.add_item(&product("P1", 10, 0), 1);

        cart.add_item(&product("P2", 1_000_000, -10), 1);
        let items = cart.add_item(&product("P3", -50, 0), 1);

        assert_eq!(items.len(), 2);
        assert_eq!(items[1].price, Decimal::from(1_000_000));
        assert!(items.iter().all(|i| i.product_id.as_str() != "P3"));
        assert!(items.iter().all(|i| i.price >= Decimal::ZERO));
    }

    #[test]
    fn test_add_with_non_positive_quantity_is_noop() {
        let (_, cart) = store();
        cart.add_item(&product("P1", 10, 0), 0);
        cart.add_item(&product("P1", 10, 0), -3);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_unknown_product_is_noop() {
        let (_, cart) = store();
        cart.add_item(&product("P1", 10, 0), 1);
        let items = cart.update_quantity(&ProductId::new("nope"), 5);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 1);
    }

    #[test]
    fn test_update_sets_quantity_exactly() {
        let (_, cart) = store();
        cart.add_item(&product("P1", 10, 0), 4);
        cart.update_quantity(&ProductId::new("P1"), 2);
        assert_eq!(cart.get_count(), 2);
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let (_, cart) = store();
        for id in ["c", "a", "b"] {
            cart.add_item(&product(id, 1, 0), 1);
        }
        cart.add_item(&product("a", 1, 0), 1);
        let ids: Vec<_> = cart.get_cart().into_iter().map(|i| i.product_id.into_inner()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let (backing, cart) = store();
        cart.add_item(&product("P1", 10, 0), 1);
        cart.clear();
        assert!(cart.get_cart().is_empty());
        cart.clear();
        assert!(cart.get_cart().is_empty());
        assert!(!backing.exists("cart").unwrap());
    }

    #[test]
    fn test_cart_survives_reload() {
        let backing = Arc::new(MemoryStore::new());
        {
            let cart = CartStore::new(backing.clone(), "cart", Currency::INR);
            cart.add_item(&product("P1", 10, 0), 2);
        }
        let reloaded = CartStore::new(backing, "cart", Currency::INR);
        assert_eq!(reloaded.get_count(), 2);
    }

    #[test]
    fn test_malformed_store_reads_as_empty() {
        let (backing, cart) = store();
        backing.set("cart", b"[{\"product_id\": 1").unwrap();
        assert!(cart.get_cart().is_empty());
        assert_eq!(cart.get_count(), 0);

        cart.add_item(&product("P1", 10, 0), 1);
        assert_eq!(cart.get_count(), 1);
    }

    #[test]
    fn test_persisted_invalid_lines_are_normalized() {
        let (backing, cart) = store();
        let raw = r#"[
            {"product_id": "a", "product_name": "A", "price": 5, "quantity": 0, "image": ""},
            {"product_id": "b", "product_name": "B", "price": 5, "quantity": 1, "image": ""},
            {"product_id": "b", "product_name": "B", "price": 5, "quantity": 2, "image": ""}
        ]"#;
        backing.set("cart", raw.as_bytes()).unwrap();

        let items = cart.get_cart();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 3);
    }

    #[test]
    fn test_unavailable_store_degrades_to_memory() {
        let (backing, cart) = store();
        cart.add_item(&product("P1", 10, 0), 1);

        backing.set_unavailable(true);
        cart.add_item(&product("P1", 10, 0), 1);
        cart.add_item(&product("P2", 5, 0), 1);
        assert_eq!(cart.get_count(), 3);
        assert_eq!(cart.get_total().display_amount(), "25.00");

        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_subscribers_see_every_change() {
        let (_, cart) = store();
        let mut rx = cart.subscribe();
        assert!(rx.borrow_and_update().is_empty());

        cart.add_item(&product("P1", 100, 10), 2);
        assert!(rx.has_changed().unwrap());
        let summary = *rx.borrow_and_update();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.total.display_amount(), "180.00");

        cart.clear();
        assert!(rx.borrow_and_update().is_empty());
    }

    #[test]
    fn test_random_operation_sequences_keep_invariants() {
        let mut rng = StdRng::seed_from_u64(0x5eed_ca27);
        let catalog: Vec<Product> = (0..6)
            .map(|i| product(&format!("p{i}"), rng.gen_range(1..500), rng.gen_range(0..=90)))
            .collect();

        for _ in 0..50 {
            let (_, cart) = store();
            for _ in 0..60 {
                let target = &catalog[rng.gen_range(0..catalog.len())];
                match rng.gen_range(0..4) {
                    0 => {
                        cart.add_item(target, rng.gen_range(-1..5));
                    }
                    1 => {
                        cart.update_quantity(&target.id, rng.gen_range(-2..8));
                    }
                    2 => {
                        cart.remove_item(&target.id);
                    }
                    _ => {
                        if rng.gen_bool(0.1) {
                            cart.clear();
                        }
                    }
                }

                let items = cart.get_cart();
                assert!(items.iter().all(|i| i.quantity >= 1));
                let ids: HashSet<_> = items.iter().map(|i| i.product_id.clone()).collect();
                assert_eq!(ids.len(), items.len());

                let expected: Decimal = items
                    .iter()
                    .map(|i| i.price * Decimal::from(i.quantity))
                    .sum();
                assert_eq!(cart.get_total().amount, expected);
                assert_eq!(cart.get_count(), items.iter().map(|i| i.quantity).sum::<i64>());
            }
        }
    }
}
