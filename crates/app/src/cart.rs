//! In-memory shopping cart store.
//!
//! The cart is an ordered collection of lines keyed by item identity, with
//! four total mutation operations and two derived reads. Mutations on a
//! missing id are no-ops, never errors. The store holds no reference to any
//! collaborator: no persistence, no network, no side effects beyond the
//! in-memory change.
//!
//! Ownership follows the dependency-injected-store model: the cart is a
//! plain value with `&mut self` entry points, and [`crate::state::AppState`]
//! decides how it is shared.

use plateful_core::{ItemId, Price};

/// A product as handed to the cart by a screen.
///
/// `presentation` carries display-only fields (image reference, size,
/// color) as an opaque payload the cart stores but never inspects.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: ItemId,
    pub title: String,
    pub price: Price,
    pub presentation: serde_json::Value,
}

/// One product entry in the cart, with its own quantity.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub id: ItemId,
    pub title: String,
    pub price: Price,
    /// Always `>= 1` while the line exists; a decrease below 1 removes
    /// the line instead.
    pub quantity: u32,
    /// Opaque presentation payload copied from the product.
    pub presentation: serde_json::Value,
}

impl CartLine {
    /// Price for this line: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// The cart aggregate.
///
/// Insertion order is preserved for display stability.
#[derive(Debug, Clone, Default)]
pub struct CartStore {
    lines: Vec<CartLine>,
}

impl CartStore {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add a product to the cart.
    ///
    /// If a line with the product's id already exists its quantity is
    /// incremented; otherwise a new line is inserted with quantity 1.
    /// Always succeeds.
    pub fn add_item(&mut self, product: Product) {
        if let Some(line) = self.find_mut(&product.id) {
            line.quantity += 1;
        } else {
            self.lines.push(CartLine {
                id: product.id,
                title: product.title,
                price: product.price,
                quantity: 1,
                presentation: product.presentation,
            });
        }
    }

    /// Remove the line matching `id`, if any. No-op when absent.
    pub fn remove_item(&mut self, id: &ItemId) {
        self.lines.retain(|line| &line.id != id);
    }

    /// Increment the quantity of the line matching `id`. No-op when absent.
    pub fn increase_quantity(&mut self, id: &ItemId) {
        if let Some(line) = self.find_mut(id) {
            line.quantity += 1;
        }
    }

    /// Decrement the quantity of the line matching `id`.
    ///
    /// At quantity 1 the line is removed entirely; decrease-to-zero is
    /// defined as removal, not an error. No-op when absent.
    pub fn decrease_quantity(&mut self, id: &ItemId) {
        if let Some(index) = self.lines.iter().position(|line| &line.id == id) {
            if self.lines[index].quantity > 1 {
                self.lines[index].quantity -= 1;
            } else {
                self.lines.remove(index);
            }
        }
    }

    /// The current ordered lines. Callers get a read-only view.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Sum of `price × quantity` over all lines, recomputed on read.
    /// Zero for an empty cart.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// True when the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn find_mut(&mut self, id: &ItemId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| &line.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price: &str) -> Product {
        Product {
            id: ItemId::new(id),
            title: format!("Item {id}"),
            price: price.parse().unwrap(),
            presentation: serde_json::json!({ "size": "M", "color": "red" }),
        }
    }

    fn price(s: &str) -> Price {
        s.parse().unwrap()
    }

    #[test]
    fn test_add_same_id_keeps_one_line() {
        let mut cart = CartStore::new();
        for _ in 0..3 {
            cart.add_item(product("A", "10"));
        }
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 3);
    }

    #[test]
    fn test_add_distinct_ids_preserves_insertion_order() {
        let mut cart = CartStore::new();
        cart.add_item(product("B", "5"));
        cart.add_item(product("A", "10"));
        cart.add_item(product("C", "1"));
        let ids: Vec<&str> = cart.lines().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["B", "A", "C"]);
    }

    #[test]
    fn test_total_price_empty_cart_is_zero() {
        assert_eq!(CartStore::new().total_price(), Price::ZERO);
    }

    #[test]
    fn test_total_price_sums_lines() {
        let mut cart = CartStore::new();
        cart.add_item(product("A", "10"));
        cart.add_item(product("A", "10"));
        cart.add_item(product("B", "2.25"));
        assert_eq!(cart.total_price(), price("22.25"));
    }

    #[test]
    fn test_decrease_above_one_only_decrements() {
        let mut cart = CartStore::new();
        cart.add_item(product("A", "10"));
        cart.add_item(product("A", "10"));
        cart.decrease_quantity(&ItemId::new("A"));
        assert_eq!(cart.lines()[0].quantity, 1);
    }

    #[test]
    fn test_decrease_at_one_removes_line() {
        let mut cart = CartStore::new();
        cart.add_item(product("A", "10"));
        cart.decrease_quantity(&ItemId::new("A"));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_decrease_absent_is_noop() {
        let mut cart = CartStore::new();
        cart.add_item(product("A", "10"));
        cart.decrease_quantity(&ItemId::new("missing"));
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 1);
    }

    #[test]
    fn test_missing_id_operations_never_alter_cart() {
        let mut cart = CartStore::new();
        cart.add_item(product("A", "10"));
        let before: Vec<u32> = cart.lines().iter().map(|l| l.quantity).collect();

        cart.remove_item(&ItemId::new("missing"));
        cart.increase_quantity(&ItemId::new("missing"));
        cart.decrease_quantity(&ItemId::new("missing"));

        let after: Vec<u32> = cart.lines().iter().map(|l| l.quantity).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_increase_quantity() {
        let mut cart = CartStore::new();
        cart.add_item(product("A", "3"));
        cart.increase_quantity(&ItemId::new("A"));
        assert_eq!(cart.lines()[0].quantity, 2);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_remove_item() {
        let mut cart = CartStore::new();
        cart.add_item(product("A", "3"));
        cart.add_item(product("B", "4"));
        cart.remove_item(&ItemId::new("A"));
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].id.as_str(), "B");
    }

    #[test]
    fn test_add_add_decrease_decrease_scenario() {
        let mut cart = CartStore::new();
        cart.add_item(product("A", "10"));
        cart.add_item(product("A", "10"));
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
        assert_eq!(cart.total_price(), price("20"));

        cart.decrease_quantity(&ItemId::new("A"));
        assert_eq!(cart.lines()[0].quantity, 1);
        assert_eq!(cart.total_price(), price("10"));

        cart.decrease_quantity(&ItemId::new("A"));
        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), Price::ZERO);
    }

    #[test]
    fn test_presentation_payload_passes_through_untouched() {
        let mut cart = CartStore::new();
        let p = product("A", "10");
        let payload = p.presentation.clone();
        cart.add_item(p);
        assert_eq!(cart.lines()[0].presentation, payload);
    }
}
