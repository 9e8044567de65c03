use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One distinct product + variant entry in the cart.
///
/// The identity key of a line is `(product_id, variant_id | size_label |
/// none)`. Two lines with the same identity key always merge, never
/// duplicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_label: Option<String>,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl CartLine {
    /// The variant component of the identity key. A variant id wins over a
    /// bare size label.
    pub fn variant_key(&self) -> Option<&str> {
        self.variant_id.as_deref().or(self.size_label.as_deref())
    }

    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Selects lines within a product by their variant component. An empty
/// selector matches lines that carry neither a variant id nor a size label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantSelector {
    pub variant_id: Option<String>,
    pub size_label: Option<String>,
}

impl VariantSelector {
    pub fn variant_key(&self) -> Option<&str> {
        self.variant_id.as_deref().or(self.size_label.as_deref())
    }

    pub fn matches(&self, line: &CartLine) -> bool {
        self.variant_key() == line.variant_key()
    }
}

/// The cart aggregate: an ordered collection of lines, insertion order is
/// display order. Serializes as a plain array of lines, which is also the
/// persisted snapshot schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let mut cart = Self::default();
        for line in lines {
            cart.add(line);
        }
        cart
    }

    /// Adds a line, merging with an existing line of the same identity key.
    /// Quantity is coerced to at least 1.
    pub fn add(&mut self, mut line: CartLine) {
        line.quantity = line.quantity.max(1);
        let existing = self.lines.iter_mut().find(|l| {
            l.product_id == line.product_id && l.variant_key() == line.variant_key()
        });
        match existing {
            Some(l) => l.quantity += line.quantity,
            None => self.lines.push(line),
        }
    }

    /// Removes every line matching the identity key. Returns the number of
    /// removed lines; removing an absent line is a no-op.
    pub fn remove(&mut self, product_id: &str, selector: &VariantSelector) -> usize {
        let before = self.lines.len();
        self.lines
            .retain(|l| l.product_id != product_id || !selector.matches(l));
        before - self.lines.len()
    }

    /// Sets the quantity of the matching line. Quantities below 1 are
    /// ignored so that a decrement can never silently delete a line.
    /// Returns whether a line was updated.
    pub fn set_quantity(
        &mut self,
        product_id: &str,
        quantity: u32,
        selector: &VariantSelector,
    ) -> bool {
        if quantity < 1 {
            return false;
        }
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id && selector.matches(l));
        match line {
            Some(l) => {
                l.quantity = quantity;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }
}
