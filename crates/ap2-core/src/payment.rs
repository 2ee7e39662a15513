//! Payment payload types carried by Cart and Payment mandates.
//!
//! These mirror the W3C Payment Request shapes the protocol borrows.
//! Payload validation is a merchant/processor concern; the mandate layer
//! only carries these values.

use serde::{Deserialize, Serialize};

/// An amount of money in a specific currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentCurrencyAmount {
    /// ISO 4217 currency code (e.g. "USD").
    pub currency: String,

    /// The amount value.
    pub value: f64,
}

impl PaymentCurrencyAmount {
    /// Create a new amount.
    pub fn new(currency: impl Into<String>, value: f64) -> Self {
        Self {
            currency: currency.into(),
            value,
        }
    }

    /// Create a USD amount.
    pub fn usd(value: f64) -> Self {
        Self::new("USD", value)
    }
}

/// A single line item in a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentItem {
    /// Human-readable label (e.g. "Nike Air Zoom, size 10").
    pub label: String,

    /// Cost of this item.
    pub amount: PaymentCurrencyAmount,
}

impl PaymentItem {
    /// Create a new line item.
    pub fn new(label: impl Into<String>, amount: PaymentCurrencyAmount) -> Self {
        Self {
            label: label.into(),
            amount,
        }
    }
}

/// The contents of a cart: line items plus the displayed total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartContents {
    /// The line items.
    pub items: Vec<PaymentItem>,

    /// The total the user authorized.
    pub total: PaymentCurrencyAmount,
}

impl CartContents {
    /// Create cart contents with an explicit total.
    pub fn new(items: Vec<PaymentItem>, total: PaymentCurrencyAmount) -> Self {
        Self { items, total }
    }

    /// Create cart contents summing the item amounts into the total.
    ///
    /// All items are assumed to share `currency`; mixed-currency carts are
    /// a payment-request validation concern, not a mandate one.
    pub fn total_from_items(currency: impl Into<String>, items: Vec<PaymentItem>) -> Self {
        let value = items.iter().map(|item| item.amount.value).sum();
        Self {
            items,
            total: PaymentCurrencyAmount::new(currency, value),
        }
    }
}

/// A payment instrument selected for a Payment mandate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// Method identifier (e.g. "basic-card", "https://pay.example").
    pub method_name: String,

    /// Method-specific data, opaque to the mandate layer.
    #[serde(default)]
    pub details: serde_json::Value,
}

impl PaymentMethod {
    /// Create a payment method without method-specific details.
    pub fn named(method_name: impl Into<String>) -> Self {
        Self {
            method_name: method_name.into(),
            details: serde_json::Value::Null,
        }
    }
}
