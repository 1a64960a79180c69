//! Order total calculation.
//!
//! `total = (subtotal - discount_amount) * (1 + tax_rate) + delivery_fee`.
//! Tax is charged on the discounted subtotal and the delivery fee is added
//! after tax. The discount amount is clamped to `[0, subtotal]` so totals
//! never go negative. No rounding happens here; use [`round_currency`] for
//! display only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AdminError, AdminResult, FieldErrors};
use crate::models::{Coupon, DiscountType, Order, OrderItem};

/// A line as far as pricing is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub price: f64,
    pub quantity: u32,
}

impl CartLine {
    pub fn subtotal(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

impl From<&OrderItem> for CartLine {
    fn from(item: &OrderItem) -> Self {
        Self {
            price: item.price,
            quantity: item.quantity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub value: f64,
    #[serde(rename = "type", default)]
    pub discount_type: DiscountType,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub lines: Vec<CartLine>,
    #[serde(default)]
    pub discount: Option<Discount>,
    /// Fraction, e.g. `0.1` for 10%.
    #[serde(default)]
    pub tax_rate: f64,
    #[serde(default)]
    pub delivery_fee: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub subtotal: f64,
    pub discount_amount: f64,
    pub discounted_subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

impl Cart {
    /// Build the pricing view of an existing order.
    pub fn from_order(order: &Order) -> Self {
        Self {
            lines: order.items.iter().map(CartLine::from).collect(),
            discount: order.discount.map(|value| Discount {
                value,
                discount_type: order.discount_type.unwrap_or_default(),
            }),
            tax_rate: order.tax_rate.unwrap_or(0.0),
            delivery_fee: order.delivery_fee,
        }
    }

    /// Reject inputs the arithmetic is not defined for.
    pub fn validate(&self) -> AdminResult<()> {
        let mut errors = FieldErrors::new();
        if self.lines.is_empty() {
            errors.insert("items".into(), "Add at least one item".into());
        }
        for (idx, line) in self.lines.iter().enumerate() {
            if !line.price.is_finite() || line.price < 0.0 {
                errors.insert(
                    format!("items[{idx}].price"),
                    "Price must be zero or more".into(),
                );
            }
            if line.quantity == 0 {
                errors.insert(
                    format!("items[{idx}].quantity"),
                    "Quantity must be at least 1".into(),
                );
            }
        }
        if let Some(discount) = self.discount {
            if !discount.value.is_finite() || discount.value < 0.0 {
                errors.insert("discount".into(), "Discount must be zero or more".into());
            } else if discount.discount_type == DiscountType::Percentage && discount.value > 100.0
            {
                errors.insert(
                    "discount".into(),
                    "Percentage discount cannot exceed 100".into(),
                );
            }
        }
        if !self.tax_rate.is_finite() || self.tax_rate < 0.0 {
            errors.insert("taxRate".into(), "Tax rate must be zero or more".into());
        }
        if let Some(fee) = self.delivery_fee {
            if !fee.is_finite() || fee < 0.0 {
                errors.insert(
                    "deliveryFee".into(),
                    "Delivery fee must be zero or more".into(),
                );
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AdminError::Validation(errors))
        }
    }

    pub fn totals(&self) -> OrderTotals {
        compute_totals(
            &self.lines,
            self.discount,
            self.tax_rate,
            self.delivery_fee,
        )
    }
}

/// Compute totals for a list of lines.
pub fn compute_totals(
    lines: &[CartLine],
    discount: Option<Discount>,
    tax_rate: f64,
    delivery_fee: Option<f64>,
) -> OrderTotals {
    let subtotal: f64 = lines.iter().map(CartLine::subtotal).sum();
    let raw_discount = match discount {
        Some(Discount {
            value,
            discount_type: DiscountType::Percentage,
        }) => subtotal * value / 100.0,
        Some(Discount {
            value,
            discount_type: DiscountType::Fixed,
        }) => value,
        None => 0.0,
    };
    let discount_amount = raw_discount.clamp(0.0, subtotal);
    let discounted_subtotal = subtotal - discount_amount;
    let tax = discounted_subtotal * tax_rate;
    let total = discounted_subtotal + tax + delivery_fee.unwrap_or(0.0);

    OrderTotals {
        subtotal,
        discount_amount,
        discounted_subtotal,
        tax,
        total,
    }
}

/// Round half away from zero to two decimals.
pub fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Turn a coupon into a calculator discount for a cart with `subtotal`.
///
/// A coupon's `max_discount` caps the amount, so the result is always
/// expressed as a fixed discount.
pub fn coupon_discount(coupon: &Coupon, subtotal: f64, now: DateTime<Utc>) -> AdminResult<Discount> {
    if !coupon.is_active {
        return Err(AdminError::field("couponCode", "Coupon is not active"));
    }
    if coupon.valid_from.is_some_and(|from| now < from) {
        return Err(AdminError::field("couponCode", "Coupon is not valid yet"));
    }
    if coupon.valid_until.is_some_and(|until| now > until) {
        return Err(AdminError::field("couponCode", "Coupon has expired"));
    }
    if let Some(min) = coupon.min_order_amount {
        if subtotal < min {
            return Err(AdminError::field(
                "couponCode",
                format!("Coupon requires a minimum order of {min:.2}"),
            ));
        }
    }

    let mut amount = match coupon.discount_type {
        DiscountType::Percentage => subtotal * coupon.discount / 100.0,
        DiscountType::Fixed => coupon.discount,
    };
    if let Some(cap) = coupon.max_discount {
        amount = amount.min(cap);
    }
    Ok(Discount {
        value: amount.max(0.0),
        discount_type: DiscountType::Fixed,
    })
}
