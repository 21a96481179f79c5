use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use mkt_common::Money;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ConversionError(pub String);

//--------------------------------------        Role        ----------------------------------------------------------
/// The three actor types the authorization policy distinguishes. An actor carries exactly one
/// role; the policy module decides what each role may see or change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Buyer,
    Seller,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "Admin"),
            Role::Buyer => write!(f, "Buyer"),
            Role::Seller => write!(f, "Seller"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    /// Case-insensitive, and tolerant of the `ROLE_` prefix the identity service puts on the
    /// wire.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_uppercase();
        let name = name.strip_prefix("ROLE_").unwrap_or(&name);
        match name {
            "ADMIN" => Ok(Self::Admin),
            "BUYER" => Ok(Self::Buyer),
            "SELLER" => Ok(Self::Seller),
            _ => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

//--------------------------------------      OrderId       ----------------------------------------------------------
/// Store-assigned order identifier. Opaque to callers; immutable once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderId(pub i64);

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<i64> for OrderId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl FromStr for OrderId {
    type Err = ConversionError;

    /// Accepts the bare id as well as the `#`-prefixed display form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);
        digits.parse::<i64>().map(Self).map_err(|_| ConversionError(format!("Invalid order id: {s}")))
    }
}

impl OrderId {
    pub fn value(&self) -> i64 {
        self.0
    }
}

//--------------------------------------    OrderStatus     ----------------------------------------------------------
/// Fulfilment-side state of an order. Moves only through the transition table enforced by the
/// order flow API; `Delivered` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Placed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Placed => write!(f, "Placed"),
            OrderStatus::Shipped => write!(f, "Shipped"),
            OrderStatus::Delivered => write!(f, "Delivered"),
            OrderStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = ConversionError;

    /// Status names are matched case-insensitively: admins send "SHIPPED", the store holds
    /// "Shipped".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PLACED" => Ok(Self::Placed),
            "SHIPPED" => Ok(Self::Shipped),
            "DELIVERED" => Ok(Self::Delivered),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------   PaymentStatus    ----------------------------------------------------------
/// Money-side state of an order, independent of [`OrderStatus`]. `Paid` and `Failed` are
/// terminal; `Paid` wins over a late failure event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "Pending"),
            PaymentStatus::Paid => write!(f, "Paid"),
            PaymentStatus::Failed => write!(f, "Failed"),
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "PAID" => Ok(Self::Paid),
            "FAILED" => Ok(Self::Failed),
            _ => Err(ConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

//--------------------------------------       Order        ----------------------------------------------------------
/// The central record. Everything except the two status columns and `updated_at` is a snapshot
/// taken at placement time and never changes, even if the catalog later reprices the product.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub buyer_id: i64,
    pub seller_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub total_amount: Money,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      NewOrder      ----------------------------------------------------------
/// An order about to be persisted. `created_at` is stamped here, at the construction site; the
/// store has no timestamp hooks of its own.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub buyer_id: i64,
    pub seller_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub total_amount: Money,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    pub fn new(
        buyer_id: i64,
        seller_id: i64,
        product_id: i64,
        product_name: String,
        quantity: i64,
        total_amount: Money,
    ) -> Self {
        Self { buyer_id, seller_id, product_id, product_name, quantity, total_amount, created_at: Utc::now() }
    }
}
