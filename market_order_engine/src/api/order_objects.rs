use chrono::{DateTime, Utc};
use mkt_common::Money;
use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderId, OrderStatus, PaymentStatus};

/// Request body for placing an order. The buyer's identity comes from the access token, never
/// from the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderRequest {
    pub product_id: i64,
    pub quantity: i64,
}

/// Public projection of an order. Every role that passes the visibility check sees the same
/// fields; there is no per-role redaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
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

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            buyer_id: order.buyer_id,
            seller_id: order.seller_id,
            product_id: order.product_id,
            product_name: order.product_name,
            quantity: order.quantity,
            total_amount: order.total_amount,
            order_status: order.order_status,
            payment_status: order.payment_status,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// Result of a payment initiation: where to send the buyer, and the payment status as persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInit {
    pub payment_url: String,
    pub payment_status: PaymentStatus,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn order_view_serializes_with_the_wire_casing() {
        let view = OrderView {
            id: OrderId(42),
            buyer_id: 5,
            seller_id: 7,
            product_id: 1,
            product_name: "Widget".to_string(),
            quantity: 2,
            total_amount: Money::from_minor(3998),
            order_status: OrderStatus::Placed,
            payment_status: PaymentStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["buyerId"], 5);
        assert_eq!(json["totalAmount"], "39.98");
        assert_eq!(json["orderStatus"], "PLACED");
        assert_eq!(json["paymentStatus"], "PENDING");
    }
}
