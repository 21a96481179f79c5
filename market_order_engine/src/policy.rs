//! Authorization policy for order operations.
//!
//! A set of pure predicates over explicit `(actor id, role, order)` parameters. There is no
//! ambient security context: every orchestrator operation receives the actor's identity as an
//! argument and consults these functions before touching the store. A `false` answer surfaces as
//! `AccessDenied`, which callers keep distinct from `NotFound`.

use crate::db_types::{Order, Role};

/// Admins see everything; buyers and sellers only the orders carrying their own id.
pub fn can_view(actor_id: i64, role: Role, order: &Order) -> bool {
    match role {
        Role::Admin => true,
        Role::Buyer => order.buyer_id == actor_id,
        Role::Seller => order.seller_id == actor_id,
    }
}

/// Only buyers place orders.
pub fn can_place_order(role: Role) -> bool {
    role == Role::Buyer
}

/// Administrative status changes are admin-only, whatever the target status.
pub fn can_mutate_status(role: Role) -> bool {
    role == Role::Admin
}

/// Exactly the order's buyer may start a checkout. Admins are denied like everyone else.
pub fn can_pay(actor_id: i64, order: &Order) -> bool {
    order.buyer_id == actor_id
}

#[cfg(test)]
mod test {
    use chrono::Utc;
    use mkt_common::Money;

    use super::*;
    use crate::db_types::{OrderId, OrderStatus, PaymentStatus};

    fn order(buyer_id: i64, seller_id: i64) -> Order {
        Order {
            id: OrderId(1),
            buyer_id,
            seller_id,
            product_id: 10,
            product_name: "Widget".to_string(),
            quantity: 1,
            total_amount: Money::from_minor(1999),
            order_status: OrderStatus::Placed,
            payment_status: PaymentStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn admin_views_any_order() {
        assert!(can_view(999, Role::Admin, &order(1, 2)));
    }

    #[test]
    fn buyer_views_only_own_orders() {
        let o = order(5, 7);
        assert!(can_view(5, Role::Buyer, &o));
        assert!(!can_view(6, Role::Buyer, &o));
        // A buyer id matching the seller column grants nothing
        assert!(!can_view(7, Role::Buyer, &o));
    }

    #[test]
    fn seller_views_only_own_orders() {
        let o = order(5, 7);
        assert!(can_view(7, Role::Seller, &o));
        assert!(!can_view(5, Role::Seller, &o));
    }

    #[test]
    fn only_admin_mutates_status() {
        assert!(can_mutate_status(Role::Admin));
        assert!(!can_mutate_status(Role::Buyer));
        assert!(!can_mutate_status(Role::Seller));
    }

    #[test]
    fn only_the_buyer_pays_even_over_admin() {
        let o = order(5, 7);
        assert!(can_pay(5, &o));
        assert!(!can_pay(7, &o));
        assert!(!can_pay(999, &o));
    }

    #[test]
    fn only_buyers_place_orders() {
        assert!(can_place_order(Role::Buyer));
        assert!(!can_place_order(Role::Admin));
        assert!(!can_place_order(Role::Seller));
    }
}
