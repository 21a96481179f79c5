use mkt_common::Money;
use serde::{Deserialize, Serialize};

/// A point-in-time view of a catalog product. Orders embed a copy of the relevant fields at
/// placement time; the catalog remains free to change price and stock afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub id: i64,
    pub name: String,
    /// Quoted as a decimal string at currency precision, e.g. "19.99".
    pub price: Money,
    pub stock_quantity: i64,
    pub seller_id: i64,
    pub seller_name: Option<String>,
    pub category: Option<String>,
}
