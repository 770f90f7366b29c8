use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use uuid::Uuid;

use crate::domains::resource::{ListQuery, OWNER_FIELD, Resource};
use crate::shared::state::Stores;
use crate::shared::store::{Filter, IndexSpec, Record, RecordStore};
use crate::shared::utils::date_util::DateTime;
use crate::shared::validation::{FieldRules, FieldValue, Rule, Validate};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub quantity: u32,
    pub price: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShippingAddress {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default)]
    pub country: String,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    #[serde(default)]
    pub status: OrderStatus,
    pub shipping_address: Option<ShippingAddress>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Order {
    pub fn total(items: &[OrderItem]) -> f64 {
        items
            .iter()
            .map(|item| f64::from(item.quantity) * item.price)
            .sum()
    }
}

impl Record for Order {
    const COLLECTION: &'static str = "orders";
    const INDEXES: &'static [IndexSpec] = &[
        IndexSpec::ascending(OWNER_FIELD),
        IndexSpec::descending("createdAt"),
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime {
        self.created_at
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItem>,
    pub shipping_address: Option<ShippingAddress>,
}

impl Validate for CreateOrderRequest {
    const RULES: &'static [FieldRules] = &[FieldRules {
        field: "items",
        rules: &[Rule::Required],
    }];

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "items" => (&self.items).into(),
            _ => FieldValue::Absent,
        }
    }

    fn check(&self, errors: &mut Vec<String>) {
        for (index, item) in self.items.iter().enumerate() {
            if item.product_id.trim().is_empty() {
                errors.push(format!("items[{}].productId should not be empty", index));
            }
            if item.quantity < 1 {
                errors.push(format!("items[{}].quantity must not be less than 1", index));
            }
            if item.price < 0.0 {
                errors.push(format!("items[{}].price must not be less than 0", index));
            }
        }
    }
}

/// Items are fixed once placed; only fulfilment details change.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub status: Option<OrderStatus>,
    pub shipping_address: Option<ShippingAddress>,
}

impl Validate for UpdateOrderRequest {
    const RULES: &'static [FieldRules] = &[];

    fn field(&self, _name: &str) -> FieldValue<'_> {
        FieldValue::Absent
    }
}

impl Resource for Order {
    const NAME: &'static str = "Order";

    type Create = CreateOrderRequest;
    type Update = UpdateOrderRequest;

    fn store(stores: &Stores) -> Arc<dyn RecordStore<Self>> {
        stores.orders.clone()
    }

    fn create(owner_id: &str, input: CreateOrderRequest, now: DateTime) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: owner_id.to_string(),
            total_amount: Order::total(&input.items),
            items: input.items,
            status: OrderStatus::default(),
            shipping_address: input.shipping_address,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, input: UpdateOrderRequest, now: DateTime) {
        if let Some(status) = input.status {
            self.status = status;
        }
        if let Some(address) = input.shipping_address {
            self.shipping_address = Some(address);
        }
        self.updated_at = now;
    }

    fn filters(query: &ListQuery, filter: Filter) -> Filter {
        match &query.status {
            Some(status) => filter.eq("status", status.as_str()),
            None => filter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::utils::date_util::DateUtil;
    use crate::shared::validation::validate;

    fn item(quantity: u32, price: f64) -> OrderItem {
        OrderItem {
            product_id: "p1".into(),
            quantity,
            price,
        }
    }

    #[test]
    fn test_total_is_computed_from_items() {
        let order = Order::create(
            "u1",
            CreateOrderRequest {
                items: vec![item(2, 9.5), item(1, 1.0)],
                shipping_address: None,
            },
            DateUtil::now(),
        );
        assert_eq!(order.total_amount, 20.0);
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn test_item_rules() {
        let empty = CreateOrderRequest {
            items: vec![],
            shipping_address: None,
        };
        assert_eq!(
            validate(&empty).unwrap_err().to_string(),
            "items should not be empty"
        );

        let bad = CreateOrderRequest {
            items: vec![item(0, -1.0)],
            shipping_address: None,
        };
        assert_eq!(
            validate(&bad).unwrap_err().to_string(),
            "items[0].quantity must not be less than 1, items[0].price must not be less than 0"
        );
    }

    #[test]
    fn test_update_leaves_items_alone() {
        let mut order = Order::create(
            "u1",
            CreateOrderRequest {
                items: vec![item(1, 5.0)],
                shipping_address: None,
            },
            DateUtil::now(),
        );

        let update: UpdateOrderRequest = serde_json::from_value(serde_json::json!({
            "status": "shipped",
            "items": [],
            "shippingAddress": {"city": "Berlin"}
        }))
        .unwrap();
        order.apply(update, DateUtil::now());

        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.total_amount, 5.0);
        assert_eq!(order.shipping_address.unwrap().city, "Berlin");
    }
}
