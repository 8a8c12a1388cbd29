//! Saved orders.
//!
//! Orders live in the shared cache bucket under the `user_order_` namespace and
//! are stored as JSON. Saving under an existing name replaces the old order.

use crate::core::db::Database;
use crate::core::error::{ApizzaError, Result};
use crate::core::model::Order;
use crate::core::schemas;
use tracing::debug;

pub fn order_key(name: &str) -> String {
    format!("{}{}", schemas::ORDER_PREFIX, name)
}

pub struct OrderRepository<'a> {
    db: &'a Database,
}

impl<'a> OrderRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn save(&self, name: &str, order: &Order) -> Result<()> {
        if name.trim().is_empty() {
            return Err(ApizzaError::UsageError(
                "an order needs a name".to_string(),
            ));
        }
        let raw = serde_json::to_vec(order)
            .map_err(|e| ApizzaError::Serialization(format!("order '{}': {}", name, e)))?;
        self.db.put(&order_key(name), &raw)?;
        debug!(order = name, products = order.products.len(), "saved order");
        Ok(())
    }

    pub fn load(&self, name: &str) -> Result<Order> {
        let raw = self.db.get(&order_key(name)).map_err(|e| not_found(name, e))?;
        serde_json::from_slice(&raw)
            .map_err(|e| ApizzaError::Deserialization(format!("order '{}': {}", name, e)))
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        self.db.delete(&order_key(name)).map_err(|e| not_found(name, e))?;
        debug!(order = name, "deleted order");
        Ok(())
    }

    pub fn exists(&self, name: &str) -> Result<bool> {
        match self.db.get(&order_key(name)) {
            Ok(_) => Ok(true),
            Err(ApizzaError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Names of every saved order, sorted.
    pub fn list_names(&self) -> Result<Vec<String>> {
        let all = self.db.get_all()?;
        Ok(all
            .into_keys()
            .filter_map(|k| k.strip_prefix(schemas::ORDER_PREFIX).map(str::to_string))
            .collect())
    }
}

fn not_found(name: &str, err: ApizzaError) -> ApizzaError {
    match err {
        ApizzaError::NotFound(_) => ApizzaError::OrderNotFound(name.to_string()),
        other => other,
    }
}
