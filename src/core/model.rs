//! Order domain types shared by the cache, the ordering service and the CLI.
//!
//! Field names on the wire are stable identifiers (`StoreID`, `ServiceMethod`,
//! `Products[{Code, Qty, Options}]`, ...) because saved orders and the saved
//! configuration are read back across releases.

use crate::core::error::{ApizzaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// How an order reaches the customer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceMethod {
    Delivery,
    #[default]
    Carryout,
}

impl ServiceMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceMethod::Delivery => "Delivery",
            ServiceMethod::Carryout => "Carryout",
        }
    }
}

impl fmt::Display for ServiceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceMethod {
    type Err = ApizzaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "delivery" => Ok(ServiceMethod::Delivery),
            "carryout" | "carry-out" | "pickup" => Ok(ServiceMethod::Carryout),
            other => Err(ApizzaError::ValidationError(format!(
                "'{}' is not a service method (expected Delivery or Carryout)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Address {
    pub street: String,
    pub city_name: String,
    pub state: String,
    pub zipcode: String,
}

impl Address {
    pub fn is_empty(&self) -> bool {
        self.street.is_empty()
            && self.city_name.is_empty()
            && self.state.is_empty()
            && self.zipcode.is_empty()
    }
}

/// An item that a store sells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub code: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    #[serde(default)]
    pub default_options: BTreeMap<String, serde_json::Value>,
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderProduct {
    pub code: String,
    pub qty: u32,
    #[serde(default)]
    pub options: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Order {
    #[serde(rename = "StoreID")]
    pub store_id: String,
    pub service_method: ServiceMethod,
    pub address: Address,
    pub products: Vec<OrderProduct>,
    /// Last computed price; refreshed every time the order is saved by a command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl Order {
    /// Add one unit of `product`. Adding a code that is already on the order
    /// bumps its quantity.
    pub fn add_product(&mut self, product: &Product) {
        if let Some(line) = self.products.iter_mut().find(|p| p.code == product.code) {
            line.qty += 1;
            return;
        }
        self.products.push(OrderProduct {
            code: product.code.clone(),
            qty: 1,
            options: product.default_options.clone(),
        });
    }

    /// Remove every unit of `code` from the order.
    pub fn remove_product(&mut self, code: &str) -> Result<()> {
        let before = self.products.len();
        self.products.retain(|p| !p.code.eq_ignore_ascii_case(code));
        if self.products.len() == before {
            return Err(ApizzaError::UsageError(format!(
                "product '{}' is not in this order",
                code
            )));
        }
        Ok(())
    }

    pub fn product_codes(&self) -> Vec<&str> {
        self.products.iter().map(|p| p.code.as_str()).collect()
    }
}
