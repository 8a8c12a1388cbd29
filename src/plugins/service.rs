//! Ordering service collaborator.
//!
//! Commands only depend on [`OrderingService`] and [`StoreHandle`]. The
//! shipped implementation is [`LocalCatalog`], a menu and store list that is
//! either built in or read from a TOML catalog file.

use crate::core::error::{ApizzaError, Result};
use crate::core::model::{Address, Order, Product, ServiceMethod};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

pub trait OrderingService {
    /// Find the store closest to `address` that offers `method`.
    fn nearest_store(
        &self,
        address: &Address,
        method: ServiceMethod,
    ) -> Result<Box<dyn StoreHandle + '_>>;

    /// The store with `id`, if it still exists and offers `method`.
    fn store(
        &self,
        id: &str,
        address: &Address,
        method: ServiceMethod,
    ) -> Result<Option<Box<dyn StoreHandle + '_>>>;
}

/// A vendor location returned by the ordering service. Not to be confused
/// with the cache handle.
pub trait StoreHandle {
    fn id(&self) -> &str;
    fn get_product(&self, code: &str) -> Result<Product>;
    fn new_order(&self) -> Order;
    fn price(&self, order: &Order) -> Result<f64>;
    fn menu(&self) -> Vec<Product>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreInfo {
    pub id: String,
    pub zipcode: String,
    pub services: Vec<ServiceMethod>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalCatalog {
    pub stores: Vec<StoreInfo>,
    pub products: Vec<Product>,
}

const BUILTIN_CATALOG: &str = r#"
[[stores]]
id = "4336"
zipcode = "20500"
services = ["Delivery", "Carryout"]

[[stores]]
id = "3674"
zipcode = "10001"
services = ["Delivery", "Carryout"]

[[stores]]
id = "8117"
zipcode = "94103"
services = ["Carryout"]

[[products]]
code = "12SCMEATZA"
name = "Medium (12\") Hand Tossed MeatZZa"
category = "Pizza"
price = 14.09
default_options = { X = { "1/1" = "1" }, C = { "1/1" = "1" } }

[[products]]
code = "14SCREEN"
name = "Large (14\") Hand Tossed Pizza"
category = "Pizza"
price = 13.99
default_options = { X = { "1/1" = "1" }, C = { "1/1" = "1" } }

[[products]]
code = "P12IPAZA"
name = "Medium (12\") Pan Pacific Veggie"
category = "Pizza"
price = 15.49

[[products]]
code = "W08PBNLW"
name = "Boneless Chicken (8 Piece)"
category = "Wings"
price = 9.99

[[products]]
code = "W08PPLNW"
name = "Plain Chicken Wings (8 Piece)"
category = "Wings"
price = 9.99

[[products]]
code = "B8PCGT"
name = "Parmesan Bread Twists"
category = "Bread"
price = 5.99

[[products]]
code = "MARBRWNE"
name = "Marbled Cookie Brownie"
category = "Dessert"
price = 6.99

[[products]]
code = "20BCOKE"
name = "Coke (20oz Bottle)"
category = "Drinks"
price = 2.29
"#;

impl LocalCatalog {
    pub fn builtin() -> Result<Self> {
        Self::parse(BUILTIN_CATALOG)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let catalog: LocalCatalog = toml::from_str(text)
            .map_err(|e| ApizzaError::Service(format!("invalid catalog: {}", e)))?;
        if catalog.stores.is_empty() {
            return Err(ApizzaError::Service(
                "invalid catalog: no stores defined".to_string(),
            ));
        }
        Ok(catalog)
    }

    /// Load the catalog at `path`, or the built-in one when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(p) = path else {
            return Self::builtin();
        };
        debug!(path = %p.display(), "loading catalog file");
        let text = fs::read_to_string(p).map_err(|e| {
            ApizzaError::Service(format!("cannot read catalog {}: {}", p.display(), e))
        })?;
        Self::parse(&text).map_err(|e| match e {
            ApizzaError::Service(msg) => ApizzaError::Service(format!("{}: {}", p.display(), msg)),
            other => other,
        })
    }

    fn handle<'a>(
        &'a self,
        info: &'a StoreInfo,
        address: &Address,
        method: ServiceMethod,
    ) -> Box<dyn StoreHandle + 'a> {
        Box::new(LocalStore {
            info,
            catalog: self,
            address: address.clone(),
            method,
        })
    }
}

fn zip_distance(a: &str, b: &str) -> u64 {
    let prefix = |z: &str| -> Option<u64> {
        let digits: String = z.chars().take_while(|c| c.is_ascii_digit()).collect();
        digits.parse().ok()
    };
    match (prefix(a), prefix(b)) {
        (Some(x), Some(y)) => x.abs_diff(y),
        _ => u64::MAX,
    }
}

impl OrderingService for LocalCatalog {
    fn nearest_store(
        &self,
        address: &Address,
        method: ServiceMethod,
    ) -> Result<Box<dyn StoreHandle + '_>> {
        if method == ServiceMethod::Delivery && address.street.trim().is_empty() {
            return Err(ApizzaError::Service(
                "delivery needs a street address; set one with 'apizza config set address.street=...'"
                    .to_string(),
            ));
        }
        let info = self
            .stores
            .iter()
            .filter(|s| s.services.contains(&method))
            .min_by_key(|s| zip_distance(&s.zipcode, &address.zipcode))
            .ok_or_else(|| {
                ApizzaError::Service(format!("no store offers {} service", method))
            })?;
        debug!(store = %info.id, %method, "selected nearest store");
        Ok(self.handle(info, address, method))
    }

    fn store(
        &self,
        id: &str,
        address: &Address,
        method: ServiceMethod,
    ) -> Result<Option<Box<dyn StoreHandle + '_>>> {
        Ok(self
            .stores
            .iter()
            .find(|s| s.id == id && s.services.contains(&method))
            .map(|info| self.handle(info, address, method)))
    }
}

struct LocalStore<'a> {
    info: &'a StoreInfo,
    catalog: &'a LocalCatalog,
    address: Address,
    method: ServiceMethod,
}

impl StoreHandle for LocalStore<'_> {
    fn id(&self) -> &str {
        &self.info.id
    }

    fn get_product(&self, code: &str) -> Result<Product> {
        self.catalog
            .products
            .iter()
            .find(|p| p.code.eq_ignore_ascii_case(code.trim()))
            .cloned()
            .ok_or_else(|| {
                ApizzaError::Service(format!(
                    "store {} has no product with code '{}'",
                    self.info.id, code
                ))
            })
    }

    fn new_order(&self) -> Order {
        Order {
            store_id: self.info.id.clone(),
            service_method: self.method,
            address: self.address.clone(),
            products: Vec::new(),
            price: None,
        }
    }

    fn price(&self, order: &Order) -> Result<f64> {
        let mut cents: i64 = 0;
        for line in &order.products {
            let product = self.get_product(&line.code)?;
            cents += (product.price * 100.0).round() as i64 * i64::from(line.qty);
        }
        Ok(cents as f64 / 100.0)
    }

    fn menu(&self) -> Vec<Product> {
        self.catalog.products.clone()
    }
}
