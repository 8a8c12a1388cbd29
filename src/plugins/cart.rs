//! `new` and `cart`: create, inspect, update and delete saved orders.

use crate::core::error::{ApizzaError, Result};
use crate::core::model::Order;
use crate::core::output;
use crate::core::session::Session;
use crate::plugins::service::{OrderingService, StoreHandle};
use std::io::Write;
use tracing::{info, warn};

#[derive(clap::Args, Debug)]
pub struct NewOrderCli {
    /// Name of the new order
    #[clap(short, long)]
    pub name: Option<String>,
    /// Product codes for the new order (comma-separated or repeated)
    #[clap(short, long, value_delimiter = ',')]
    pub products: Vec<String>,
    /// Service method for this order (defaults to the configured one)
    #[clap(short, long)]
    pub service: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct CartCli {
    /// Order to show or change; lists saved orders when omitted
    pub names: Vec<String>,
    /// Add products to the order
    #[clap(short, long, value_delimiter = ',')]
    pub add: Vec<String>,
    /// Remove products from the order
    #[clap(short, long, value_delimiter = ',')]
    pub remove: Vec<String>,
    /// Delete the order from the cache
    #[clap(short, long)]
    pub delete: bool,
    /// Show the current price of the order
    #[clap(short, long)]
    pub price: bool,
}

pub fn run_new_order(
    session: &Session,
    service: &dyn OrderingService,
    cli: NewOrderCli,
    out: &mut dyn Write,
) -> Result<()> {
    let name = cli
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| {
            ApizzaError::UsageError("No order name... use '--name=<order name>'".to_string())
        })?;
    let config = session.config();
    let method = match cli.service {
        Some(s) => s.parse()?,
        None => config.service,
    };

    let store = service.nearest_store(&config.address, method)?;
    let mut order = store.new_order();
    for code in &cli.products {
        order.add_product(&store.get_product(code)?);
    }
    let price = store.price(&order)?;
    order.price = Some(price);

    let orders = session.orders()?;
    if orders.exists(&name)? {
        info!(order = %name, "replacing existing order");
    }
    orders.save(&name, &order)?;
    writeln!(out, "Price: {:.2}", price)?;
    Ok(())
}

pub fn run_cart(
    session: &Session,
    service: &dyn OrderingService,
    cli: CartCli,
    out: &mut dyn Write,
) -> Result<()> {
    if cli.names.len() > 1 {
        return Err(ApizzaError::UsageError(
            "cannot handle multiple orders at once".to_string(),
        ));
    }
    let orders = session.orders()?;
    let Some(name) = cli.names.first() else {
        output::write_order_names(out, &orders.list_names()?)?;
        return Ok(());
    };

    if cli.delete {
        orders.delete(name)?;
        writeln!(out, "{} successfully deleted.", name)?;
        return Ok(());
    }

    let mut order = orders.load(name)?;

    if !cli.add.is_empty() || !cli.remove.is_empty() {
        let store = order_store(service, &mut order)?;
        for code in &cli.add {
            order.add_product(&store.get_product(code)?);
        }
        for code in &cli.remove {
            order.remove_product(code)?;
        }
        order.price = Some(store.price(&order)?);
        orders.save(name, &order)?;
        writeln!(out, "updated order successfully saved.")?;
        return Ok(());
    }

    let price = if cli.price {
        let store = order_store(service, &mut order)?;
        Some(store.price(&order)?)
    } else {
        None
    };
    output::write_order(out, name, &order, price)?;
    Ok(())
}

/// The store an order was placed with. When that store is gone the order
/// moves to the nearest one and its `StoreID` follows.
fn order_store<'s>(
    service: &'s dyn OrderingService,
    order: &mut Order,
) -> Result<Box<dyn StoreHandle + 's>> {
    if let Some(store) = service.store(&order.store_id, &order.address, order.service_method)? {
        return Ok(store);
    }
    let store = service.nearest_store(&order.address, order.service_method)?;
    warn!(from = %order.store_id, to = %store.id(), "saved store unavailable, moving order");
    order.store_id = store.id().to_string();
    Ok(store)
}
