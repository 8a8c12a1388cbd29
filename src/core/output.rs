//! Text rendering for orders, order lists and the menu.

use crate::core::model::{Address, Order, Product};
use std::io::{self, Write};

/// Collapse newlines/extra whitespace and bound length for terminal display.
pub fn compact_line(input: &str, max_chars: usize) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    let preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}

/// Two address lines: street, then `City, ST 12345` (state omitted when unset).
pub fn address_lines(addr: &Address) -> (String, String) {
    let city = if addr.state.is_empty() {
        format!("{}, {}", addr.city_name, addr.zipcode)
    } else {
        format!("{}, {} {}", addr.city_name, addr.state, addr.zipcode)
    };
    (addr.street.clone(), city)
}

pub fn write_order(
    out: &mut dyn Write,
    name: &str,
    order: &Order,
    price: Option<f64>,
) -> io::Result<()> {
    writeln!(out, "{}", name)?;
    if let Some(p) = price {
        writeln!(out, "  Price: {:.2}", p)?;
    }
    writeln!(out, "  Products:")?;
    for line in &order.products {
        if line.qty > 1 {
            writeln!(out, "    {} (x{})", line.code, line.qty)?;
        } else {
            writeln!(out, "    {}", line.code)?;
        }
    }
    writeln!(out, "  StoreID: {}", order.store_id)?;
    writeln!(out, "  Method:  {}", order.service_method)?;
    if order.address.is_empty() {
        writeln!(out, "  Address: none")?;
    } else {
        let (street, city) = address_lines(&order.address);
        writeln!(out, "  Address: {}", street)?;
        writeln!(out, "           {}", city)?;
    }
    Ok(())
}

pub fn write_order_names(out: &mut dyn Write, names: &[String]) -> io::Result<()> {
    if names.is_empty() {
        return writeln!(out, "No orders saved.");
    }
    writeln!(out, "Your Orders:")?;
    for name in names {
        writeln!(out, "  {}", name)?;
    }
    Ok(())
}

/// Menu grouped by category, in catalog order.
pub fn write_menu(out: &mut dyn Write, store_id: &str, products: &[Product]) -> io::Result<()> {
    writeln!(out, "Menu for store {}", store_id)?;
    let mut categories: Vec<&str> = Vec::new();
    for p in products {
        if !categories.contains(&p.category.as_str()) {
            categories.push(&p.category);
        }
    }
    for category in categories {
        writeln!(out, "{}", category)?;
        for p in products.iter().filter(|p| p.category == category) {
            writeln!(
                out,
                "  {:<12} {:>6.2}  {}",
                p.code,
                p.price,
                compact_line(&p.name, 40)
            )?;
        }
    }
    Ok(())
}
