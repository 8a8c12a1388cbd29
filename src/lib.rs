//! apizza: pizza orders from the terminal.
//!
//! **apizza keeps your profile and your saved orders in a local cache.**
//!
//! # Architecture
//!
//! ## The Cache
//!
//! One SQLite file holds a flat bucket of `key -> bytes` records
//! ([`core::db::Database`]). Orders are stored under the `user_order_`
//! namespace, the configuration under a single `config` key, both as JSON.
//!
//! ## The Session
//!
//! Every invocation runs inside a [`core::session::Session`] that opens the
//! cache, loads the configuration, hands repositories to the command, then
//! writes the configuration back and closes the cache, on success and on
//! error alike. `--clear-cache` deletes the file instead.
//!
//! ## Commands (Plugins)
//!
//! - `new`: build an order from product codes and save it
//! - `cart`: list, show, price, extend or delete saved orders
//! - `config`: get and set profile fields
//! - `menu`: browse the nearest store's products
//!
//! # Examples
//!
//! ```bash
//! apizza config set name=joe address.zipcode=20500
//! apizza new --name dinner --products 12SCMEATZA
//! apizza cart dinner --add W08PBNLW,W08PPLNW
//! apizza cart dinner --price
//! apizza --clear-cache
//! ```

pub mod cli;
pub mod core;
pub mod plugins;

use crate::cli::{Cli, Command};
use crate::core::{error, logging, session, settings::Settings};
use crate::plugins::{cart, config, menu, service::LocalCatalog};

use clap::Parser;
use std::io::{self, Write};

pub fn run() -> Result<(), error::ApizzaError> {
    let cli = Cli::parse();
    let settings = Settings::resolve(cli.db.clone(), cli.catalog.clone(), cli.verbose, |key| {
        std::env::var(key).ok()
    });
    logging::init(&settings.log_filter);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(cli, settings, &mut out)
}

/// Run one parsed command line against the cache described by `settings`.
pub fn execute(cli: Cli, settings: Settings, out: &mut dyn Write) -> Result<(), error::ApizzaError> {
    if cli.clear_cache {
        session::clear_cache(settings, out)?;
        return Ok(());
    }

    let menu_path = settings.menu_path.clone();
    let catalog = || LocalCatalog::load(menu_path.as_deref());

    session::with_session(settings, |session| match cli.command {
        None => {
            writeln!(out, "No command given. Run 'apizza --help' for usage.")?;
            Ok(())
        }
        Some(Command::New(c)) => cart::run_new_order(session, &catalog()?, c, out),
        Some(Command::Cart(c)) => cart::run_cart(session, &catalog()?, c, out),
        Some(Command::Config(c)) => config::run_config_cli(session, c, out),
        Some(Command::Menu(c)) => menu::run_menu(session, &catalog()?, c, out),
    })
}
