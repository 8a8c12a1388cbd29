//! CLI struct definitions for the apizza command-line interface.
//!
//! All clap-derived types live here or next to their command handlers.
//! Dispatch lives in `lib.rs`.

use crate::plugins::{cart, config, menu};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "apizza",
    version = env!("CARGO_PKG_VERSION"),
    about = "Configure, price, and save pizza orders from the command line."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Option<Command>,
    /// Path of the cache file (env: APIZZA_DB).
    #[clap(long, global = true)]
    pub db: Option<PathBuf>,
    /// TOML catalog to use instead of the built-in menu (env: APIZZA_MENU).
    #[clap(long = "menu", value_name = "PATH", global = true)]
    pub catalog: Option<PathBuf>,
    /// Delete the cache file, including saved orders and configuration.
    #[clap(long)]
    pub clear_cache: bool,
    /// Log more; repeat for debug output (env: APIZZA_LOG).
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new order that will be stored in the cache
    #[clap(name = "new")]
    New(cart::NewOrderCli),

    /// Show, update or delete saved orders
    #[clap(name = "cart", visible_alias = "order")]
    Cart(cart::CartCli),

    /// Read and change the user configuration
    #[clap(name = "config")]
    Config(config::ConfigCli),

    /// Show the menu of the nearest store
    #[clap(name = "menu")]
    Menu(menu::MenuCli),
}
