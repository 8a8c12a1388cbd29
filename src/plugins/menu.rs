use crate::core::error::Result;
use crate::core::output;
use crate::core::session::Session;
use crate::plugins::service::OrderingService;
use std::io::Write;

#[derive(clap::Args, Debug)]
pub struct MenuCli {
    /// Only show one category (e.g. Pizza, Wings)
    #[clap(short, long)]
    pub category: Option<String>,
}

pub fn run_menu(
    session: &Session,
    service: &dyn OrderingService,
    cli: MenuCli,
    out: &mut dyn Write,
) -> Result<()> {
    let config = session.config();
    let store = service.nearest_store(&config.address, config.service)?;
    let mut products = store.menu();
    if let Some(category) = &cli.category {
        products.retain(|p| p.category.eq_ignore_ascii_case(category));
    }
    output::write_menu(out, store.id(), &products)?;
    Ok(())
}
