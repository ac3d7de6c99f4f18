//! Command dispatch: bridges CLI args -> backoffice calls -> output formatting.

pub mod config_cmd;
pub mod customers;
pub mod inventory;
pub mod orders;
pub mod products;
mod util;

use petal_core::Backoffice;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Commands that talk to the backend.
#[derive(Debug)]
pub enum DataCommand {
    Customers(crate::cli::CustomersArgs),
    Products(crate::cli::ProductsArgs),
    Orders(crate::cli::OrdersArgs),
    Inventory(crate::cli::InventoryArgs),
}

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: DataCommand,
    backoffice: &Backoffice,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        DataCommand::Customers(args) => customers::handle(backoffice, args, global).await,
        DataCommand::Products(args) => products::handle(backoffice, args, global).await,
        DataCommand::Orders(args) => orders::handle(backoffice, args, global).await,
        DataCommand::Inventory(args) => inventory::handle(backoffice, args, global).await,
    }
}
