//! CLI command implementations.

pub mod session;
pub mod shop;

use thiserror::Error;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The client library reported an error.
    #[error(transparent)]
    Client(#[from] pomelo_client::ClientError),

    /// An item argument was not a `PRODUCT_ID:QUANTITY` pair.
    #[error("Invalid item spec '{0}': expected PRODUCT_ID:QUANTITY, e.g. 3:2")]
    InvalidItemSpec(String),

    /// A requested product is not in the catalog.
    #[error("Unknown product id: {0}")]
    UnknownProduct(String),

    /// A callback URL was given but carried no authorization code.
    #[error("Callback URL has no 'code' parameter: {0}")]
    MissingCode(String),

    /// The command needs a logged-in session.
    #[error("Not logged in. Run `pomelo login` first.")]
    NotLoggedIn,
}
