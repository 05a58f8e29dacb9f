//! Local-first ticket wallet.
//!
//! Events are registered with a validation endpoint, tickets are attached to
//! them by validating a scanned payload against that endpoint, and a stored
//! ticket's state decides whether its redeemable code may be shown.

pub mod cascade;
pub mod config;
pub mod error;
pub mod handlers;
pub mod ingest;
pub mod models;
pub mod registry;
pub mod routes;
pub mod state;
pub mod status;
pub mod storage;
pub mod utils;
pub mod view;

pub use error::WalletError;
pub use state::AppState;
pub use storage::Store;
