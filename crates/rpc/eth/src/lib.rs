//! Ethereum JSON-RPC types and a client for fetching remote chain data.
#![warn(missing_docs)]

/// Types for Ethereum JSON-RPC blocks
pub mod block;
/// Types related to the Ethereum JSON-RPC API
pub mod client;
/// Types for `eth_getLogs` filters
pub mod filter;
/// Types related to forking a remote blockchain.
pub mod fork;
mod params;
mod remote;
mod request_methods;
/// Types for Ethereum JSON-RPC transactions
pub mod transaction;

pub use self::{
    remote::RemoteClient, request_methods::RequestMethod, transaction::Transaction,
};
