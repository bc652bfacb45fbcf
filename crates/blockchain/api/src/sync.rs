//! Synchronous blockchain traits and implementations.

use core::fmt::Debug;

use parking_lot::{Mutex, MutexGuard};

use crate::Blockchain;

/// Trait that meets all requirements for a blockchain that can be shared
/// between threads.
pub trait SyncBlockchain<BlockchainErrorT: Debug + Send>:
    Blockchain<BlockchainErrorT> + Send + Debug
{
}

impl<BlockchainErrorT, BlockchainT> SyncBlockchain<BlockchainErrorT> for BlockchainT
where
    BlockchainErrorT: Debug + Send,
    BlockchainT: Blockchain<BlockchainErrorT> + Send + Debug,
{
}

/// A blockchain behind a single exclusive lock.
///
/// Multi-step operations such as fulfilling a reservation or deleting blocks
/// are not atomic, so every operation, including lookups, must hold the lock
/// for its full duration.
#[derive(Debug, Default)]
pub struct Synchronized<BlockchainT> {
    inner: Mutex<BlockchainT>,
}

impl<BlockchainT> Synchronized<BlockchainT> {
    /// Wraps the provided blockchain.
    pub fn new(blockchain: BlockchainT) -> Self {
        Self {
            inner: Mutex::new(blockchain),
        }
    }

    /// Acquires exclusive access to the blockchain, blocking the current
    /// thread until it is available.
    pub fn lock(&self) -> MutexGuard<'_, BlockchainT> {
        self.inner.lock()
    }

    /// Runs the provided operation with exclusive access to the blockchain.
    pub fn with<ReturnT>(&self, operation: impl FnOnce(&mut BlockchainT) -> ReturnT) -> ReturnT {
        operation(&mut self.inner.lock())
    }

    /// Consumes the wrapper, returning the blockchain.
    pub fn into_inner(self) -> BlockchainT {
        self.inner.into_inner()
    }
}
