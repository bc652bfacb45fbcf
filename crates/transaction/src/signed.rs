mod eip1559;
mod eip2930;
mod legacy;

pub use self::{eip1559::Eip1559, eip2930::Eip2930, legacy::Legacy};

/// Implements hashing and mutation for a locally signed transaction type.
///
/// Local transactions are "fake signed": the sender address takes the place
/// of the signature and is therefore part of the transaction hash.
macro_rules! impl_fake_signed {
    ($ty:ty) => {
        impl $ty {
            fn rlp_encoding(&self) -> Vec<u8> {
                let mut encoded = Vec::with_capacity(1 + alloy_rlp::Encodable::length(self));
                if Self::TYPE == 0 {
                    alloy_rlp::Encodable::encode(self, &mut encoded);
                } else {
                    $crate::utils::enveloped(Self::TYPE, self, &mut encoded);
                }
                encoded
            }

            /// Returns the transaction's hash.
            pub fn transaction_hash(&self) -> &devchain_primitives::B256 {
                self.hash
                    .get_or_init(|| devchain_primitives::keccak256(self.rlp_encoding()))
            }

            /// Sets the nonce, invalidating the cached hash.
            pub fn set_nonce(&mut self, nonce: u64) {
                self.nonce = nonce;
                self.hash = std::sync::OnceLock::new();
            }

            /// Sets the gas limit, invalidating the cached hash.
            pub fn set_gas_limit(&mut self, gas_limit: u64) {
                self.gas_limit = gas_limit;
                self.hash = std::sync::OnceLock::new();
            }

            /// Re-signs the transaction for the provided sender, invalidating
            /// the cached hash.
            pub fn sign_as(&mut self, caller: devchain_primitives::Address) {
                self.caller = caller;
                self.hash = std::sync::OnceLock::new();
            }
        }
    };
}

pub(crate) use impl_fake_signed;
