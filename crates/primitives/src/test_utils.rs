//! Key material helpers for tests.

use k256::ecdsa::SigningKey;
use rand::thread_rng;

use crate::{
    buf::{Address, Buf32, Signature},
    crypto::{address_from_verifying_key, sign_eth_message},
};

/// A random secp256k1 key together with its Ethereum address.
#[derive(Debug, Clone)]
pub struct TestKey {
    pub sk: SigningKey,
    pub address: Address,
}

impl TestKey {
    pub fn random() -> Self {
        let sk = SigningKey::random(&mut thread_rng());
        let address = address_from_verifying_key(sk.verifying_key());
        Self { sk, address }
    }

    /// Signs `hash` as an Ethereum signed message.
    pub fn sign(&self, hash: &Buf32) -> Signature {
        sign_eth_message(&self.sk, hash).expect("test: signing")
    }
}
