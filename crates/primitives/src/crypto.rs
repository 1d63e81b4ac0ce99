//! Hashing and secp256k1 signature helpers.
//!
//! Signatures are produced over the Ethereum signed-message digest so that
//! the root contract can verify them with `ecrecover`.

use alloy_primitives::eip191_hash_message;
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, SigningKey, VerifyingKey};
use sha2::{Digest, Sha256};

use crate::{
    buf::{Address, Buf32, Signature},
    errors::CryptoError,
};

pub fn keccak256(data: &[u8]) -> Buf32 {
    Buf32(alloy_primitives::keccak256(data).0)
}

pub fn sha256(data: &[u8]) -> Buf32 {
    Buf32(Sha256::digest(data).into())
}

/// Digest of `"\x19Ethereum Signed Message:\n32" ‖ hash`.
pub fn eth_signed_message_hash(hash: &Buf32) -> Buf32 {
    Buf32(eip191_hash_message(hash.as_slice()).0)
}

/// Derives the Ethereum address of a public key.
pub fn address_from_verifying_key(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash.0[12..]);
    Address(addr)
}

/// Recovers the address that produced `sig` over the prehashed `digest`.
///
/// Accepts both `v ∈ {0, 1}` and the Ethereum `v ∈ {27, 28}` convention.
pub fn recover_signer(digest: &Buf32, sig: &Signature) -> Result<Address, CryptoError> {
    let raw_v = sig.0[64];
    let v = match raw_v {
        27 | 28 => raw_v - 27,
        0 | 1 => raw_v,
        _ => return Err(CryptoError::InvalidRecoveryId(raw_v)),
    };
    let rid = RecoveryId::from_byte(v).ok_or(CryptoError::InvalidRecoveryId(raw_v))?;
    let ecsig =
        EcdsaSignature::from_slice(&sig.0[..64]).map_err(|_| CryptoError::MalformedSignature)?;
    let key = VerifyingKey::recover_from_prehash(digest.as_slice(), &ecsig, rid)
        .map_err(|_| CryptoError::RecoveryFailed)?;
    Ok(address_from_verifying_key(&key))
}

/// Recovers the signer of an Ethereum signed message over `hash`.
pub fn recover_eth_signer(hash: &Buf32, sig: &Signature) -> Result<Address, CryptoError> {
    recover_signer(&eth_signed_message_hash(hash), sig)
}

/// Signs a prehashed digest, producing `r ‖ s ‖ v` with `v ∈ {27, 28}`.
pub fn sign_digest(key: &SigningKey, digest: &Buf32) -> Result<Signature, CryptoError> {
    let (sig, rid) = key
        .sign_prehash_recoverable(digest.as_slice())
        .map_err(|e| CryptoError::Signing(e.to_string()))?;
    let mut out = [0u8; 65];
    out[..64].copy_from_slice(&sig.to_bytes());
    out[64] = rid.to_byte() + 27;
    Ok(Signature(out))
}

/// Signs `hash` as an Ethereum signed message.
pub fn sign_eth_message(key: &SigningKey, hash: &Buf32) -> Result<Signature, CryptoError> {
    sign_digest(key, &eth_signed_message_hash(hash))
}
