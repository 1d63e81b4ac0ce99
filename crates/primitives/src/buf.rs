//! Fixed-size byte buffers used across the chain.

use alloy_rlp::{BufMut, Decodable, Encodable};

define_buf!(
    /// 20-byte Ethereum account address.
    Address,
    20
);

define_buf!(
    /// Generic 32-byte hash.
    Buf32,
    32
);

define_buf!(
    /// Recoverable secp256k1 signature laid out as `r ‖ s ‖ v`.
    Signature,
    65
);

macro_rules! impl_rlp_for_buf {
    ($name:ident, $len:expr) => {
        impl Encodable for $name {
            fn encode(&self, out: &mut dyn BufMut) {
                self.0.encode(out)
            }

            fn length(&self) -> usize {
                self.0.length()
            }
        }

        impl Decodable for $name {
            fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
                <[u8; $len]>::decode(buf).map(Self)
            }
        }
    };
}

impl_rlp_for_buf!(Address, 20);
impl_rlp_for_buf!(Buf32, 32);
impl_rlp_for_buf!(Signature, 65);

impl From<alloy_primitives::Address> for Address {
    fn from(value: alloy_primitives::Address) -> Self {
        Self(value.into())
    }
}

impl From<Address> for alloy_primitives::Address {
    fn from(value: Address) -> Self {
        alloy_primitives::Address::from(value.0)
    }
}

impl From<alloy_primitives::B256> for Buf32 {
    fn from(value: alloy_primitives::B256) -> Self {
        Self(value.0)
    }
}

impl From<Buf32> for alloy_primitives::B256 {
    fn from(value: Buf32) -> Self {
        alloy_primitives::B256::from(value.0)
    }
}

#[cfg(test)]
mod tests {
    use hex::FromHexError;

    use super::*;
    use crate::errors::BufError;

    #[test]
    fn test_address_hex_roundtrip() {
        let addr = Address([0xab; 20]);
        let s = addr.to_string();
        assert_eq!(s, format!("0x{}", "ab".repeat(20)));
        assert_eq!(s.parse::<Address>().unwrap(), addr);

        // prefix is optional
        let unprefixed = "ab".repeat(20);
        assert_eq!(unprefixed.parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn test_wrong_width_rejected() {
        let res = "0xabcd".parse::<Buf32>();
        assert!(matches!(
            res,
            Err(crate::errors::BufError::InvalidLength {
                expected: 32,
                got: 2
            })
        ));
    }

    #[test]
    fn test_bad_hex_rejected() {
        let res = "0xzz".parse::<Address>();
        assert_eq!(
            res,
            Err(BufError::InvalidHex(FromHexError::InvalidHexCharacter {
                c: 'z',
                index: 0
            }))
        );
        assert_eq!(
            "abc".parse::<Buf32>(),
            Err(BufError::InvalidHex(FromHexError::OddLength))
        );
    }

    #[test]
    fn test_signature_serde_json() {
        let sig = Signature([7; 65]);
        let json = serde_json::to_string(&sig).unwrap();
        let back: Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(sig, back);
    }

    #[test]
    fn test_zero() {
        assert!(Address::zero().is_zero());
        assert!(!Buf32([1; 32]).is_zero());
        assert_eq!(Signature::default(), Signature::zero());
    }
}
