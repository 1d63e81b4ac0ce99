use anyhow::anyhow;
use plasma_primitives::{
    buf::{Address, Buf32},
    position::{Position, POSITION_ENCODED_LEN},
};
use plasma_state::utxo::UtxoKey;

/// Trait for types that can be encoded and decoded lexicographically.
///
/// Encodings are fixed-width and big-endian so that byte order matches the
/// natural order of the key, which range scans and `last()` rely on.
pub trait LexicographicKey: Sized {
    fn encode_lexicographic(&self, out: &mut Vec<u8>);
    fn decode_lexicographic(data: &mut &[u8]) -> anyhow::Result<Self>;
}

/// Encode a lexicographic key into bytes.
pub(crate) fn encode_key<T: LexicographicKey>(value: &T) -> Vec<u8> {
    let mut out = Vec::new();
    value.encode_lexicographic(&mut out);
    out
}

/// Decode a lexicographic key from bytes.
pub(crate) fn decode_key<T: LexicographicKey>(data: &[u8]) -> anyhow::Result<T> {
    let mut remaining = data;
    let value = T::decode_lexicographic(&mut remaining)?;
    if !remaining.is_empty() {
        return Err(anyhow!("lexicographic key has trailing bytes"));
    }
    Ok(value)
}

/// Read exactly `N` bytes from the data.
fn read_exact<const N: usize>(data: &mut &[u8]) -> anyhow::Result<[u8; N]> {
    if data.len() < N {
        return Err(anyhow!(
            "lexicographic key underflow: need {N} bytes, got {}",
            data.len()
        ));
    }
    let (prefix, rest) = data.split_at(N);
    *data = rest;
    let mut out = [0u8; N];
    out.copy_from_slice(prefix);
    Ok(out)
}

impl LexicographicKey for u64 {
    fn encode_lexicographic(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_be_bytes());
    }

    fn decode_lexicographic(data: &mut &[u8]) -> anyhow::Result<Self> {
        Ok(u64::from_be_bytes(read_exact::<8>(data)?))
    }
}

impl LexicographicKey for Address {
    fn encode_lexicographic(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.as_slice());
    }

    fn decode_lexicographic(data: &mut &[u8]) -> anyhow::Result<Self> {
        Ok(Address(read_exact::<20>(data)?))
    }
}

impl LexicographicKey for Buf32 {
    fn encode_lexicographic(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.as_slice());
    }

    fn decode_lexicographic(data: &mut &[u8]) -> anyhow::Result<Self> {
        Ok(Buf32(read_exact::<32>(data)?))
    }
}

impl LexicographicKey for Position {
    fn encode_lexicographic(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.encode());
    }

    fn decode_lexicographic(data: &mut &[u8]) -> anyhow::Result<Self> {
        let bytes = read_exact::<POSITION_ENCODED_LEN>(data)?;
        Ok(Position::decode(&bytes)?)
    }
}

impl LexicographicKey for UtxoKey {
    fn encode_lexicographic(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.as_slice());
    }

    fn decode_lexicographic(data: &mut &[u8]) -> anyhow::Result<Self> {
        let owner = Address::decode_lexicographic(data)?;
        let position = Position::decode_lexicographic(data)?;
        Ok(UtxoKey::new(&owner, &position))
    }
}
