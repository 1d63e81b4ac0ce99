//! Two-input/two-output child chain transactions.
//!
//! The RLP layout matches what the root contract parses when a transaction is
//! presented as part of an exit or a challenge:
//!
//! ```text
//! payload = [blk0, txIdx0, oIdx0, nonce0, confirmSigs0,
//!            blk1, txIdx1, oIdx1, nonce1, confirmSigs1,
//!            owner0, amount0, owner1, amount1, fee]
//! tx      = [payload, [sig0, sig1]]
//! ```

use alloy_rlp::{BufMut, Decodable, Encodable, Header};
use borsh::{BorshDeserialize, BorshSerialize};
use plasma_primitives::{
    buf::{Address, Buf32, Signature},
    constants::MAX_CONFIRM_SIGS,
    crypto::{keccak256, recover_eth_signer, sha256},
    errors::CryptoError,
    position::Position,
};
use serde::{Deserialize, Serialize};

use crate::errors::TxFormatError;

/// Number of RLP items in the sign payload.
const PAYLOAD_ITEMS: usize = 15;

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Input {
    pub position: Position,
    pub signature: Option<Signature>,
    pub confirm_sigs: Vec<Signature>,
}

impl Input {
    pub fn new(position: Position, signature: Signature, confirm_sigs: Vec<Signature>) -> Self {
        Self {
            position,
            signature: Some(signature),
            confirm_sigs,
        }
    }

    /// Input at `position` without any signatures attached yet.
    pub fn unsigned(position: Position) -> Self {
        Self {
            position,
            signature: None,
            confirm_sigs: Vec::new(),
        }
    }

    fn is_blank(&self) -> bool {
        self.position.is_nil() && self.signature.is_none() && self.confirm_sigs.is_empty()
    }

    fn confirm_sig_bytes(&self) -> Vec<u8> {
        self.confirm_sigs
            .iter()
            .flat_map(|s| s.as_slice().iter().copied())
            .collect()
    }
}

#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
pub struct Output {
    pub owner: Address,
    pub amount: u64,
}

impl Output {
    pub fn new(owner: Address, amount: u64) -> Self {
        Self { owner, amount }
    }

    fn is_blank(&self) -> bool {
        self.owner.is_zero() && self.amount == 0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Transaction {
    pub input0: Input,
    pub input1: Option<Input>,
    pub output0: Output,
    pub output1: Option<Output>,
    pub fee: u64,
}

impl Transaction {
    pub fn new(
        input0: Input,
        input1: Option<Input>,
        output0: Output,
        output1: Option<Output>,
        fee: u64,
    ) -> Self {
        Self {
            input0,
            input1,
            output0,
            output1,
            fee,
        }
    }

    /// Present inputs with their index.
    pub fn inputs(&self) -> impl Iterator<Item = (usize, &Input)> {
        std::iter::once(&self.input0)
            .chain(self.input1.as_ref())
            .enumerate()
    }

    pub fn inputs_mut(&mut self) -> impl Iterator<Item = &mut Input> {
        std::iter::once(&mut self.input0).chain(self.input1.as_mut())
    }

    /// Present outputs with their index.
    pub fn outputs(&self) -> impl Iterator<Item = (usize, &Output)> {
        std::iter::once(&self.output0)
            .chain(self.output1.as_ref())
            .enumerate()
    }

    /// Sum of output amounts plus the fee, `None` on overflow.
    pub fn output_total(&self) -> Option<u64> {
        self.outputs()
            .try_fold(self.fee, |acc, (_, out)| acc.checked_add(out.amount))
    }

    /// RLP bytes covered by input signatures.
    pub fn sign_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        encode_list(&self.payload_fields(), &mut out);
        out
    }

    /// Hash signed by input owners.  Excludes all signatures.
    pub fn tx_hash(&self) -> Buf32 {
        keccak256(&self.sign_bytes())
    }

    /// Hash of the full encoding, used as the leaf committed in a block.
    pub fn merkle_hash(&self) -> Buf32 {
        sha256(&self.encode_bytes())
    }

    /// Recovers the signer of the input at `index`.
    pub fn input_signer(&self, index: usize) -> Result<Option<Address>, CryptoError> {
        let Some((_, input)) = self.inputs().nth(index) else {
            return Ok(None);
        };
        let Some(sig) = &input.signature else {
            return Ok(None);
        };
        recover_eth_signer(&self.tx_hash(), sig).map(Some)
    }

    pub fn encode_bytes(&self) -> Vec<u8> {
        let payload = self.sign_bytes();

        let mut sigs = Vec::new();
        let sig_fields: Vec<Field> = [Some(&self.input0), self.input1.as_ref()]
            .into_iter()
            .map(|input| {
                let sig = input.and_then(|i| i.signature).unwrap_or_default();
                Field::Bytes(sig.as_slice().to_vec())
            })
            .collect();
        encode_list(&sig_fields, &mut sigs);

        let mut out = Vec::with_capacity(payload.len() + sigs.len() + 4);
        Header {
            list: true,
            payload_length: payload.len() + sigs.len(),
        }
        .encode(&mut out);
        out.extend_from_slice(&payload);
        out.extend_from_slice(&sigs);
        out
    }

    /// Decodes a full encoding.  Trailing bytes are rejected.
    pub fn decode_bytes(buf: &[u8]) -> Result<Self, TxFormatError> {
        let mut buf = buf;
        let tx = Self::decode(&mut buf)?;
        if !buf.is_empty() {
            return Err(TxFormatError::Decode("trailing bytes".to_owned()));
        }
        Ok(tx)
    }

    /// Stateless well-formedness check.
    pub fn validate_basic(&self) -> Result<(), TxFormatError> {
        if self.input0.position.is_nil() {
            return Err(TxFormatError::MissingFirstInput);
        }

        for (i, input) in self.inputs() {
            if input.position.is_nil() {
                // only a nil position that still carries signatures gets here
                return Err(TxFormatError::NilInputSigned(i));
            }

            input.position.validate()?;

            if input.signature.is_none() {
                return Err(TxFormatError::MissingSignature(i));
            }

            if !input.position.is_tx_output() && !input.confirm_sigs.is_empty() {
                return Err(TxFormatError::UnexpectedConfirmSigs(i));
            }

            if input.confirm_sigs.len() > MAX_CONFIRM_SIGS {
                return Err(TxFormatError::TooManyConfirmSigs {
                    index: i,
                    count: input.confirm_sigs.len(),
                });
            }
        }

        if let Some(input1) = &self.input1 {
            if input1.position == self.input0.position {
                return Err(TxFormatError::DuplicateInputs);
            }
        }

        if self.output0.owner.is_zero() || self.output0.amount == 0 {
            return Err(TxFormatError::InvalidFirstOutput);
        }

        if let Some(output1) = &self.output1 {
            if output1.owner.is_zero() {
                return Err(TxFormatError::InvalidSecondOutput);
            }
        }

        Ok(())
    }

    fn payload_fields(&self) -> Vec<Field> {
        let mut fields = Vec::with_capacity(PAYLOAD_ITEMS);

        for input in [Some(&self.input0), self.input1.as_ref()] {
            let (pos, sigs) = match input {
                Some(input) => (input.position, input.confirm_sig_bytes()),
                None => (Position::nil(), Vec::new()),
            };
            fields.push(Field::Uint(pos.block_num()));
            fields.push(Field::Uint(pos.tx_index() as u64));
            fields.push(Field::Uint(pos.output_index() as u64));
            fields.push(Field::Uint(pos.deposit_nonce()));
            fields.push(Field::Bytes(sigs));
        }

        for output in [Some(&self.output0), self.output1.as_ref()] {
            let output = output.copied().unwrap_or_default();
            fields.push(Field::Bytes(output.owner.as_slice().to_vec()));
            fields.push(Field::Uint(output.amount));
        }

        fields.push(Field::Uint(self.fee));
        fields
    }
}

/// Hash an input owner signs to confirm they saw the transaction included.
pub fn confirmation_hash(merkle_hash: &Buf32, block_header: &Buf32) -> Buf32 {
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(merkle_hash.as_slice());
    buf[32..].copy_from_slice(block_header.as_slice());
    sha256(&buf)
}

impl Encodable for Transaction {
    fn encode(&self, out: &mut dyn BufMut) {
        out.put_slice(&self.encode_bytes());
    }
}

impl Decodable for Transaction {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let mut outer = take_list(buf)?;
        let mut payload = take_list(&mut outer)?;

        let mut inputs = Vec::with_capacity(2);
        for _ in 0..2 {
            let blk = u64::decode(&mut payload)?;
            let tx_index = u16::decode(&mut payload)?;
            let out_index = u8::decode(&mut payload)?;
            let nonce = u64::decode(&mut payload)?;
            let sig_bytes = Header::decode_bytes(&mut payload, false)?;
            if sig_bytes.len() % Signature::LEN != 0 {
                return Err(alloy_rlp::Error::Custom("confirm signatures not 65-byte aligned"));
            }
            let confirm_sigs = sig_bytes
                .chunks_exact(Signature::LEN)
                .map(Signature::try_from_slice)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| alloy_rlp::Error::Custom("bad confirm signature"))?;
            inputs.push((Position::new(blk, tx_index, out_index, nonce), confirm_sigs));
        }

        let owner0 = Address::decode(&mut payload)?;
        let amount0 = u64::decode(&mut payload)?;
        let owner1 = Address::decode(&mut payload)?;
        let amount1 = u64::decode(&mut payload)?;
        let fee = u64::decode(&mut payload)?;
        if !payload.is_empty() {
            return Err(alloy_rlp::Error::UnexpectedLength);
        }

        let mut sig_list = take_list(&mut outer)?;
        let sig0 = Signature::decode(&mut sig_list)?;
        let sig1 = Signature::decode(&mut sig_list)?;
        if !sig_list.is_empty() || !outer.is_empty() {
            return Err(alloy_rlp::Error::UnexpectedLength);
        }

        let mut inputs = inputs
            .into_iter()
            .zip([sig0, sig1])
            .map(|((position, confirm_sigs), sig)| Input {
                position,
                signature: (!sig.is_zero()).then_some(sig),
                confirm_sigs,
            });
        let input0 = inputs.next().ok_or(alloy_rlp::Error::InputTooShort)?;
        let input1 = inputs.next().filter(|i| !i.is_blank());

        let output0 = Output::new(owner0, amount0);
        let output1 = Some(Output::new(owner1, amount1)).filter(|o| !o.is_blank());

        Ok(Self {
            input0,
            input1,
            output0,
            output1,
            fee,
        })
    }
}

enum Field {
    Uint(u64),
    Bytes(Vec<u8>),
}

impl Field {
    fn length(&self) -> usize {
        match self {
            Field::Uint(v) => v.length(),
            Field::Bytes(b) => b.as_slice().length(),
        }
    }

    fn encode(&self, out: &mut dyn BufMut) {
        match self {
            Field::Uint(v) => v.encode(out),
            Field::Bytes(b) => b.as_slice().encode(out),
        }
    }
}

fn encode_list(fields: &[Field], out: &mut dyn BufMut) {
    let payload_length = fields.iter().map(Field::length).sum();
    Header {
        list: true,
        payload_length,
    }
    .encode(out);
    for field in fields {
        field.encode(out);
    }
}

fn take_list<'a>(buf: &mut &'a [u8]) -> alloy_rlp::Result<&'a [u8]> {
    let header = Header::decode(buf)?;
    if !header.list {
        return Err(alloy_rlp::Error::UnexpectedString);
    }
    let data: &'a [u8] = buf;
    if data.len() < header.payload_length {
        return Err(alloy_rlp::Error::InputTooShort);
    }
    let (body, rest) = data.split_at(header.payload_length);
    *buf = rest;
    Ok(body)
}
