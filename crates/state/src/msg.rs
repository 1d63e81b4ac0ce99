//! Messages accepted by the chain's check/deliver entry points.

use alloy_rlp::{Decodable, Encodable};
use alloy_rlp_derive::{RlpDecodable, RlpEncodable};
use plasma_primitives::{
    buf::{Address, Signature},
    position::Position,
};

use crate::{errors::TxFormatError, tx::Transaction};

const SPEND_TAG: u8 = 0x01;
const INCLUDE_DEPOSIT_TAG: u8 = 0x02;
const CONFIRM_SIGS_TAG: u8 = 0x03;

/// Request to include a finalized root-chain deposit.
#[derive(Clone, Debug, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct IncludeDeposit {
    pub nonce: u64,
    pub owner: Address,
}

/// Confirmation signatures for the transaction output at
/// `(block_num, tx_index, output_index)`, submitted ahead of spending it.
///
/// Each signature must come from one of the output's input owners.
#[derive(Clone, Debug, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct ConfirmSigs {
    pub block_num: u64,
    pub tx_index: u16,
    pub output_index: u8,
    pub sigs: Vec<Signature>,
}

impl ConfirmSigs {
    pub fn new(position: Position, sigs: Vec<Signature>) -> Self {
        Self {
            block_num: position.block_num(),
            tx_index: position.tx_index(),
            output_index: position.output_index(),
            sigs,
        }
    }

    pub fn position(&self) -> Position {
        Position::tx_output(self.block_num, self.tx_index, self.output_index)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChainMsg {
    Spend(Transaction),
    IncludeDeposit(IncludeDeposit),
    ConfirmSigs(ConfirmSigs),
}

impl ChainMsg {
    /// Encodes as a tag byte followed by the RLP body.
    pub fn encode_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            ChainMsg::Spend(tx) => {
                out.push(SPEND_TAG);
                out.extend_from_slice(&tx.encode_bytes());
            }
            ChainMsg::IncludeDeposit(msg) => {
                out.push(INCLUDE_DEPOSIT_TAG);
                msg.encode(&mut out);
            }
            ChainMsg::ConfirmSigs(msg) => {
                out.push(CONFIRM_SIGS_TAG);
                msg.encode(&mut out);
            }
        }
        out
    }

    pub fn decode_bytes(buf: &[u8]) -> Result<Self, TxFormatError> {
        let Some((tag, body)) = buf.split_first() else {
            return Err(TxFormatError::Decode("empty message".to_owned()));
        };

        match *tag {
            SPEND_TAG => Transaction::decode_bytes(body).map(ChainMsg::Spend),
            INCLUDE_DEPOSIT_TAG => decode_body(body).map(ChainMsg::IncludeDeposit),
            CONFIRM_SIGS_TAG => decode_body(body).map(ChainMsg::ConfirmSigs),
            other => Err(TxFormatError::Decode(format!("unknown message tag {other:#x}"))),
        }
    }
}

fn decode_body<T: Decodable>(mut body: &[u8]) -> Result<T, TxFormatError> {
    let msg = T::decode(&mut body)?;
    if !body.is_empty() {
        return Err(TxFormatError::Decode("trailing bytes".to_owned()));
    }
    Ok(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::{Input, Output};

    #[test]
    fn test_deposit_msg() {
        let msg = ChainMsg::IncludeDeposit(IncludeDeposit {
            nonce: 5,
            owner: Address([3; 20]),
        });
        let enc = msg.encode_bytes();
        assert_eq!(enc[0], INCLUDE_DEPOSIT_TAG);
        assert_eq!(ChainMsg::decode_bytes(&enc).unwrap(), msg);
    }

    #[test]
    fn test_spend_msg() {
        let tx = Transaction::new(
            Input::unsigned(Position::deposit(1)),
            None,
            Output::new(Address([4; 20]), 9),
            None,
            1,
        );
        let msg = ChainMsg::Spend(tx);
        assert_eq!(ChainMsg::decode_bytes(&msg.encode_bytes()).unwrap(), msg);
    }

    #[test]
    fn test_confirm_sigs_msg() {
        let position = Position::tx_output(7, 3, 1);
        let msg = ConfirmSigs::new(position, vec![Signature([1; 65]), Signature([2; 65])]);
        assert_eq!(msg.position(), position);

        let enc = ChainMsg::ConfirmSigs(msg.clone()).encode_bytes();
        assert_eq!(enc[0], CONFIRM_SIGS_TAG);
        assert_eq!(
            ChainMsg::decode_bytes(&enc).unwrap(),
            ChainMsg::ConfirmSigs(msg)
        );

        let mut trailing = enc;
        trailing.push(0x80);
        assert!(ChainMsg::decode_bytes(&trailing).is_err());
    }

    #[test]
    fn test_bad_messages() {
        assert!(ChainMsg::decode_bytes(&[]).is_err());
        assert!(ChainMsg::decode_bytes(&[0x07, 0xc0]).is_err());
        assert!(ChainMsg::decode_bytes(&[INCLUDE_DEPOSIT_TAG, 0x01]).is_err());
        assert!(ChainMsg::decode_bytes(&[CONFIRM_SIGS_TAG, 0xc0]).is_err());
    }
}
