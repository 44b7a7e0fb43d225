/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Canonical serialization of [Transaction] and [SmartContractResult].
//!
//! Both are encoded as protobuf messages with fixed field tags. Default values (zero integers,
//! empty byte strings) are omitted from the encoding, as protobuf does. Big integers are
//! encoded as a sign byte followed by the big-endian magnitude, so that zero is `00 00`.
//!
//! The canonical serialization defines the hash of a transaction or a result, and is the
//! payload embedded in a relayed transaction envelope.

use blake2::{digest::consts::U32, Blake2b, Digest};
use num_bigint::BigUint;
use prost::Message;

use crate::{
    error::DecodeError,
    types::{Address, Hash, SmartContractResult, Transaction},
};

type Blake2b256 = Blake2b<U32>;

/// Serializable defines the canonical byte encoding of a data type.
pub trait Serializable: Sized {
    fn serialize(&self) -> Vec<u8>;

    fn deserialize(bytes: &[u8]) -> Result<Self, DecodeError>;
}

/// Computes the Blake2b-256 digest of arbitrary input.
pub fn blake2b_256(input: &[u8]) -> Hash {
    let mut hasher = Blake2b256::new();
    hasher.update(input);
    hasher.finalize().into()
}

#[derive(Clone, PartialEq, Message)]
struct TransactionProto {
    #[prost(uint64, tag = "1")]
    nonce: u64,
    #[prost(bytes = "vec", tag = "2")]
    value: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    rcv_addr: Vec<u8>,
    #[prost(bytes = "vec", tag = "5")]
    snd_addr: Vec<u8>,
    #[prost(uint64, tag = "7")]
    gas_price: u64,
    #[prost(uint64, tag = "8")]
    gas_limit: u64,
    #[prost(bytes = "vec", tag = "9")]
    data: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
struct SmartContractResultProto {
    #[prost(uint64, tag = "1")]
    nonce: u64,
    #[prost(bytes = "vec", tag = "2")]
    value: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    rcv_addr: Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    snd_addr: Vec<u8>,
    #[prost(bytes = "vec", tag = "5")]
    relayer_addr: Vec<u8>,
    #[prost(bytes = "vec", tag = "8")]
    data: Vec<u8>,
    #[prost(bytes = "vec", tag = "9")]
    prev_tx_hash: Vec<u8>,
    #[prost(bytes = "vec", tag = "10")]
    original_tx_hash: Vec<u8>,
    #[prost(uint64, tag = "11")]
    gas_limit: u64,
    #[prost(uint64, tag = "12")]
    gas_price: u64,
    #[prost(bytes = "vec", tag = "16")]
    original_sender: Vec<u8>,
    #[prost(bool, tag = "17")]
    is_refund: bool,
}

impl Serializable for Transaction {
    fn serialize(&self) -> Vec<u8> {
        TransactionProto {
            nonce: self.nonce,
            value: encode_big_uint(&self.value),
            rcv_addr: self.receiver.to_vec(),
            snd_addr: self.sender.to_vec(),
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            data: self.data.clone(),
        }
        .encode_to_vec()
    }

    fn deserialize(bytes: &[u8]) -> Result<Self, DecodeError> {
        let proto = TransactionProto::decode(bytes)?;
        Ok(Transaction {
            nonce: proto.nonce,
            value: decode_big_uint(&proto.value, "value")?,
            receiver: decode_address(&proto.rcv_addr, "receiver")?,
            sender: decode_address(&proto.snd_addr, "sender")?,
            gas_price: proto.gas_price,
            gas_limit: proto.gas_limit,
            data: proto.data,
        })
    }
}

impl Serializable for SmartContractResult {
    fn serialize(&self) -> Vec<u8> {
        SmartContractResultProto {
            nonce: self.nonce,
            value: encode_big_uint(&self.value),
            rcv_addr: self.receiver.to_vec(),
            snd_addr: self.sender.to_vec(),
            relayer_addr: self.relayer.map(|r| r.to_vec()).unwrap_or_default(),
            data: self.data.clone(),
            prev_tx_hash: self.prev_tx_hash.to_vec(),
            original_tx_hash: self.original_tx_hash.to_vec(),
            gas_limit: self.gas_limit,
            gas_price: self.gas_price,
            original_sender: self.original_sender.to_vec(),
            is_refund: self.is_refund,
        }
        .encode_to_vec()
    }

    fn deserialize(bytes: &[u8]) -> Result<Self, DecodeError> {
        let proto = SmartContractResultProto::decode(bytes)?;
        let relayer = match proto.relayer_addr.is_empty() {
            true => None,
            false => Some(decode_address(&proto.relayer_addr, "relayer")?),
        };
        Ok(SmartContractResult {
            nonce: proto.nonce,
            value: decode_big_uint(&proto.value, "value")?,
            receiver: decode_address(&proto.rcv_addr, "receiver")?,
            sender: decode_address(&proto.snd_addr, "sender")?,
            data: proto.data,
            prev_tx_hash: decode_address(&proto.prev_tx_hash, "prev_tx_hash")?,
            original_tx_hash: decode_address(&proto.original_tx_hash, "original_tx_hash")?,
            gas_limit: proto.gas_limit,
            gas_price: proto.gas_price,
            original_sender: decode_address(&proto.original_sender, "original_sender")?,
            relayer,
            is_refund: proto.is_refund,
        })
    }
}

/// Sign byte `0` followed by the big-endian magnitude. `BigUint::to_bytes_be` yields `[0]`
/// for zero, hence zero encodes to `[0, 0]`.
fn encode_big_uint(value: &BigUint) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(1 + (value.bits() as usize + 7) / 8);
    bytes.push(0u8);
    bytes.extend(value.to_bytes_be());
    bytes
}

fn decode_big_uint(bytes: &[u8], field: &'static str) -> Result<BigUint, DecodeError> {
    match bytes.split_first() {
        Some((0, magnitude)) if !magnitude.is_empty() => Ok(BigUint::from_bytes_be(magnitude)),
        _ => Err(DecodeError::InvalidBigInt { field }),
    }
}

fn decode_address(bytes: &[u8], field: &'static str) -> Result<Address, DecodeError> {
    <Address>::try_from(bytes).map_err(|_| DecodeError::InvalidAddressLength {
        field,
        len: bytes.len(),
    })
}
