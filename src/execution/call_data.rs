/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Parsing of `@`-separated call data, deploy data and error payloads.
//!
//! - Call data: `function[@hexarg]*`
//! - Deploy data: `hexcode@hexvmtype[@hexarg]*`
//! - Return data and error payloads: `[@hexvalue]*`, i.e. starting with the separator.

use crate::{error::CallDataError, types::ReturnCode};

pub const ARGUMENT_SEPARATOR: u8 = b'@';

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallData {
    pub function: String,
    pub arguments: Vec<Vec<u8>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployData {
    pub code: Vec<u8>,
    pub vm_type: [u8; 2],
    pub arguments: Vec<Vec<u8>>,
}

pub fn parse_call_data(data: &[u8]) -> Result<CallData, CallDataError> {
    if data.is_empty() {
        return Err(CallDataError::EmptyData);
    }
    let mut parts = data.split(|b| *b == ARGUMENT_SEPARATOR);
    let function = parts
        .next()
        .filter(|name| !name.is_empty())
        .and_then(|name| std::str::from_utf8(name).ok())
        .ok_or(CallDataError::InvalidFunctionName)?
        .to_string();

    Ok(CallData {
        function,
        arguments: decode_arguments(parts, 0)?,
    })
}

pub fn parse_deploy_data(data: &[u8]) -> Result<DeployData, CallDataError> {
    if data.is_empty() {
        return Err(CallDataError::EmptyData);
    }
    let mut parts = data.split(|b| *b == ARGUMENT_SEPARATOR);

    let code = parts
        .next()
        .filter(|code| !code.is_empty())
        .ok_or(CallDataError::MissingCode)?;
    let code = hex::decode(code).map_err(|_| CallDataError::InvalidHexArgument { index: 0 })?;

    let vm_type = parts
        .next()
        .and_then(|vm_type| hex::decode(vm_type).ok())
        .and_then(|vm_type| <[u8; 2]>::try_from(vm_type.as_slice()).ok())
        .ok_or(CallDataError::InvalidVmType)?;

    Ok(DeployData {
        code,
        vm_type,
        arguments: decode_arguments(parts, 2)?,
    })
}

fn decode_arguments<'a>(
    parts: impl Iterator<Item = &'a [u8]>,
    first_index: usize,
) -> Result<Vec<Vec<u8>>, CallDataError> {
    parts
        .enumerate()
        .map(|(i, arg)| {
            hex::decode(arg).map_err(|_| CallDataError::InvalidHexArgument {
                index: first_index + i,
            })
        })
        .collect()
}

/// Builds `function[@hexarg]*`.
pub fn build_call_data(function: &str, arguments: &[Vec<u8>]) -> Vec<u8> {
    let mut data = function.as_bytes().to_vec();
    for arg in arguments {
        data.push(ARGUMENT_SEPARATOR);
        data.extend(hex::encode(arg).into_bytes());
    }
    data
}

/// Builds `[@hexvalue]*` from return data.
pub fn build_return_data(values: &[Vec<u8>]) -> Vec<u8> {
    build_call_data("", values)
}

/// `@hex(code message)[@hex(return message)]`
pub fn error_payload(return_code: ReturnCode, return_message: &str) -> Vec<u8> {
    let mut values = vec![return_code.message().as_bytes().to_vec()];
    if !return_message.is_empty() {
        values.push(return_message.as_bytes().to_vec());
    }
    build_return_data(&values)
}

/// Data of results which only carry return data or an error payload.
pub fn is_return_data(data: &[u8]) -> bool {
    data.first() == Some(&ARGUMENT_SEPARATOR)
}
