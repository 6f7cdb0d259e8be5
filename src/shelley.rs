// src/shelley.rs

use crate::address::{AddressKind, AddressSpec, NetworkDescriptor};
use crate::constants::{HRP_ADDR, HRP_ADDR_TEST, HRP_STAKE, HRP_STAKE_TEST};
use crate::credential::{Credential, Pointer};
use crate::encoding::bech32_encode;
use crate::error::{EngineError, Result};

/// Base-128, most significant group first, high bit set on every byte but the last.
pub fn encode_varint(value: u64, out: &mut Vec<u8>) {
    let mut groups = [0u8; 10];
    let mut n = 0;
    let mut v = value;
    loop {
        groups[n] = (v & 0x7f) as u8;
        n += 1;
        v >>= 7;
        if v == 0 {
            break;
        }
    }
    for i in (0..n).rev() {
        let continuation = if i > 0 { 0x80 } else { 0x00 };
        out.push(groups[i] | continuation);
    }
}

pub fn encode_pointer(pointer: &Pointer, out: &mut Vec<u8>) {
    encode_varint(pointer.block_index, out);
    encode_varint(pointer.tx_index, out);
    encode_varint(pointer.cert_index, out);
}

pub fn header(kind: AddressKind, network: &NetworkDescriptor) -> u8 {
    (kind.header_nibble() << 4) | (network.network_id & 0x0f)
}

pub fn hrp(kind: AddressKind, network: &NetworkDescriptor) -> &'static str {
    match (kind.is_reward(), network.is_testnet_id()) {
        (true, true) => HRP_STAKE_TEST,
        (true, false) => HRP_STAKE,
        (false, true) => HRP_ADDR_TEST,
        (false, false) => HRP_ADDR,
    }
}

fn push_credential(kind: AddressKind, slot: &str, credential: &Credential, out: &mut Vec<u8>) -> Result<()> {
    match credential {
        Credential::KeyHash(h) | Credential::ScriptHash(h) => out.extend_from_slice(&h[..]),
        Credential::Pointer(p) => encode_pointer(p, out),
        Credential::Absent => {}
        Credential::ExtendedKey(_) => {
            return Err(EngineError::InvalidCredentialCombination {
                kind,
                reason: format!("{} credential cannot be an extended key", slot),
            });
        }
    }
    Ok(())
}

/// Header byte, then payment part, then staking part.
pub fn encode(spec: &AddressSpec) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(57);
    // 1. header: kind nibble, network id nibble
    out.push(header(spec.kind, &spec.network));
    // 2. payment hash (absent for reward addresses)
    push_credential(spec.kind, "payment", &spec.payment, &mut out)?;
    // 3. staking hash, pointer varints, or nothing
    push_credential(spec.kind, "staking", &spec.staking, &mut out)?;
    Ok(out)
}

pub fn to_bech32(kind: AddressKind, network: &NetworkDescriptor, bytes: &[u8]) -> Result<String> {
    bech32_encode(hrp(kind, network), bytes)
}
