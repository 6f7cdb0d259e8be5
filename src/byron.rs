// src/byron.rs

use crc::{CRC_32_ISO_HDLC, Crc};
use minicbor::Encoder;
use minicbor::data::IanaTag;
use pallas_crypto::hash::Hasher;
use sha3::{Digest, Sha3_256};

use crate::address::NetworkDescriptor;
use crate::constants::BYRON_ATTRIBUTE_PROTOCOL_MAGIC;
use crate::encoding::base58_encode;
use crate::error::Result;
use crate::keys::ExtendedPublicKey;

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

// addrType 0 = public key, spending data tag 0 = public key
const ADDR_TYPE_PUBKEY: u8 = 0;
const SPENDING_DATA_PUBKEY: u8 = 0;

/// Address attributes: empty on mainnet, otherwise `{2: bytes(cbor(magic))}`.
fn encode_attributes(e: &mut Encoder<&mut Vec<u8>>, network: &NetworkDescriptor) -> Result<()> {
    if network.is_mainnet_magic() {
        e.map(0)?;
    } else {
        let mut magic = Vec::new();
        Encoder::new(&mut magic).u32(network.protocol_magic)?;
        e.map(1)?.u8(BYRON_ATTRIBUTE_PROTOCOL_MAGIC)?.bytes(&magic)?;
    }
    Ok(())
}

/// blake2b_224(sha3_256(cbor([addrType, [0, xpub], {}])))
///
/// Network attributes stay out of the root; only the payload carries them.
fn address_root(xpub: &ExtendedPublicKey) -> Result<[u8; 28]> {
    let mut spending = Vec::new();
    let mut e = Encoder::new(&mut spending);
    e.array(3)?.u8(ADDR_TYPE_PUBKEY)?;
    e.array(2)?.u8(SPENDING_DATA_PUBKEY)?.bytes(xpub.as_bytes())?;
    e.map(0)?;

    let sha = Sha3_256::digest(&spending);
    Ok(*Hasher::<224>::hash(&sha))
}

/// Raw address bytes: `[tag24(bytes(payload)), crc32(payload)]`.
pub fn encode(xpub: &ExtendedPublicKey, network: &NetworkDescriptor) -> Result<Vec<u8>> {
    // 1. root over the spending data, network independent
    let root = address_root(xpub)?;

    // 2. payload: [root, attributes, addrType]
    let mut payload = Vec::new();
    let mut e = Encoder::new(&mut payload);
    e.array(3)?.bytes(&root)?;
    encode_attributes(&mut e, network)?;
    e.u8(ADDR_TYPE_PUBKEY)?;

    // 3. envelope: tag 24 around the payload bytes, then its CRC32
    let crc = CRC32.checksum(&payload);

    let mut out = Vec::new();
    Encoder::new(&mut out).array(2)?.tag(IanaTag::Cbor)?.bytes(&payload)?.u32(crc)?;
    Ok(out)
}

pub fn to_base58(bytes: &[u8]) -> String {
    base58_encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xpub() -> ExtendedPublicKey {
        ExtendedPublicKey::from_bytes([7u8; 64])
    }

    #[test]
    fn test_envelope_layout() {
        let bytes = encode(&xpub(), &NetworkDescriptor::MAINNET).unwrap();
        // array(2), tag(24), bytes(len)
        assert_eq!(&bytes[..3], &[0x82, 0xd8, 0x18]);
        assert_eq!(bytes[3], 0x58);
        let len = bytes[4] as usize;
        let payload = &bytes[5..5 + len];
        // [bytes(28) root, {}, 0]
        assert_eq!(&payload[..2], &[0x83, 0x58]);
        assert_eq!(payload[2], 28);
        assert_eq!(&payload[31..], &[0xa0, 0x00]);
        let crc = minicbor::Decoder::new(&bytes[5 + len..]).u32().unwrap();
        assert_eq!(crc, CRC32.checksum(payload));
    }

    #[test]
    fn test_magic_attribute() {
        let net = NetworkDescriptor { network_id: 0, protocol_magic: 42 };
        let bytes = encode(&xpub(), &net).unwrap();
        let len = bytes[4] as usize;
        let payload = &bytes[5..5 + len];
        // {2: bytes([0x18, 42])}
        assert_eq!(&payload[31..], &[0xa1, 0x02, 0x42, 0x18, 0x2a, 0x00]);
    }

    fn payload_root(bytes: &[u8]) -> [u8; 28] {
        let len = bytes[4] as usize;
        let payload = &bytes[5..5 + len];
        let mut d = minicbor::Decoder::new(payload);
        d.array().unwrap();
        d.bytes().unwrap().try_into().unwrap()
    }

    #[test]
    fn test_root_ignores_network() {
        let main = encode(&xpub(), &NetworkDescriptor::MAINNET).unwrap();
        let magic_42 = encode(&xpub(), &NetworkDescriptor { network_id: 0, protocol_magic: 42 }).unwrap();
        let preprod = encode(&xpub(), &NetworkDescriptor::PREPROD).unwrap();

        let root = address_root(&xpub()).unwrap();
        assert_eq!(payload_root(&main), root);
        assert_eq!(payload_root(&magic_42), root);
        assert_eq!(payload_root(&preprod), root);
        assert_ne!(main, magic_42);
    }
}
