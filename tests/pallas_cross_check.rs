// tests/pallas_cross_check.rs

#[cfg(test)]
mod pallas_cross_check_tests {
    use cardano_derive_lib::{
        AddressKind, CredentialSource, DerivationPath, Engine, EngineConfig, MnemonicRootKey, NetworkDescriptor,
    };
    use pallas_addresses::{Address, Network, ShelleyAddress, ShelleyDelegationPart, ShelleyPaymentPart};
    use pallas_crypto::hash::Hash;

    const MNEMONIC: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    const SCRIPT_HASH: &str = "c4b9265645fde9536c0795adbcc5291767a0c61fd62448341d7e0386";

    fn engine() -> Engine<MnemonicRootKey> {
        let keys = MnemonicRootKey::from_mnemonic(MNEMONIC, "").unwrap();
        Engine::new(keys, EngineConfig::default())
    }

    fn path(text: &str) -> CredentialSource {
        CredentialSource::Path(text.parse::<DerivationPath>().unwrap())
    }

    fn key_hash(engine: &Engine<MnemonicRootKey>, text: &str) -> Hash<28> {
        engine.derive_key_hash(&text.parse().unwrap()).unwrap()
    }

    #[test]
    fn test_base_key_key_matches_pallas() {
        let engine = engine();
        let ours = engine
            .derive_address(
                NetworkDescriptor::MAINNET,
                AddressKind::BasePaymentKeyStakeKey,
                &path("m/1852'/1815'/0'/0/1"),
                &path("m/1852'/1815'/0'/2/0"),
            )
            .unwrap()
            .address;

        let theirs = Address::Shelley(ShelleyAddress::new(
            Network::Mainnet,
            ShelleyPaymentPart::Key(key_hash(&engine, "m/1852'/1815'/0'/0/1")),
            ShelleyDelegationPart::Key(key_hash(&engine, "m/1852'/1815'/0'/2/0")),
        ));

        assert_eq!(ours.text, theirs.to_bech32().unwrap());
        assert_eq!(ours.bytes, theirs.to_vec());
    }

    #[test]
    fn test_enterprise_testnet_matches_pallas() {
        let engine = engine();
        let ours = engine
            .derive_address(
                NetworkDescriptor::PREPROD,
                AddressKind::EnterpriseKey,
                &path("m/1852'/1815'/0'/0/0"),
                &CredentialSource::None,
            )
            .unwrap()
            .address;

        let theirs = Address::Shelley(ShelleyAddress::new(
            Network::Testnet,
            ShelleyPaymentPart::Key(key_hash(&engine, "m/1852'/1815'/0'/0/0")),
            ShelleyDelegationPart::Null,
        ));

        assert_eq!(ours.text, theirs.to_bech32().unwrap());
    }

    #[test]
    fn test_script_payment_decodes_in_pallas() {
        let engine = engine();
        let ours = engine
            .derive_address(
                NetworkDescriptor::MAINNET,
                AddressKind::BasePaymentScriptStakeKey,
                &CredentialSource::ScriptHash(hex::decode(SCRIPT_HASH).unwrap()),
                &path("m/1852'/1815'/0'/2/0"),
            )
            .unwrap()
            .address;

        match Address::from_bech32(&ours.text).unwrap() {
            Address::Shelley(shelley) => {
                assert!(matches!(shelley.payment(), ShelleyPaymentPart::Script(h) if hex::encode(h) == SCRIPT_HASH));
                assert!(matches!(shelley.delegation(), ShelleyDelegationPart::Key(_)));
                assert_eq!(shelley.network(), Network::Mainnet);
            }
            other => panic!("expected a Shelley address, got {:?}", other),
        }
    }
}
