// tests/native_script.rs

#[cfg(test)]
mod native_script_tests {
    use cardano_derive_lib::config::ScriptLimits;
    use cardano_derive_lib::native_script::{SessionState, hash_native_script};
    use cardano_derive_lib::{
        ComplexScript, DisplayFormat, Engine, EngineConfig, EngineError, MnemonicRootKey, NativeScript, SimpleScript,
    };
    use hex_literal::hex;
    use proptest::prelude::*;

    const MNEMONIC: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    const THIRD_PARTY: [u8; 28] = hex!("3a55d9f68255dfbefa1efd711f82d005fae1be2e145d616c90cf0fa9");
    const KEY_A: [u8; 28] = hex!("c4b9265645fde9536c0795adbcc5291767a0c61fd62448341d7e0386");
    const KEY_B: [u8; 28] = hex!("0241f2d196f52a92fbd2183d03b370c30b6960cfdeae364ffabac889");

    fn keys() -> MnemonicRootKey {
        MnemonicRootKey::from_mnemonic(MNEMONIC, "").expect("valid mnemonic")
    }

    fn engine() -> Engine<MnemonicRootKey> {
        Engine::new(keys(), EngineConfig::default())
    }

    fn leaf(bytes: &[u8]) -> NativeScript {
        NativeScript::PubkeyThirdParty { key_hash: bytes.to_vec() }
    }

    #[test]
    fn test_third_party_pubkey_both_formats() {
        let engine = engine();
        let bech32 = engine.hash_script(&leaf(&THIRD_PARTY), DisplayFormat::Bech32).unwrap();
        let policy = engine.hash_script(&leaf(&THIRD_PARTY), DisplayFormat::PolicyId).unwrap();

        assert_eq!(bech32.to_hex(), "855228f5ecececf9c85618007cc3c2e5bdf5e6d41ef8d6fa793fe0eb");
        assert_eq!(bech32.hash, policy.hash);
        assert_eq!(bech32.text, "script1s4fz3a0vank0njzkrqq8es7zuk7ltek5rmudd7ne8lswkg04892");
        assert_eq!(policy.text, "policy1s4fz3a0vank0njzkrqq8es7zuk7ltek5rmudd7ne8lswksjhv04");
    }

    #[test]
    fn test_device_owned_pubkey() {
        let script = NativeScript::PubkeyOwned { path: "m/1852'/1815'/0'/0/0".parse().unwrap() };
        let out = engine().hash_script(&script, DisplayFormat::Bech32).unwrap();
        assert_eq!(out.to_hex(), "5102a193b3d5f0c256fcc425836ffb15e7d96d3389f5e57dc6bea726");
    }

    #[test]
    fn test_multisig_purpose_key() {
        let script = NativeScript::PubkeyOwned { path: "m/1854'/1815'/0'/0/0".parse().unwrap() };
        let out = engine().hash_script(&script, DisplayFormat::Bech32).unwrap();
        assert_eq!(out.to_hex(), "de685e72586c4269087e282c9c7e78ba22082bce4a674977b4000e99");
    }

    #[test]
    fn test_session_matches_whole_tree() {
        let mut engine = engine();
        engine.begin_script().unwrap();
        engine.script_start_complex(ComplexScript::All).unwrap();
        engine.script_add_simple(&SimpleScript::PubkeyThirdParty(KEY_A.to_vec())).unwrap();
        engine.script_add_simple(&SimpleScript::PubkeyThirdParty(KEY_B.to_vec())).unwrap();
        assert_eq!(engine.script_state(), Some(SessionState::Building { depth: 1 }));
        engine.script_close_complex().unwrap();
        let streamed = engine.script_finish(DisplayFormat::Bech32).unwrap();
        assert_eq!(streamed.to_hex(), "af5c2ce476a6ede1c879f7b1909d6a0b96cb2081391712d4a355cef6");
        assert_eq!(engine.script_state(), None);

        let whole = engine
            .hash_script(&NativeScript::All { scripts: vec![leaf(&KEY_A), leaf(&KEY_B)] }, DisplayFormat::Bech32)
            .unwrap();
        assert_eq!(streamed, whole);
    }

    #[test]
    fn test_timelocks() {
        let engine = engine();
        let before = engine.hash_script(&NativeScript::InvalidBefore { slot: 42 }, DisplayFormat::Bech32).unwrap();
        let after = engine.hash_script(&NativeScript::InvalidHereafter { slot: 42 }, DisplayFormat::Bech32).unwrap();
        assert_eq!(before.to_hex(), "2a25e608a683057e32ea38b50ce8875d5b34496b393da8d25d314c4e");
        assert_eq!(after.to_hex(), "1620dc65993296335183f23ff2f7747268168fabbeecbf24c8a20194");
    }

    #[test]
    fn test_session_lifecycle_errors() {
        let mut engine = engine();
        assert_eq!(engine.script_close_complex(), Err(EngineError::NoScriptSession));
        assert_eq!(
            engine.script_finish(DisplayFormat::Bech32).unwrap_err(),
            EngineError::NoScriptSession
        );

        engine.begin_script().unwrap();
        assert_eq!(engine.begin_script(), Err(EngineError::ScriptSessionInProgress));

        engine.script_start_complex(ComplexScript::Any).unwrap();
        assert!(matches!(
            engine.script_finish(DisplayFormat::Bech32),
            Err(EngineError::IncompleteScript(_))
        ));
        assert_eq!(engine.script_close_complex(), Err(EngineError::EmptyComposite));

        engine.script_reset();
        assert_eq!(engine.script_state(), None);
        engine.begin_script().unwrap();
        assert_eq!(engine.script_state(), Some(SessionState::Idle));
    }

    #[test]
    fn test_bad_leaf_leaves_session_untouched() {
        let mut engine = engine();
        engine.begin_script().unwrap();
        engine.script_start_complex(ComplexScript::All).unwrap();
        let err = engine.script_add_simple(&SimpleScript::PubkeyThirdParty(vec![0u8; 20])).unwrap_err();
        assert_eq!(err, EngineError::InvalidHashLength { expected: 28, actual: 20 });
        assert_eq!(engine.script_close_complex(), Err(EngineError::EmptyComposite));
    }

    #[test]
    fn test_configured_limits_apply() {
        let config = EngineConfig {
            script_limits: ScriptLimits { max_depth: 1, max_children: 4, max_nodes: 16 },
            ..EngineConfig::default()
        };
        let engine = Engine::new(keys(), config);
        let nested = NativeScript::All { scripts: vec![NativeScript::Any { scripts: vec![leaf(&KEY_A)] }] };
        assert!(matches!(
            engine.hash_script(&nested, DisplayFormat::Bech32),
            Err(EngineError::ScriptTooComplex(_))
        ));
    }

    #[test]
    fn test_deep_tree_within_limits() {
        let limits = ScriptLimits { max_depth: 500, max_children: 4, max_nodes: 1000 };
        let mut script = leaf(&KEY_A);
        for _ in 0..400 {
            script = NativeScript::Any { scripts: vec![script] };
        }
        let out = hash_native_script(&keys(), limits, &script, DisplayFormat::Bech32).unwrap();
        assert_eq!(out.hash.len(), 28);
    }

    fn distinct_hashes() -> impl Strategy<Value = Vec<[u8; 28]>> {
        prop::collection::btree_set(any::<[u8; 28]>(), 2..6).prop_map(|set| set.into_iter().collect())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_children_order_matters(hashes in distinct_hashes(), kind in 0u8..3) {
            let wrap = |children: Vec<NativeScript>| match kind {
                0 => NativeScript::All { scripts: children },
                1 => NativeScript::Any { scripts: children },
                _ => NativeScript::NOfK { required: 1, scripts: children },
            };
            let original: Vec<NativeScript> = hashes.iter().map(|h| leaf(h)).collect();
            let mut rotated = original.clone();
            rotated.rotate_left(1);

            let limits = ScriptLimits::default();
            let keys = keys();
            let a = hash_native_script(&keys, limits, &wrap(original.clone()), DisplayFormat::Bech32).unwrap();
            let again = hash_native_script(&keys, limits, &wrap(original), DisplayFormat::Bech32).unwrap();
            let b = hash_native_script(&keys, limits, &wrap(rotated), DisplayFormat::Bech32).unwrap();

            prop_assert_eq!(&a, &again);
            prop_assert_ne!(a.hash, b.hash);
        }
    }
}
