#[cfg(test)]
mod tests {
    use crate::assembler::{assemble, FixedClock};
    use crate::calls::mint_call_data;
    use crate::digest::operation_digest;
    use crate::encoder::{encode_operation, encode_packed_with_tag};
    use crate::flow::{propose_and_execute, FlowError};
    use crate::mock::MockWallet;
    use crate::recover::{recover_operation_signer, recover_signer};
    use crate::signer::SignerIdentity;
    use alloy_primitives::{address, b256, Address, Bytes, U256};
    use multisig_wallet_types::{BaseCall, DirectAddress, Operation, Rejection, SignedOperation, SignerSet};

    // Well-known development keys (accounts #0, #1, #2 of the default mnemonic).
    const SIGNER_ONE: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const SIGNER_TWO: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
    const DEPLOYER: &str = "0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a";

    const TARGET: Address = address!("abcdef0123456789abcdef0123456789abcdef01");
    const NOW: u64 = 1_700_000_000_000;

    fn identities() -> (SignerIdentity, SignerIdentity, SignerIdentity) {
        (
            SignerIdentity::from_hex(SIGNER_ONE).unwrap(),
            SignerIdentity::from_hex(SIGNER_TWO).unwrap(),
            SignerIdentity::from_hex(DEPLOYER).unwrap(),
        )
    }

    fn mint_call(deployer: Address) -> BaseCall {
        BaseCall::new(TARGET, None, mint_call_data(deployer, U256::from(100u64)))
    }

    fn wallet() -> MockWallet {
        let (one, two, deployer) = identities();
        let signers = SignerSet::new(one.address(), two.address(), deployer.address(), &DirectAddress);
        MockWallet::new(signers, NOW)
    }

    #[test]
    fn digest_matches_known_vector() {
        let (_, _, deployer) = identities();
        assert_eq!(deployer.address(), address!("3c44cdddb6a900fa2b585dd299e03d12fa4293bc"));

        let op = Operation::new(
            TARGET,
            U256::ZERO,
            mint_call_data(deployer.address(), U256::from(100u64)),
            NOW + 60_000,
            U256::ZERO,
        );
        assert_eq!(encode_operation(&op).len(), 189);
        assert_eq!(
            operation_digest(&op),
            b256!("e21f657ca649365b31956384fac1ed38081cc27fbbfca2eb09ae9d2dbdb9fdac")
        );
        // Repeated invocations are byte-identical.
        assert_eq!(operation_digest(&op), operation_digest(&op.clone()));
    }

    #[test]
    fn plain_transfer_digest_matches_known_vector() {
        let op = Operation::new(
            TARGET,
            U256::from(1_000_000_000_000_000_000u64),
            Bytes::new(),
            NOW + 60_000,
            U256::from(7u64),
        );
        assert_eq!(
            operation_digest(&op),
            b256!("3caf931846b96af4c9a786d53b1b545da68d847121032b99bd63ef9cfa764a31")
        );
    }

    #[test]
    fn tag_separates_domains() {
        let payload = [0x01u8, 0x02];
        let ether = encode_packed_with_tag("ETHER", TARGET, U256::ZERO, &payload, U256::from(NOW), U256::ZERO);
        let token = encode_packed_with_tag("ERC20", TARGET, U256::ZERO, &payload, U256::from(NOW), U256::ZERO);
        let op = Operation::new(TARGET, U256::ZERO, Bytes::from(payload.to_vec()), NOW, U256::ZERO);

        assert_eq!(ether, encode_operation(&op));
        assert_ne!(
            crate::digest::keccak256_bytes(&ether),
            crate::digest::keccak256_bytes(&token)
        );
    }

    #[test]
    fn signature_recovers_to_signer() {
        let (one, two, deployer) = identities();
        let clock = FixedClock::new(NOW);
        for signer in [&one, &two, &deployer] {
            let signed = assemble(U256::from(4u64), mint_call(deployer.address()), 60, signer, &clock).unwrap();
            assert_eq!(recover_operation_signer(&signed), Ok(signer.address()));
        }
    }

    #[test]
    fn tampering_any_field_changes_recovered_signer() {
        let (one, _, deployer) = identities();
        let clock = FixedClock::new(NOW);
        let signed = assemble(U256::from(1u64), mint_call(deployer.address()), 60, &one, &clock).unwrap();
        let op = signed.operation();
        let sig = *signed.signature();

        let mut other_target = [0u8; 20];
        other_target.copy_from_slice(op.target().as_slice());
        other_target[19] ^= 0x01;
        let mut other_payload = op.payload().to_vec();
        other_payload[35] ^= 0x01;

        let tampered = [
            Operation::new(Address::from(other_target), op.value(), op.payload().clone(), op.expire_at(), op.sequence_id()),
            Operation::new(op.target(), op.value() + U256::from(1u64), op.payload().clone(), op.expire_at(), op.sequence_id()),
            Operation::new(op.target(), op.value(), Bytes::from(other_payload), op.expire_at(), op.sequence_id()),
            Operation::new(op.target(), op.value(), op.payload().clone(), op.expire_at() + 1, op.sequence_id()),
            Operation::new(op.target(), op.value(), op.payload().clone(), op.expire_at(), op.sequence_id() + U256::from(1u64)),
        ];

        for forged in tampered {
            let recovered = recover_signer(&operation_digest(&forged), &sig);
            assert_ne!(recovered, Ok(one.address()));
        }
    }

    #[test]
    fn target_is_canonicalised_regardless_of_input_case() {
        let (one, _, _) = identities();
        let clock = FixedClock::new(NOW);
        let lower = BaseCall::parse("0xabcdef0123456789abcdef0123456789abcdef01", None, "0x").unwrap();
        let upper = BaseCall::parse("0xABCDEF0123456789ABCDEF0123456789ABCDEF01", None, "0x").unwrap();

        let a = assemble(U256::ZERO, lower, 60, &one, &clock).unwrap();
        let b = assemble(U256::ZERO, upper, 60, &one, &clock).unwrap();

        assert_eq!(a.to_address(), "0xabcdef0123456789abcdef0123456789abcdef01");
        assert_eq!(b.to_address(), a.to_address());
        assert_eq!(recover_operation_signer(&a), Ok(one.address()));
        assert_eq!(recover_operation_signer(&b), Ok(one.address()));
    }

    #[test]
    fn longer_window_gives_later_expiry_and_new_digest() {
        let (one, _, deployer) = identities();
        let clock = FixedClock::new(NOW);
        let short = assemble(U256::ZERO, mint_call(deployer.address()), 60, &one, &clock).unwrap();
        let long = assemble(U256::ZERO, mint_call(deployer.address()), 61, &one, &clock).unwrap();

        assert!(long.expire_time() > short.expire_time());
        assert_ne!(operation_digest(long.operation()), operation_digest(short.operation()));
    }

    #[test]
    fn different_sequence_ids_give_different_digests() {
        let (one, _, deployer) = identities();
        let clock = FixedClock::new(NOW);
        let first = assemble(U256::from(5u64), mint_call(deployer.address()), 60, &one, &clock).unwrap();
        let second = assemble(U256::from(6u64), mint_call(deployer.address()), 60, &one, &clock).unwrap();

        assert_ne!(operation_digest(first.operation()), operation_digest(second.operation()));
        assert_ne!(first.signature(), second.signature());
    }

    #[test]
    fn transport_record_round_trips_through_json() {
        let (one, _, deployer) = identities();
        let clock = FixedClock::new(NOW);
        let signed = assemble(U256::from(12u64), mint_call(deployer.address()), 60, &one, &clock).unwrap();

        let json = serde_json::to_string(&signed).unwrap();
        assert!(json.contains("\"value\":\"0\""));
        assert!(json.contains("\"sequenceId\":\"12\""));
        let back: SignedOperation = serde_json::from_str(&json).unwrap();
        assert_eq!(recover_operation_signer(&back), Ok(one.address()));
    }

    #[tokio::test]
    async fn mint_through_wallet_then_replay_is_stale() {
        let (one, two, deployer) = identities();
        let clock = FixedClock::new(NOW);
        let reader = wallet();
        let executor = reader.connect(two.address());

        assert_eq!(reader.current_sequence_id(), U256::ZERO);
        let (signed, handle) = propose_and_execute(&reader, &executor, mint_call(deployer.address()), 60, &one, &clock)
            .await
            .unwrap();

        assert_eq!(signed.sequence_id(), U256::ZERO);
        assert_eq!(signed.expire_time(), NOW + 60_000);
        assert_eq!(signed.signature().len(), 65);
        assert_eq!(handle.hash, operation_digest(signed.operation()));
        assert_eq!(reader.current_sequence_id(), U256::from(1u64));

        let executed = reader.executed();
        assert_eq!(executed.len(), 1);
        assert_eq!(executed[0].proposer, one.address());
        assert_eq!(executed[0].executor, two.address());
        assert_eq!(executed[0].payload, mint_call_data(deployer.address(), U256::from(100u64)));

        assert_eq!(executor.execute(&signed), Err(Rejection::SequenceIdStale));
        assert_eq!(reader.current_sequence_id(), U256::from(1u64));
    }

    #[tokio::test]
    async fn proposer_cannot_execute_own_operation() {
        let (one, _, deployer) = identities();
        let clock = FixedClock::new(NOW);
        let reader = wallet();
        let same = reader.connect(one.address());

        let err = propose_and_execute(&reader, &same, mint_call(deployer.address()), 60, &one, &clock)
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::Wallet(Rejection::SignerMismatch)));
        assert_eq!(reader.current_sequence_id(), U256::ZERO);
    }

    #[test]
    fn outsider_signature_or_caller_is_rejected() {
        let (one, two, deployer) = identities();
        let outsider = SignerIdentity::from_bytes(&[0x09u8; 32]).unwrap();
        let clock = FixedClock::new(NOW);
        let w = wallet();

        let by_outsider = assemble(U256::ZERO, mint_call(deployer.address()), 60, &outsider, &clock).unwrap();
        assert_eq!(w.connect(two.address()).execute(&by_outsider), Err(Rejection::SignerMismatch));

        let by_one = assemble(U256::ZERO, mint_call(deployer.address()), 60, &one, &clock).unwrap();
        assert_eq!(w.connect(outsider.address()).execute(&by_one), Err(Rejection::NotSigner));
        assert!(w.executed().is_empty());
    }

    #[test]
    fn expired_operation_is_rejected() {
        let (one, two, deployer) = identities();
        let clock = FixedClock::new(NOW);
        let w = wallet();
        let signed = assemble(U256::ZERO, mint_call(deployer.address()), 60, &one, &clock).unwrap();

        w.set_time(NOW + 60_001);
        assert_eq!(w.connect(two.address()).execute(&signed), Err(Rejection::ExpiredOperation));

        w.set_time(NOW + 60_000);
        assert!(w.connect(two.address()).execute(&signed).is_ok());
    }

    #[test]
    fn racing_proposers_only_one_wins() {
        let (one, two, deployer) = identities();
        let clock = FixedClock::new(NOW);
        let w = wallet();
        let seq = w.current_sequence_id();

        let from_one = assemble(seq, mint_call(deployer.address()), 60, &one, &clock).unwrap();
        let from_deployer = assemble(seq, mint_call(deployer.address()), 60, &deployer, &clock).unwrap();

        assert!(w.connect(two.address()).execute(&from_one).is_ok());
        assert_eq!(w.connect(two.address()).execute(&from_deployer), Err(Rejection::SequenceIdStale));
    }

    #[test]
    fn highest_sequence_id_is_usable_exactly_once() {
        let (one, two, deployer) = identities();
        let clock = FixedClock::new(NOW);
        let w = wallet();
        let executor = w.connect(two.address());

        let last = assemble(U256::MAX, mint_call(deployer.address()), 60, &one, &clock).unwrap();
        assert!(executor.execute(&last).is_ok());
        assert_eq!(executor.execute(&last), Err(Rejection::SequenceIdStale));

        // Nothing lower is acceptable either once the id space is used up.
        clock.set(NOW + 1_000);
        let other = assemble(U256::from(3u64), mint_call(deployer.address()), 60, &one, &clock).unwrap();
        assert_eq!(executor.execute(&other), Err(Rejection::SequenceIdStale));
        assert_eq!(w.executed().len(), 1);
    }

    #[test]
    fn forged_field_is_rejected_by_wallet() {
        let (one, two, deployer) = identities();
        let clock = FixedClock::new(NOW);
        let w = wallet();
        let signed = assemble(U256::ZERO, mint_call(deployer.address()), 60, &one, &clock).unwrap();

        let op = signed.operation();
        let forged = SignedOperation::new(
            Operation::new(op.target(), U256::from(1u64), op.payload().clone(), op.expire_at(), op.sequence_id()),
            *signed.signature(),
        );
        let outcome = w.connect(two.address()).execute(&forged);
        assert!(matches!(outcome, Err(Rejection::SignerMismatch) | Err(Rejection::InvalidSignature)));
    }
}
