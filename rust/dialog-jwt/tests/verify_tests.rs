//! Integration tests for issuing and verifying JWTs.
//!
//! These tests use real keys to issue tokens, publish the matching keys in
//! in-memory DID documents, and check what `verify_jwt` accepts.

use dialog_credentials::{Ed25519Signer, Es256KSigner, Es256Signer, SoftwareSigner, SoftwareVerifier};
use dialog_jws::{
    Algorithm, CONDITIONAL_PROOF_2022, Did, DidDocument, ECDSA_SECP256K1_RECOVERY_METHOD_2020,
    ECDSA_SECP256K1_VERIFICATION_KEY_2019, ECDSA_SECP256R1_VERIFICATION_KEY_2019,
    ED25519_VERIFICATION_KEY_2018, JwtError, MemoryResolver, ProofPurpose, Resolution, Signer,
    VerificationMethod, VerificationRelationship, WeightedCondition, bitcoin_address,
    cosmos_address, encoding::decode_base64url,
};
use dialog_jwt::{
    Claims, DidAuthenticator, Header, Issuer, JwtOptions, MultisigOptions, SELF_ISSUED_V2,
    VerifyOptions, create_jwt, create_multisignature_jwt, verify_jwt,
};
use pretty_assertions::assert_eq;
use testresult::TestResult;

const ALICE: &str = "did:example:alice";
const BOB: &str = "did:example:bob";
const MULTI: &str = "did:example:multi";

// ============================================================================
// Helpers
// ============================================================================

fn did(value: &str) -> Did {
    value.parse().expect("valid DID")
}

fn es256k(seed: u8) -> Es256KSigner {
    Es256KSigner::from_bytes(&[seed; 32]).expect("valid secp256k1 key")
}

fn signer(algorithm: Algorithm, seed: u8) -> SoftwareSigner {
    SoftwareSigner::new(algorithm, &[seed; 32]).expect("valid key")
}

fn secp256k1_method(controller: &str, fragment: &str, seed: u8) -> VerificationMethod {
    VerificationMethod::new(
        format!("{controller}#{fragment}"),
        ECDSA_SECP256K1_VERIFICATION_KEY_2019,
        controller,
    )
    .with_public_key_hex(hex::encode(es256k(seed).public_key(true)))
}

fn document(id: &str, methods: Vec<VerificationMethod>) -> DidDocument {
    DidDocument {
        id: id.to_string(),
        verification_method: Some(methods),
        ..Default::default()
    }
}

async fn issue(
    issuer: &str,
    algorithm: Algorithm,
    seed: u8,
    claims: Claims,
) -> Result<String, JwtError> {
    create_jwt(
        claims,
        &JwtOptions::new(issuer),
        &signer(algorithm, seed),
        Header::new(algorithm),
    )
    .await
}

// ============================================================================
// Round trips
// ============================================================================

#[test_log::test(tokio::test)]
async fn it_verifies_every_algorithm_against_a_document() -> TestResult {
    let ed25519 = Ed25519Signer::from_bytes(&[3u8; 32])?;
    let p256 = Es256Signer::from_bytes(&[4u8; 32])?;
    let recovery = VerificationMethod::new(
        format!("{ALICE}#eth"),
        ECDSA_SECP256K1_RECOVERY_METHOD_2020,
        ALICE,
    )
    .with_blockchain_account_id(format!("eip155:1:{}", es256k(5).ethereum_address()?));

    let resolver = MemoryResolver::new().with_document(
        did(ALICE),
        document(
            ALICE,
            vec![
                secp256k1_method(ALICE, "k1", 2),
                VerificationMethod::new(format!("{ALICE}#ed"), ED25519_VERIFICATION_KEY_2018, ALICE)
                    .with_public_key_hex(hex::encode(ed25519.public_key())),
                VerificationMethod::new(
                    format!("{ALICE}#p256"),
                    ECDSA_SECP256R1_VERIFICATION_KEY_2019,
                    ALICE,
                )
                .with_public_key_hex(hex::encode(p256.public_key(false))),
                recovery,
            ],
        ),
    );

    let cases = [
        (Algorithm::Es256K, 2, "k1"),
        (Algorithm::Es256KR, 5, "eth"),
        (Algorithm::EdDsa, 3, "ed"),
        (Algorithm::Ed25519, 3, "ed"),
        (Algorithm::Es256, 4, "p256"),
    ];

    for (algorithm, seed, fragment) in cases {
        let jwt = issue(ALICE, algorithm, seed, Claims::new().with("hello", "world")).await?;
        let verified = verify_jwt(&jwt, &VerifyOptions::new(), &resolver, &SoftwareVerifier).await?;

        assert!(verified.verified);
        assert_eq!(verified.signer.id, format!("{ALICE}#{fragment}"), "{algorithm}");
        assert_eq!(verified.claims.get_str("hello"), Some("world"));
        assert_eq!(verified.issuer, ALICE);
        assert_eq!(verified.jwt, jwt);
    }
    Ok(())
}

/// Signs ES256K-R without appending the recovery bit.
struct WithoutRecoveryBit(Es256KSigner);

impl Signer for WithoutRecoveryBit {
    async fn sign(&self, _: Algorithm, payload: &[u8]) -> Result<String, JwtError> {
        self.0.sign(payload)?.to_compact(false)
    }
}

#[test_log::test(tokio::test)]
async fn recoverable_tokens_match_accounts_without_a_recovery_bit() -> TestResult {
    let key = es256k(6);
    let compressed = key.public_key(true);
    let owner = VerificationMethod::new(format!("{ALICE}#owner"), ECDSA_SECP256K1_RECOVERY_METHOD_2020, ALICE)
        .with_ethereum_address(key.addresses()?.ethereum());
    let resolver = MemoryResolver::new().with_document(did(ALICE), document(ALICE, vec![owner]));

    let jwt = create_jwt(
        Claims::new().with("hello", "world"),
        &JwtOptions::new(ALICE),
        &WithoutRecoveryBit(es256k(6)),
        Header::new(Algorithm::Es256KR),
    )
    .await?;
    let signature = jwt.rsplit('.').next().unwrap_or_default();
    assert_eq!(decode_base64url(signature)?.len(), 64);

    let verified = verify_jwt(&jwt, &VerifyOptions::new(), &resolver, &SoftwareVerifier).await?;
    assert_eq!(verified.signer.id, format!("{ALICE}#owner"));

    for account in [
        format!("bip122:000000000019d6689c085ae165831e93:{}", bitcoin_address(&compressed, 0x00)),
        format!("cosmos:cosmoshub-4:{}", cosmos_address(&compressed, "cosmos")?),
    ] {
        let method = VerificationMethod::new(format!("{ALICE}#chain"), ECDSA_SECP256K1_RECOVERY_METHOD_2020, ALICE)
            .with_blockchain_account_id(account);
        let resolver = MemoryResolver::new().with_document(did(ALICE), document(ALICE, vec![method]));
        let verified = verify_jwt(&jwt, &VerifyOptions::new(), &resolver, &SoftwareVerifier).await?;
        assert_eq!(verified.signer.id, format!("{ALICE}#chain"));
    }
    Ok(())
}

#[test_log::test(tokio::test)]
async fn legacy_resolvers_return_bare_documents() -> TestResult {
    let resolver = MemoryResolver::new().with_resolution(
        did(ALICE),
        Resolution::Legacy(document(ALICE, vec![secp256k1_method(ALICE, "k1", 2)])),
    );

    let jwt = issue(ALICE, Algorithm::Es256K, 2, Claims::new()).await?;
    let verified = verify_jwt(&jwt, &VerifyOptions::new(), &resolver, &SoftwareVerifier).await?;
    assert_eq!(verified.signer.id, format!("{ALICE}#k1"));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn the_first_matching_key_is_reported() -> TestResult {
    let resolver = MemoryResolver::new().with_document(
        did(ALICE),
        document(
            ALICE,
            vec![
                secp256k1_method(ALICE, "other", 9),
                secp256k1_method(ALICE, "first", 2),
                secp256k1_method(ALICE, "second", 2),
            ],
        ),
    );

    let jwt = issue(ALICE, Algorithm::Es256K, 2, Claims::new()).await?;
    let verified = verify_jwt(&jwt, &VerifyOptions::new(), &resolver, &SoftwareVerifier).await?;
    assert_eq!(verified.signer.id, format!("{ALICE}#first"));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn did_url_issuers_must_use_the_named_key() -> TestResult {
    let resolver = MemoryResolver::new().with_document(
        did(ALICE),
        document(
            ALICE,
            vec![secp256k1_method(ALICE, "k1", 2), secp256k1_method(ALICE, "k2", 3)],
        ),
    );
    let issuer = format!("{ALICE}#k2");

    let jwt = issue(&issuer, Algorithm::Es256K, 3, Claims::new()).await?;
    let verified = verify_jwt(&jwt, &VerifyOptions::new(), &resolver, &SoftwareVerifier).await?;
    assert_eq!(verified.signer.id, issuer);

    let wrong_key = issue(&issuer, Algorithm::Es256K, 2, Claims::new()).await?;
    let result = verify_jwt(&wrong_key, &VerifyOptions::new(), &resolver, &SoftwareVerifier).await;
    assert!(matches!(result, Err(JwtError::InvalidSignature(_))));

    let unknown = issue(&format!("{ALICE}#k3"), Algorithm::Es256K, 2, Claims::new()).await?;
    let result = verify_jwt(&unknown, &VerifyOptions::new(), &resolver, &SoftwareVerifier).await;
    assert!(matches!(result, Err(JwtError::InvalidEnvelope(_))));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn pre_resolved_authenticators_skip_resolution() -> TestResult {
    let jwt = issue(ALICE, Algorithm::Es256K, 2, Claims::new()).await?;
    let options = VerifyOptions::new().with_authenticator(DidAuthenticator {
        authenticators: vec![secp256k1_method(ALICE, "k1", 2)],
        issuer: ALICE.to_string(),
        resolution: Default::default(),
    });

    let verified = verify_jwt(&jwt, &options, &MemoryResolver::new(), &SoftwareVerifier).await?;
    assert_eq!(verified.signer.id, format!("{ALICE}#k1"));
    Ok(())
}

// ============================================================================
// Rejections
// ============================================================================

#[test_log::test(tokio::test)]
async fn tampered_payloads_are_rejected() -> TestResult {
    let resolver = MemoryResolver::new()
        .with_document(did(ALICE), document(ALICE, vec![secp256k1_method(ALICE, "k1", 2)]));

    let jwt = issue(ALICE, Algorithm::Es256K, 2, Claims::new().with("amount", 1)).await?;
    let forged = issue(ALICE, Algorithm::Es256K, 2, Claims::new().with("amount", 1000)).await?;

    let segments: Vec<&str> = jwt.split('.').collect();
    let forged_payload = forged.split('.').nth(1).expect("three segments");
    let tampered = format!("{}.{}.{}", segments[0], forged_payload, segments[2]);

    let result = verify_jwt(&tampered, &VerifyOptions::new(), &resolver, &SoftwareVerifier).await;
    assert!(matches!(result, Err(JwtError::InvalidSignature(_))));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn malformed_tokens_are_rejected_before_resolution() {
    let resolver = MemoryResolver::new();
    for token in ["not.a.jwt", "only-one-segment"] {
        let result = verify_jwt(token, &VerifyOptions::new(), &resolver, &SoftwareVerifier).await;
        assert!(
            matches!(result, Err(JwtError::MalformedEnvelope(_))),
            "{token}: {result:?}"
        );
    }

    for token in ["a.b.c", "YQ.Yg.Yw"] {
        let result = verify_jwt(token, &VerifyOptions::new(), &resolver, &SoftwareVerifier).await;
        assert!(
            matches!(result, Err(JwtError::InvalidEnvelope(_))),
            "{token}: {result:?}"
        );
    }
}

#[test_log::test(tokio::test)]
async fn unknown_issuers_are_resolver_errors() -> TestResult {
    let jwt = issue(BOB, Algorithm::Es256K, 2, Claims::new()).await?;
    let result = verify_jwt(&jwt, &VerifyOptions::new(), &MemoryResolver::new(), &SoftwareVerifier)
        .await;
    assert!(matches!(result, Err(JwtError::Resolution(_))));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn documents_without_usable_keys_have_no_suitable_keys() -> TestResult {
    let resolver = MemoryResolver::new()
        .with_document(did(ALICE), document(ALICE, vec![secp256k1_method(ALICE, "k1", 2)]));

    let jwt = issue(ALICE, Algorithm::EdDsa, 2, Claims::new()).await?;
    let result = verify_jwt(&jwt, &VerifyOptions::new(), &resolver, &SoftwareVerifier).await;
    assert!(matches!(result, Err(JwtError::NoSuitableKeys(_))));
    Ok(())
}

// ============================================================================
// Policies
// ============================================================================

#[test_log::test(tokio::test)]
async fn expiry_is_checked_with_skew() -> TestResult {
    let resolver = MemoryResolver::new()
        .with_document(did(ALICE), document(ALICE, vec![secp256k1_method(ALICE, "k1", 2)]));
    let now = 1_700_000_000;

    let jwt = issue(
        ALICE,
        Algorithm::Es256K,
        2,
        Claims::new().with_issued_at(now - 1000).with_expiration(now - 300),
    )
    .await?;
    let result = verify_jwt(&jwt, &VerifyOptions::new().at(now), &resolver, &SoftwareVerifier).await;
    assert!(matches!(result, Err(JwtError::PolicyViolation(message)) if message.contains("expired")));

    let jwt = issue(
        ALICE,
        Algorithm::Es256K,
        2,
        Claims::new().with_issued_at(now - 1000).with_expiration(now - 299),
    )
    .await?;
    verify_jwt(&jwt, &VerifyOptions::new().at(now), &resolver, &SoftwareVerifier).await?;
    Ok(())
}

#[test_log::test(tokio::test)]
async fn audiences_must_match_the_verifier() -> TestResult {
    let resolver = MemoryResolver::new()
        .with_document(did(ALICE), document(ALICE, vec![secp256k1_method(ALICE, "k1", 2)]));
    let jwt = issue(ALICE, Algorithm::Es256K, 2, Claims::new().with_audience(BOB)).await?;

    let result = verify_jwt(&jwt, &VerifyOptions::new(), &resolver, &SoftwareVerifier).await;
    assert!(matches!(result, Err(JwtError::InvalidAudience(_))));

    let result = verify_jwt(
        &jwt,
        &VerifyOptions::new().with_audience("did:example:carol"),
        &resolver,
        &SoftwareVerifier,
    )
    .await;
    assert!(matches!(result, Err(JwtError::InvalidAudience(_))));

    verify_jwt(&jwt, &VerifyOptions::new().with_audience(BOB), &resolver, &SoftwareVerifier)
        .await?;
    Ok(())
}

#[test_log::test(tokio::test)]
async fn undeclared_relationships_fall_back_to_every_key() -> TestResult {
    let resolver = MemoryResolver::new()
        .with_document(did(ALICE), document(ALICE, vec![secp256k1_method(ALICE, "k1", 2)]));
    let jwt = issue(ALICE, Algorithm::Es256K, 2, Claims::new()).await?;

    let options = VerifyOptions::new().with_proof_purpose(ProofPurpose::AssertionMethod);
    let verified = verify_jwt(&jwt, &options, &resolver, &SoftwareVerifier).await?;
    assert_eq!(verified.signer.id, format!("{ALICE}#k1"));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn declared_relationships_restrict_the_keys() -> TestResult {
    let mut alice = document(
        ALICE,
        vec![secp256k1_method(ALICE, "k1", 2), secp256k1_method(ALICE, "k2", 3)],
    );
    alice.authentication = Some(vec![VerificationRelationship::Reference(format!("{ALICE}#k2"))]);
    let resolver = MemoryResolver::new().with_document(did(ALICE), alice);

    let jwt = issue(ALICE, Algorithm::Es256K, 2, Claims::new()).await?;
    let mut options = VerifyOptions::new();
    options.auth = Some(true);

    let result = verify_jwt(&jwt, &options, &resolver, &SoftwareVerifier).await;
    assert!(matches!(result, Err(JwtError::InvalidSignature(_))));

    let jwt = issue(ALICE, Algorithm::Es256K, 3, Claims::new()).await?;
    let verified = verify_jwt(&jwt, &options, &resolver, &SoftwareVerifier).await?;
    assert_eq!(verified.signer.id, format!("{ALICE}#k2"));
    Ok(())
}

// ============================================================================
// Self-issued tokens
// ============================================================================

#[test_log::test(tokio::test)]
async fn self_issued_tokens_are_verified_for_their_subject() -> TestResult {
    let resolver = MemoryResolver::new()
        .with_document(did(BOB), document(BOB, vec![secp256k1_method(BOB, "k1", 7)]));

    let jwt = issue(SELF_ISSUED_V2, Algorithm::Es256K, 7, Claims::new().with_subject(BOB)).await?;
    let verified = verify_jwt(&jwt, &VerifyOptions::new(), &resolver, &SoftwareVerifier).await?;
    assert_eq!(verified.issuer, BOB);
    assert_eq!(verified.claims.iss.as_deref(), Some(SELF_ISSUED_V2));
    Ok(())
}

// ============================================================================
// Nested and multi-signature tokens
// ============================================================================

#[test_log::test(tokio::test)]
async fn nested_tokens_must_keep_their_issuer() -> TestResult {
    let resolver = MemoryResolver::new()
        .with_document(did(ALICE), document(ALICE, vec![secp256k1_method(ALICE, "k1", 2)]))
        .with_document(did(BOB), document(BOB, vec![secp256k1_method(BOB, "k1", 3)]));

    let inner = issue(ALICE, Algorithm::Es256K, 2, Claims::new().with("secret", 1)).await?;
    let wrapped = create_jwt(
        Claims::new().with("jwt", inner.clone()),
        &JwtOptions::new(BOB),
        &signer(Algorithm::Es256K, 3),
        Header::new(Algorithm::Es256K).with_cty("JWT"),
    )
    .await?;

    let result = verify_jwt(&wrapped, &VerifyOptions::new(), &resolver, &SoftwareVerifier).await;
    assert!(matches!(result, Err(JwtError::InvalidEnvelope(message)) if message == "multiple issuers"));

    // The same wrapping under Alice's name unwinds to the inner claims.
    let rewrapped = create_jwt(
        Claims::new().with("jwt", inner),
        &JwtOptions::new(ALICE),
        &signer(Algorithm::Es256K, 3),
        Header::new(Algorithm::Es256K).with_cty("JWT"),
    )
    .await?;
    let verified = verify_jwt(&rewrapped, &VerifyOptions::new(), &resolver, &SoftwareVerifier).await?;
    assert_eq!(verified.signer.id, format!("{ALICE}#k1"));
    assert_eq!(verified.claims.get("secret"), Some(&serde_json::json!(1)));
    Ok(())
}

fn multisig_document(method: VerificationMethod) -> MemoryResolver {
    MemoryResolver::new().with_document(did(MULTI), document(MULTI, vec![method]))
}

async fn multisig(seeds: &[u8]) -> Result<String, JwtError> {
    let signers: Vec<SoftwareSigner> = seeds
        .iter()
        .map(|seed| signer(Algorithm::Es256KR, *seed))
        .collect();
    let issuers: Vec<Issuer<'_, SoftwareSigner>> = signers
        .iter()
        .map(|signer| Issuer::new(MULTI, signer, Algorithm::Es256KR))
        .collect();
    create_multisignature_jwt(
        Claims::new().with("payload", "multi"),
        &MultisigOptions::default(),
        &issuers,
    )
    .await
}

fn threshold_method(threshold: u64) -> VerificationMethod {
    let mut method = VerificationMethod::new(format!("{MULTI}#threshold"), CONDITIONAL_PROOF_2022, MULTI);
    method.threshold = Some(threshold);
    method.condition_threshold = Some(vec![
        secp256k1_method(MULTI, "a", 11),
        secp256k1_method(MULTI, "b", 12),
        secp256k1_method(MULTI, "c", 13),
    ]);
    method
}

#[test_log::test(tokio::test)]
async fn threshold_conditions_count_distinct_signers() -> TestResult {
    let resolver = multisig_document(threshold_method(2));

    let jwt = multisig(&[11, 13]).await?;
    let verified = verify_jwt(&jwt, &VerifyOptions::new(), &resolver, &SoftwareVerifier).await?;
    assert_eq!(verified.signer.id, format!("{MULTI}#threshold"));
    assert_eq!(verified.claims.get_str("payload"), Some("multi"));

    let jwt = multisig(&[11]).await?;
    let result = verify_jwt(&jwt, &VerifyOptions::new(), &resolver, &SoftwareVerifier).await;
    assert!(matches!(result, Err(JwtError::InvalidSignature(_))));

    let jwt = multisig(&[11, 11]).await?;
    let result = verify_jwt(&jwt, &VerifyOptions::new(), &resolver, &SoftwareVerifier).await;
    assert!(matches!(result, Err(JwtError::InvalidSignature(_))));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn max_depth_bounds_nested_signatures() -> TestResult {
    let resolver = multisig_document(threshold_method(2));
    let mut one = VerifyOptions::new();
    one.max_depth = Some(1);

    let two_layers = multisig(&[11, 13]).await?;
    verify_jwt(&two_layers, &one, &resolver, &SoftwareVerifier).await?;

    let three_layers = multisig(&[11, 12, 13]).await?;
    verify_jwt(&three_layers, &VerifyOptions::new(), &resolver, &SoftwareVerifier).await?;
    let result = verify_jwt(&three_layers, &one, &resolver, &SoftwareVerifier).await;
    assert!(matches!(result, Err(JwtError::InvalidEnvelope(_))), "{result:?}");

    let mut flat = VerifyOptions::new();
    flat.max_depth = Some(0);
    let result = verify_jwt(&two_layers, &flat, &resolver, &SoftwareVerifier).await;
    assert!(matches!(result, Err(JwtError::InvalidEnvelope(_))), "{result:?}");
    Ok(())
}

#[test_log::test(tokio::test)]
async fn weighted_conditions_sum_their_weights() -> TestResult {
    let mut method = VerificationMethod::new(format!("{MULTI}#weighted"), CONDITIONAL_PROOF_2022, MULTI);
    method.threshold = Some(3);
    method.condition_weighted_threshold = Some(vec![
        WeightedCondition {
            condition: secp256k1_method(MULTI, "heavy", 21),
            weight: 2,
        },
        WeightedCondition {
            condition: secp256k1_method(MULTI, "light", 22),
            weight: 1,
        },
        WeightedCondition {
            condition: secp256k1_method(MULTI, "other", 23),
            weight: 1,
        },
    ]);
    let resolver = multisig_document(method);

    let jwt = multisig(&[21, 22]).await?;
    verify_jwt(&jwt, &VerifyOptions::new(), &resolver, &SoftwareVerifier).await?;

    let jwt = multisig(&[22, 23]).await?;
    let result = verify_jwt(&jwt, &VerifyOptions::new(), &resolver, &SoftwareVerifier).await;
    assert!(matches!(result, Err(JwtError::InvalidSignature(_))));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn and_or_conditions_nest() -> TestResult {
    let mut inner = VerificationMethod::new(format!("{MULTI}#both"), CONDITIONAL_PROOF_2022, MULTI);
    inner.condition_and = Some(vec![
        secp256k1_method(MULTI, "a", 31),
        secp256k1_method(MULTI, "b", 32),
    ]);
    let mut outer = VerificationMethod::new(format!("{MULTI}#either"), CONDITIONAL_PROOF_2022, MULTI);
    outer.condition_or = Some(vec![inner, secp256k1_method(MULTI, "c", 33)]);
    let resolver = multisig_document(outer);

    let both = multisig(&[31, 32]).await?;
    let verified = verify_jwt(&both, &VerifyOptions::new(), &resolver, &SoftwareVerifier).await?;
    assert_eq!(verified.signer.id, format!("{MULTI}#either"));

    let alone = multisig(&[33]).await?;
    verify_jwt(&alone, &VerifyOptions::new(), &resolver, &SoftwareVerifier).await?;

    let half = multisig(&[31]).await?;
    let result = verify_jwt(&half, &VerifyOptions::new(), &resolver, &SoftwareVerifier).await;
    assert!(matches!(result, Err(JwtError::InvalidSignature(_))));

    let mut shallow = VerifyOptions::new();
    shallow.max_depth = Some(0);
    let result = verify_jwt(&both, &shallow, &resolver, &SoftwareVerifier).await;
    assert!(matches!(result, Err(JwtError::InvalidEnvelope(_))));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn delegated_conditions_follow_another_document() -> TestResult {
    let mut method = VerificationMethod::new(format!("{MULTI}#delegate"), CONDITIONAL_PROOF_2022, MULTI);
    method.condition_delegated = Some(format!("{BOB}#k1"));
    let resolver = multisig_document(method)
        .with_document(did(BOB), document(BOB, vec![secp256k1_method(BOB, "k1", 41)]));

    let jwt = multisig(&[41]).await?;
    let verified = verify_jwt(&jwt, &VerifyOptions::new(), &resolver, &SoftwareVerifier).await?;
    assert_eq!(verified.signer.id, format!("{MULTI}#delegate"));

    let jwt = multisig(&[42]).await?;
    let result = verify_jwt(&jwt, &VerifyOptions::new(), &resolver, &SoftwareVerifier).await;
    assert!(matches!(result, Err(JwtError::InvalidSignature(_))));
    Ok(())
}
