//! Integration test: full end-to-end workflow.
//!
//! Exercises the facades together:
//! 1. Two parties generate key-agreement pairs
//! 2. Both sides derive the same key ‖ IV through HKDF
//! 3. A message is streamed through the AES-256-CBC engine in chunks
//! 4. The sender signs the ciphertext, the receiver verifies then decrypts

use crypto_facade::kdf::derive_key_iv;
use crypto_facade::provider::{Aes256CbcProvider, Ed25519Provider, P384Provider, X25519Provider};
use crypto_facade::{
    der_to_fixed, hkdf, pbkdf2, Capability, CipherFacade, FacadeError, HmacSha256, HmacSha384,
    KeyAgreementFacade, KeyEncoding, SignatureEncoding, SignatureFacade, StreamState,
};

const SALT: &[u8] = b"workflow salt";
const INFO: &[u8] = b"workflow v1";

fn message() -> Vec<u8> {
    (0..10_000u32).map(|i| (i * 31 % 251) as u8).collect()
}

#[test]
fn full_workflow_agree_encrypt_sign_verify_decrypt() {
    // ── Step 1: Key agreement ───────────────────────────────────────────
    let agreement = KeyAgreementFacade::try_from(Capability::KeyExchange(Box::new(P384Provider)))
        .expect("P-384 offers key exchange");
    let alice = agreement.generate(KeyEncoding::Pem).expect("generate alice");
    let bob = agreement.generate(KeyEncoding::Der).expect("generate bob");

    let cipher = CipherFacade::try_from(Capability::Symmetric(Box::new(Aes256CbcProvider)))
        .expect("AES offers a symmetric cipher");
    let sender = agreement
        .derive_symmetric(&alice.private, &bob.public, SALT, INFO, cipher.key_len(), cipher.iv_len())
        .expect("alice derives");
    let receiver = agreement
        .derive_symmetric(&bob.private, &alice.public, SALT, INFO, cipher.key_len(), cipher.iv_len())
        .expect("bob derives");
    assert_eq!(sender, receiver, "both sides must derive the same material");

    // ── Step 2: Stream the plaintext in uneven chunks ───────────────────
    let plaintext = message();
    let mut encryptor = cipher
        .encryptor(&sender.key, &sender.iv)
        .expect("build encryptor");
    let mut ciphertext = Vec::new();
    for chunk in plaintext.chunks(777) {
        ciphertext.extend(encryptor.update(chunk).expect("update"));
    }
    ciphertext.extend(encryptor.finalize(true).expect("finalize"));
    assert_eq!(encryptor.state(), StreamState::Finalized);
    assert_eq!(ciphertext.len(), (plaintext.len() / 16 + 1) * 16);
    assert_eq!(
        ciphertext,
        cipher.encrypt_with(&sender, &plaintext).expect("one-shot encrypt")
    );

    // ── Step 3: Sign the ciphertext ─────────────────────────────────────
    let signer = SignatureFacade::try_from(Capability::Sign(Box::new(P384Provider)))
        .expect("P-384 offers signing");
    let signing_pair = signer.generate(KeyEncoding::Pem).expect("generate signing pair");
    let signature = signer
        .sign(&signing_pair.private, &ciphertext, SignatureEncoding::Der)
        .expect("sign");
    assert_eq!(der_to_fixed(&signature, Some(48)).expect("fixed").len(), 96);

    // ── Step 4: Verify then decrypt ─────────────────────────────────────
    assert!(signer
        .verify(&signing_pair.public, &ciphertext, &signature, SignatureEncoding::Der)
        .expect("verify"));

    let mut decryptor = cipher
        .decryptor(&receiver.key, &receiver.iv)
        .expect("build decryptor");
    let mut recovered = Vec::new();
    for chunk in ciphertext.chunks(1000) {
        recovered.extend(decryptor.update(chunk).expect("update"));
    }
    recovered.extend(decryptor.finalize(true).expect("finalize"));
    assert_eq!(recovered, plaintext);
}

#[test]
fn full_workflow_x25519_with_sha384_expansion() {
    let agreement = KeyAgreementFacade::with_hash(Box::new(X25519Provider), Box::new(HmacSha384));
    let alice = agreement.generate(KeyEncoding::Raw).expect("alice");
    let bob = agreement.generate(KeyEncoding::Raw).expect("bob");

    let shared = agreement
        .shared_secret(&alice.private, &bob.public)
        .expect("shared secret");
    let material = agreement
        .derive_symmetric(&bob.private, &alice.public, SALT, INFO, 32, 16)
        .expect("derive");

    // The facade is HKDF over the shared secret with the configured hash.
    let expected = derive_key_iv(&HmacSha384, &shared, SALT, INFO, 32, 16).expect("expected");
    assert_eq!(material, expected);
    let okm = hkdf(&HmacSha384, &shared, 48, SALT, INFO).expect("hkdf");
    assert_eq!(material.key, okm[..32]);
    assert_eq!(material.iv, okm[32..]);

    // Raw-only keys refuse other encodings.
    assert!(matches!(
        agreement.generate(KeyEncoding::Pem),
        Err(FacadeError::UnsupportedAlgorithm(_))
    ));
}

#[test]
fn full_workflow_password_encrypted_payload() {
    let cipher = CipherFacade::new(Box::new(Aes256CbcProvider));
    let okm = pbkdf2(&HmacSha256, b"correct horse", 48, 1_000, b"per-file salt").expect("pbkdf2");
    let (key, iv) = okm.split_at(32);

    let sealed = cipher.encrypt(key, iv, b"attack at dawn").expect("encrypt");
    assert_eq!(cipher.decrypt(key, iv, &sealed).expect("decrypt"), b"attack at dawn");

    let wrong = pbkdf2(&HmacSha256, b"wrong horse", 48, 1_000, b"per-file salt").expect("pbkdf2");
    match cipher.decrypt(&wrong[..32], &wrong[32..], &sealed) {
        Ok(plain) => assert_ne!(plain, b"attack at dawn"),
        Err(e) => assert!(matches!(e, FacadeError::InvalidPadding)),
    }
}

#[test]
fn full_workflow_ed25519_signatures_are_raw_only() {
    let signer = SignatureFacade::new(Box::new(Ed25519Provider));
    let pair = signer.generate(KeyEncoding::Der).expect("generate");

    let signature = signer
        .sign(&pair.private, b"payload", SignatureEncoding::Raw)
        .expect("sign");
    assert_eq!(signature.len(), 64);
    assert!(signer
        .verify(&pair.public, b"payload", &signature, SignatureEncoding::Raw)
        .expect("verify"));
    assert!(!signer
        .verify(&pair.public, b"payloaD", &signature, SignatureEncoding::Raw)
        .expect("verify"));

    assert!(matches!(
        signer.sign(&pair.private, b"payload", SignatureEncoding::Der),
        Err(FacadeError::UnsupportedAlgorithm(_))
    ));
}

#[test]
fn full_workflow_capability_mismatch_is_rejected() {
    let result = CipherFacade::try_from(Capability::Sign(Box::new(Ed25519Provider)));
    assert!(matches!(result, Err(FacadeError::UnsupportedAlgorithm(_))));

    let result = SignatureFacade::try_from(Capability::KeyExchange(Box::new(X25519Provider)));
    assert!(matches!(result, Err(FacadeError::UnsupportedAlgorithm(_))));
}
