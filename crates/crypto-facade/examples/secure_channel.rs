//! Secure Channel: agree on a key, stream-encrypt a payload, sign it.
//!
//! Run with:
//!   cargo run --example secure_channel -p crypto-facade

use crypto_facade::provider::{Aes256CbcProvider, P384Provider};
use crypto_facade::{
    der_to_fixed, CipherFacade, KeyAgreementFacade, KeyEncoding, SignatureEncoding,
    SignatureFacade,
};

fn main() {
    // ── 1. Both parties generate P-384 key-agreement pairs ──────────────────
    //
    // Keys come back in the requested encoding; here PEM, so they could be
    // written straight to disk or handed to another library.
    let agreement = KeyAgreementFacade::new(Box::new(P384Provider));
    let alice = agreement
        .generate(KeyEncoding::Pem)
        .expect("alice key generation");
    let bob = agreement
        .generate(KeyEncoding::Pem)
        .expect("bob key generation");
    if let crypto_facade::KeyMaterial::Pem(text) = &alice.public {
        println!("Alice public key:\n{text}");
    }

    // ── 2. Derive matching AES-256-CBC key and IV on both sides ─────────────
    let cipher = CipherFacade::new(Box::new(Aes256CbcProvider));
    let (key_len, iv_len) = (cipher.key_len(), cipher.iv_len());
    let sender = agreement
        .derive_symmetric(&alice.private, &bob.public, b"demo salt", b"channel v1", key_len, iv_len)
        .expect("alice derives");
    let receiver = agreement
        .derive_symmetric(&bob.private, &alice.public, b"demo salt", b"channel v1", key_len, iv_len)
        .expect("bob derives");
    assert_eq!(sender, receiver);
    println!("Shared material derived: {sender:?}");

    // ── 3. Stream the payload through the cipher ────────────────────────────
    //
    // Chunks need not be block aligned; the adapter buffers partial blocks
    // and pads on finalize.
    let payload = b"The quick brown fox jumps over the lazy dog. ".repeat(20);
    let mut encryptor = cipher
        .encryptor(&sender.key, &sender.iv)
        .expect("encryptor");
    let mut sealed = Vec::new();
    for chunk in payload.chunks(100) {
        sealed.extend(encryptor.update(chunk).expect("update"));
    }
    sealed.extend(encryptor.finalize(true).expect("finalize"));
    println!("Encrypted {} bytes into {} bytes", payload.len(), sealed.len());

    // ── 4. Sign the ciphertext, DER for interop and R || S for compactness ──
    let signer = SignatureFacade::new(Box::new(P384Provider));
    let signing_pair = signer.generate(KeyEncoding::Der).expect("signing key");
    let der = signer
        .sign(&signing_pair.private, &sealed, SignatureEncoding::Der)
        .expect("sign");
    let fixed = der_to_fixed(&der, Some(48)).expect("fixed-width signature");
    println!("Signature: {} bytes DER, {} bytes R || S", der.len(), fixed.len());

    // ── 5. Receiver verifies and decrypts ───────────────────────────────────
    let valid = signer
        .verify(&signing_pair.public, &sealed, &fixed, SignatureEncoding::Raw)
        .expect("verify");
    println!("Signature valid: {valid}");

    let opened = cipher.decrypt_with(&receiver, &sealed).expect("decrypt");
    assert_eq!(opened, payload);
    println!("Decrypted payload matches");
}
