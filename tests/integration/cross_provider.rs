//! Integration test: keys and signatures from an independent engine.
//!
//! The fixtures under `tests/fixtures/` were produced by a different
//! crypto library. Every key must decode to its raw layout and re-encode
//! to byte-identical DER, and every signature must survive DER → R‖S → DER
//! and verify against the bundled P-384 engine and the `p384` crate.
//! Ed25519 keys are cross-checked against `ed25519-dalek` directly.

use crypto_facade::keys::ec::{EcPrivateKeyMarshaler, EcPublicKeyMarshaler};
use crypto_facade::keys::rsa::{RsaPrivateKeyMarshaler, RsaPublicKeyMarshaler};
use crypto_facade::provider::{Ed25519Provider, P384Provider};
use crypto_facade::{
    der_to_fixed, fixed_to_der, identify_pem, marshaler_for, pem_to_der, Curve, KeyAlgorithm,
    KeyEncoding, KeyKind, KeyMarshaler, KeyMaterial, SignatureEncoding, SignatureFacade,
};

const MESSAGE: &[u8] = b"cross-provider message";

struct CurveFixture {
    curve: Curve,
    private_pem: &'static str,
    public_pem: &'static str,
    signature_der: &'static [u8],
}

fn curve_fixtures() -> [CurveFixture; 4] {
    [
        CurveFixture {
            curve: Curve::P256,
            private_pem: include_str!("../fixtures/p256_private.pem"),
            public_pem: include_str!("../fixtures/p256_public.pem"),
            signature_der: include_bytes!("../fixtures/p256_signature.der"),
        },
        CurveFixture {
            curve: Curve::P256k,
            private_pem: include_str!("../fixtures/p256k_private.pem"),
            public_pem: include_str!("../fixtures/p256k_public.pem"),
            signature_der: include_bytes!("../fixtures/p256k_signature.der"),
        },
        CurveFixture {
            curve: Curve::P384,
            private_pem: include_str!("../fixtures/p384_private.pem"),
            public_pem: include_str!("../fixtures/p384_public.pem"),
            signature_der: include_bytes!("../fixtures/p384_signature.der"),
        },
        CurveFixture {
            curve: Curve::P521,
            private_pem: include_str!("../fixtures/p521_private.pem"),
            public_pem: include_str!("../fixtures/p521_public.pem"),
            signature_der: include_bytes!("../fixtures/p521_signature.der"),
        },
    ]
}

const RSA_PRIVATE_PEM: &str = include_str!("../fixtures/rsa4096_private.pem");
const RSA_PUBLIC_PEM: &str = include_str!("../fixtures/rsa4096_public.pem");

#[test]
fn ec_private_keys_reencode_byte_identical() {
    for fx in curve_fixtures() {
        let marshaler = EcPrivateKeyMarshaler::new(fx.curve);
        let der = pem_to_der(fx.private_pem).unwrap();
        let parts = marshaler.der_to_parts(&der).unwrap();
        assert_eq!(parts.d.len(), fx.curve.field_width(), "{}", fx.curve);

        let point = parts.public_point.as_deref();
        assert!(point.is_some(), "{} fixture carries its public point", fx.curve);
        let rebuilt = marshaler.parts_to_der(&parts.d, point).unwrap();
        assert_eq!(rebuilt, der, "{}", fx.curve);

        // The raw-only path drops [1] but keeps the scalar.
        let raw = marshaler.pem_to_raw(fx.private_pem).unwrap();
        assert_eq!(raw, parts.d);
    }
}

#[test]
fn ec_public_keys_reencode_byte_identical() {
    for fx in curve_fixtures() {
        let marshaler = EcPublicKeyMarshaler::new(fx.curve);
        let der = pem_to_der(fx.public_pem).unwrap();
        let raw = marshaler.der_to_raw(&der).unwrap();
        assert_eq!(raw.len(), fx.curve.point_width());
        assert_eq!(raw[0], 0x04);
        assert_eq!(marshaler.raw_to_der(&raw).unwrap(), der, "{}", fx.curve);
    }
}

#[test]
fn ec_private_point_matches_public_key() {
    for fx in curve_fixtures() {
        let der = pem_to_der(fx.private_pem).unwrap();
        let parts = EcPrivateKeyMarshaler::new(fx.curve).der_to_parts(&der).unwrap();
        let public = EcPublicKeyMarshaler::new(fx.curve).pem_to_raw(fx.public_pem).unwrap();
        assert_eq!(parts.public_point, Some(public), "{}", fx.curve);
    }
}

#[test]
fn rsa_keys_reencode_byte_identical() {
    let private_der = pem_to_der(RSA_PRIVATE_PEM).unwrap();
    let private_raw = RsaPrivateKeyMarshaler.der_to_raw(&private_der).unwrap();
    assert_eq!(private_raw.len(), 2308);
    assert_eq!(RsaPrivateKeyMarshaler.raw_to_der(&private_raw).unwrap(), private_der);

    let public_der = pem_to_der(RSA_PUBLIC_PEM).unwrap();
    let public_raw = RsaPublicKeyMarshaler.der_to_raw(&public_der).unwrap();
    assert_eq!(public_raw.len(), 516);
    assert_eq!(RsaPublicKeyMarshaler.raw_to_der(&public_raw).unwrap(), public_der);

    assert_eq!(
        RsaPrivateKeyMarshaler.public_from_private(&private_raw).unwrap(),
        public_raw
    );
}

#[test]
fn fixtures_are_identified() {
    let (label, algorithm, kind) = identify_pem(RSA_PRIVATE_PEM).unwrap();
    assert_eq!(label, "RSA PRIVATE KEY");
    assert_eq!((algorithm, kind), (KeyAlgorithm::Rsa4096, KeyKind::Private));

    for fx in curve_fixtures() {
        let (_, algorithm, kind) = identify_pem(fx.private_pem).unwrap();
        assert_eq!((algorithm, kind), (KeyAlgorithm::Ec(fx.curve), KeyKind::Private));
        let (_, algorithm, kind) = identify_pem(fx.public_pem).unwrap();
        assert_eq!((algorithm, kind), (KeyAlgorithm::Ec(fx.curve), KeyKind::Public));
    }
}

#[test]
fn fixture_signatures_roundtrip_canonically() {
    for fx in curve_fixtures() {
        let width = fx.curve.field_width();
        let fixed = der_to_fixed(fx.signature_der, None).unwrap();
        assert_eq!(fixed.len(), 2 * width, "{}", fx.curve);
        assert_eq!(der_to_fixed(fx.signature_der, Some(width)).unwrap(), fixed);
        assert_eq!(fixed_to_der(&fixed).unwrap(), fx.signature_der, "{}", fx.curve);
    }
}

#[test]
fn p384_fixture_signature_verifies_through_facade() {
    let fixtures = curve_fixtures();
    let fx = &fixtures[2];
    assert_eq!(fx.curve, Curve::P384);
    let facade = SignatureFacade::new(Box::new(P384Provider));
    let public = KeyMaterial::Pem(fx.public_pem.to_string());

    assert!(facade
        .verify(&public, MESSAGE, fx.signature_der, SignatureEncoding::Der)
        .unwrap());
    let fixed = der_to_fixed(fx.signature_der, Some(48)).unwrap();
    assert!(facade
        .verify(&public, MESSAGE, &fixed, SignatureEncoding::Raw)
        .unwrap());
    assert!(!facade
        .verify(&public, b"another message", fx.signature_der, SignatureEncoding::Der)
        .unwrap());
}

#[test]
fn p384_fixture_private_key_signs_for_p384_crate() {
    use p384::ecdsa::signature::Verifier;

    let fixtures = curve_fixtures();
    let fx = &fixtures[2];
    let facade = SignatureFacade::new(Box::new(P384Provider));
    let private = KeyMaterial::Pem(fx.private_pem.to_string());
    let fixed = facade.sign(&private, MESSAGE, SignatureEncoding::Raw).unwrap();

    let public_raw = EcPublicKeyMarshaler::new(Curve::P384)
        .pem_to_raw(fx.public_pem)
        .unwrap();
    let key = p384::ecdsa::VerifyingKey::from_sec1_bytes(&public_raw).unwrap();
    let signature = p384::ecdsa::Signature::from_slice(&fixed).unwrap();
    assert!(key.verify(MESSAGE, &signature).is_ok());
}

#[test]
fn p384_crate_reads_our_der() {
    use p384::elliptic_curve::sec1::ToEncodedPoint;
    use p384::pkcs8::DecodePublicKey;

    let secret = p384::SecretKey::random(&mut rand::rngs::OsRng);
    let d = secret.to_bytes().to_vec();
    let point = secret.public_key().to_encoded_point(false).as_bytes().to_vec();

    let sec1 = EcPrivateKeyMarshaler::new(Curve::P384)
        .parts_to_der(&d, Some(&point))
        .unwrap();
    let parsed = p384::SecretKey::from_sec1_der(&sec1).unwrap();
    assert_eq!(parsed.to_bytes(), secret.to_bytes());

    let spki = EcPublicKeyMarshaler::new(Curve::P384).raw_to_der(&point).unwrap();
    let public = p384::PublicKey::from_public_key_der(&spki).unwrap();
    assert_eq!(public, secret.public_key());
}

#[test]
fn generated_keys_move_between_encodings() {
    let facade = SignatureFacade::new(Box::new(Ed25519Provider));
    let pair = facade.generate(KeyEncoding::Raw).unwrap();
    let private = marshaler_for(KeyAlgorithm::Ed25519, KeyKind::Private);
    let public = marshaler_for(KeyAlgorithm::Ed25519, KeyKind::Public);

    let private_pem = pair.private.convert(&*private, KeyEncoding::Pem).unwrap();
    let public_der = pair.public.convert(&*public, KeyEncoding::Der).unwrap();

    let signature = facade.sign(&private_pem, MESSAGE, SignatureEncoding::Raw).unwrap();
    assert!(facade
        .verify(&public_der, MESSAGE, &signature, SignatureEncoding::Raw)
        .unwrap());
    assert!(facade
        .verify(&pair.public, MESSAGE, &signature, SignatureEncoding::Raw)
        .unwrap());
}

#[test]
fn ed25519_dalek_signature_verifies_through_facade() {
    use ed25519_dalek::Signer;

    let key = ed25519_dalek::SigningKey::from_bytes(&[9u8; 32]);
    let signature = key.sign(MESSAGE).to_bytes();

    let public = marshaler_for(KeyAlgorithm::Ed25519, KeyKind::Public)
        .raw_to_pem(key.verifying_key().as_bytes())
        .unwrap();
    let facade = SignatureFacade::new(Box::new(Ed25519Provider));
    assert!(facade
        .verify(&KeyMaterial::Pem(public), MESSAGE, &signature, SignatureEncoding::Raw)
        .unwrap());

    // And the other way round, from a PKCS#8 private key.
    let private = marshaler_for(KeyAlgorithm::Ed25519, KeyKind::Private)
        .raw_to_der(key.as_bytes())
        .unwrap();
    let ours = facade
        .sign(&KeyMaterial::Der(private), MESSAGE, SignatureEncoding::Raw)
        .unwrap();
    assert_eq!(ours, signature.to_vec());
}
