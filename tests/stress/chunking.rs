//! Stress test: streaming output must not depend on how input is chunked,
//! and independent streams must not interfere across threads.

use std::sync::Arc;
use std::thread;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crypto_facade::provider::Aes256CbcProvider;
use crypto_facade::{hkdf, CipherFacade, FacadeError, HmacSha256, StreamState};

const KEY: [u8; 32] = [0x42; 32];
const IV: [u8; 16] = [0x24; 16];

fn random_chunks(rng: &mut StdRng, data: &[u8]) -> Vec<Vec<u8>> {
    let mut chunks = Vec::new();
    let mut rest = data;
    while !rest.is_empty() {
        // Empty chunks are legal and must be no-ops.
        let take = rng.gen_range(0..=rest.len().min(67));
        let (head, tail) = rest.split_at(take);
        chunks.push(head.to_vec());
        rest = tail;
    }
    chunks
}

#[test]
fn stress_random_chunkings_encrypt_identically() {
    let cipher = CipherFacade::new(Box::new(Aes256CbcProvider));
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for len in [0usize, 1, 15, 16, 17, 255, 256, 4097] {
        let plaintext: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
        let expected = cipher.encrypt(&KEY, &IV, &plaintext).expect("one-shot encrypt");
        assert_eq!(expected.len(), (len / 16 + 1) * 16);

        for round in 0..25 {
            let mut stream = cipher.encryptor(&KEY, &IV).expect("encryptor");
            let mut out = Vec::new();
            for chunk in random_chunks(&mut rng, &plaintext) {
                out.extend(stream.update(&chunk).expect("update"));
            }
            out.extend(stream.finalize(true).expect("finalize"));
            assert_eq!(out, expected, "length {len}, round {round}");
            assert_eq!(stream.bytes_in(), len as u64);
            assert_eq!(stream.bytes_out(), expected.len() as u64);
        }
    }
}

#[test]
fn stress_random_chunkings_decrypt_identically() {
    let cipher = CipherFacade::new(Box::new(Aes256CbcProvider));
    let mut rng = StdRng::seed_from_u64(0xdec0de);
    let plaintext: Vec<u8> = (0..3000).map(|_| rng.gen()).collect();
    let ciphertext = cipher.encrypt(&KEY, &IV, &plaintext).expect("encrypt");

    for round in 0..50 {
        let mut stream = cipher.decryptor(&KEY, &IV).expect("decryptor");
        let mut out = Vec::new();
        for chunk in random_chunks(&mut rng, &ciphertext) {
            out.extend(stream.update(&chunk).expect("update"));
            // The final block is always held back until finalize.
            assert!(out.len() + 16 <= ciphertext.len(), "round {round}");
        }
        out.extend(stream.finalize(true).expect("finalize"));
        assert_eq!(out, plaintext, "round {round}");
    }
}

#[test]
fn stress_unpadded_stream_rejects_every_partial_tail() {
    let cipher = CipherFacade::new(Box::new(Aes256CbcProvider));
    for tail in 1..16usize {
        let mut stream = cipher.encryptor(&KEY, &IV).expect("encryptor");
        stream.update(&vec![7u8; 32 + tail]).expect("update");
        match stream.finalize(false) {
            Err(FacadeError::IncompleteBlock { remainder }) => assert_eq!(remainder, tail),
            other => panic!("tail {tail}: expected IncompleteBlock, got {other:?}"),
        }
        assert_eq!(stream.state(), StreamState::Finalized);
    }
}

#[test]
fn stress_concurrent_independent_streams() {
    let cipher = Arc::new(CipherFacade::new(Box::new(Aes256CbcProvider)));
    let mut handles = Vec::new();

    for worker in 0..8u64 {
        let cipher = Arc::clone(&cipher);
        handles.push(thread::spawn(move || {
            let material = hkdf(&HmacSha256, &worker.to_be_bytes(), 48, b"stress", b"worker")
                .expect("hkdf");
            let (key, iv) = material.split_at(32);
            let mut rng = StdRng::seed_from_u64(worker);

            for message in 0..40 {
                let plaintext: Vec<u8> = (0..rng.gen_range(0..2000)).map(|_| rng.gen()).collect();
                let mut encryptor = cipher.encryptor(key, iv).expect("encryptor");
                let mut sealed = Vec::new();
                for chunk in random_chunks(&mut rng, &plaintext) {
                    sealed.extend(encryptor.update(&chunk).expect("update"));
                }
                sealed.extend(encryptor.finalize(true).expect("finalize"));

                let opened = cipher.decrypt(key, iv, &sealed).expect("decrypt");
                assert_eq!(opened, plaintext, "worker {worker}, message {message}");
            }
        }));
    }

    for handle in handles {
        handle.join().expect("worker thread panicked");
    }
}
