//! Binary and textual encodings shared by every provider.
//!
//! - `bignum`: unsigned big numbers with ASN.1 sign guards
//! - `asn1`: DER tag-length-value encoding and decoding
//! - `pem`: Base64 text framing over DER

pub mod asn1;
pub mod bignum;
pub mod pem;

pub use asn1::{oid_to_dotted, DerReader};
pub use bignum::{decode_big_number, encode_big_number};
pub use pem::{der_to_pem, is_valid_label, pem_to_der, pem_to_der_labeled};
