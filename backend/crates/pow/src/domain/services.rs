//! Domain Services
//!
//! Hashcash stamp minting and verification over SHA-256.
//!
//! Stamp layout: `1:<bits>:<YYMMDDhhmmss>:<resource>:<ext>:<salt>:<counter>`,
//! where the counter is lowercase hex. The stamp is valid when the SHA-256
//! digest of the whole string starts with at least `bits` zero bits.

use chrono::{DateTime, Utc};
use platform::crypto::{CryptoError, sha256, to_base64, try_random_bytes};
use std::fmt::Write;

const STAMP_VERSION: &str = "1";
const STAMP_SEPARATOR: char = ':';
const STAMP_FIELDS: usize = 7;
const STAMP_DATE_FORMAT: &str = "%y%m%d%H%M%S";

/// Upper bound on meaningful difficulty for a 256-bit digest
pub const MAX_STAMP_BITS: u32 = 256;

/// Count leading zero bits in a digest
pub fn count_leading_zero_bits(hash: &[u8]) -> u32 {
    let mut count = 0u32;
    for &byte in hash {
        if byte == 0 {
            count += 8;
        } else {
            count += byte.leading_zeros();
            break;
        }
    }
    count
}

/// Verify that a hash meets the difficulty requirement
pub fn verify_difficulty(hash: &[u8], difficulty_bits: u32) -> bool {
    count_leading_zero_bits(hash) >= difficulty_bits
}

/// Mint a stamp over `resource` with at least `bits` leading zero bits
///
/// CPU-bound; expected work doubles with every extra bit. `bits` above
/// [`MAX_STAMP_BITS`] is clamped.
pub fn mint_stamp(
    resource: &str,
    bits: u32,
    salt_len: usize,
    now: DateTime<Utc>,
) -> Result<String, CryptoError> {
    let bits = bits.min(MAX_STAMP_BITS);
    let salt = generate_salt(salt_len)?;
    let prefix = format!(
        "{STAMP_VERSION}:{bits}:{}:{resource}::{salt}:",
        now.format(STAMP_DATE_FORMAT)
    );

    let mut candidate = String::with_capacity(prefix.len() + 16);
    let mut counter: u64 = 0;
    loop {
        candidate.clear();
        candidate.push_str(&prefix);
        // Writing into a String cannot fail
        let _ = write!(candidate, "{counter:x}");
        if verify_difficulty(&sha256(candidate.as_bytes()), bits) {
            return Ok(candidate);
        }
        counter = counter.wrapping_add(1);
    }
}

/// Check a stamp against the required bit length
///
/// Rejects stamps that are malformed or claim fewer bits than required,
/// then verifies the digest itself.
pub fn check_stamp(stamp: &str, required_bits: u32) -> bool {
    let fields: Vec<&str> = stamp.split(STAMP_SEPARATOR).collect();
    if fields.len() != STAMP_FIELDS || fields[0] != STAMP_VERSION {
        return false;
    }
    match fields[1].parse::<u32>() {
        Ok(claimed) if claimed >= required_bits => {}
        _ => return false,
    }
    let counter = fields[6];
    if counter.is_empty() || u64::from_str_radix(counter, 16).is_err() {
        return false;
    }
    verify_difficulty(&sha256(stamp.as_bytes()), required_bits)
}

/// Resource field of a well-formed stamp
pub fn stamp_resource(stamp: &str) -> Option<&str> {
    let fields: Vec<&str> = stamp.split(STAMP_SEPARATOR).collect();
    if fields.len() == STAMP_FIELDS {
        Some(fields[3])
    } else {
        None
    }
}

fn generate_salt(len: usize) -> Result<String, CryptoError> {
    let mut salt = to_base64(&try_random_bytes(len)?);
    salt.truncate(len);
    Ok(salt)
}
