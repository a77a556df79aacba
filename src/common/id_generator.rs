// src/common/id_generator.rs
//! Crockford Base32 ID Generator
//!
//! User ids look like `U_K7NP3XY2M4QW8R6T`: a prefix plus sixteen
//! Crockford Base32 characters (80 random bits). The alphabet excludes
//! I, L, O and U so ids survive being read aloud or retyped.

use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

const USER_PREFIX: &str = "U";
const USER_ID_LENGTH: usize = 16;

/// Generate a random Crockford Base32 string of specified length
fn generate_crockford_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..32);
            CROCKFORD_ALPHABET[idx] as char
        })
        .collect()
}

/// Generate a User ID (U_XXXXXXXXXXXXXXXX)
pub fn generate_user_id() -> String {
    format!(
        "{}_{}",
        USER_PREFIX,
        generate_crockford_string(USER_ID_LENGTH)
    )
}
