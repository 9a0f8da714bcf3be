use anyhow::{Result, bail};
use rand::{TryRngCore, rngs::OsRng};

pub const TOKEN_LENGTH: usize = 16;

const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

// Largest multiple of the alphabet size that fits in a byte. Bytes at or above
// it are discarded so every symbol is equally likely.
const ACCEPT_BELOW: u8 = (256 / ALPHABET.len() * ALPHABET.len()) as u8;

/// Generates a random alphanumeric token of exactly `length` characters from
/// the operating system's entropy source.
///
/// Fails if the entropy source is unavailable; callers treat that as fatal.
pub fn generate(length: usize) -> Result<String> {
    if length == 0 {
        bail!("Token length must be greater than zero");
    }

    let mut token = String::with_capacity(length);
    let mut buffer = vec![0u8; length];

    while token.len() < length {
        OsRng.try_fill_bytes(&mut buffer)?;

        for byte in buffer.iter().filter(|byte| **byte < ACCEPT_BELOW) {
            if token.len() == length {
                break;
            }

            token.push(ALPHABET[(*byte as usize) % ALPHABET.len()] as char);
        }
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tokens_have_requested_length_and_alphabet() {
        for length in [1, 7, TOKEN_LENGTH, 64] {
            let token = generate(length).unwrap();

            assert_eq!(token.len(), length);
            assert!(token.bytes().all(|byte| ALPHABET.contains(&byte)));
        }
    }

    #[test]
    fn zero_length_is_rejected() {
        assert!(generate(0).is_err());
    }

    #[test]
    fn ten_thousand_tokens_do_not_collide() {
        let tokens = (0..10_000)
            .map(|_| generate(TOKEN_LENGTH).unwrap())
            .collect::<HashSet<String>>();

        assert_eq!(tokens.len(), 10_000);
    }

    #[test]
    fn rejection_bound_is_multiple_of_alphabet() {
        assert_eq!(ACCEPT_BELOW, 248);
        assert_eq!(ACCEPT_BELOW as usize % ALPHABET.len(), 0);
    }
}
