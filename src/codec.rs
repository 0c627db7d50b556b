//! Light obfuscation for the persisted best score.
//!
//! `<salt>-<score>` is percent-encoded (`encodeURIComponent` rules), base64
//! encoded, then every adjacent pair of characters is swapped. This keeps a
//! casual player from editing the stored value; it is not encryption.
//!
//! ```
//! use twenty48::codec;
//! use rand::{rngs::StdRng, SeedableRng};
//! let mut rng = StdRng::seed_from_u64(5);
//! let stored = codec::encode(2048, &mut rng);
//! assert_eq!(codec::decode(&stored), 2048);
//! assert_eq!(codec::decode("garbage!"), 0);
//! ```

use base64::{engine::general_purpose::STANDARD, Engine as _};
use percent_encoding::{percent_decode, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::{distributions::Alphanumeric, Rng};

use crate::engine::Score;

const SALT_LEN: usize = 4;
const SEPARATOR: char = '-';

/// Bytes `encodeURIComponent` escapes: everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("malformed percent escape at byte {0}")]
    PercentEscape(usize),
    #[error("decoded text is not utf-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("missing '-' separator")]
    MissingSeparator,
    #[error("no score digits after separator")]
    NotNumeric,
}

/// Obfuscate `score` behind a fresh random salt. Output differs per call.
pub fn encode<R: Rng + ?Sized>(score: Score, rng: &mut R) -> String {
    let salt: String = (0..SALT_LEN).map(|_| char::from(rng.sample(Alphanumeric))).collect();
    encode_with_salt(&salt, score)
}

/// Recover a score, yielding 0 for anything that does not decode.
pub fn decode(encoded: &str) -> Score {
    match try_decode(encoded) {
        Ok(score) => score,
        Err(e) => {
            log::debug!("stored score rejected: {e}");
            0
        }
    }
}

/// Like [`decode`] but reports why decoding failed.
pub fn try_decode(encoded: &str) -> Result<Score, CodecError> {
    let restored = swap_pairs(encoded);
    let bytes = STANDARD.decode(restored)?;
    check_escapes(&bytes)?;
    let text = percent_decode(&bytes).decode_utf8()?;
    let (_, tail) = text.split_once(SEPARATOR).ok_or(CodecError::MissingSeparator)?;
    parse_leading_digits(tail)
}

pub(crate) fn encode_with_salt(salt: &str, score: Score) -> String {
    let raw = format!("{salt}{SEPARATOR}{score}");
    let escaped = utf8_percent_encode(&raw, URI_COMPONENT).to_string();
    scramble(escaped.as_bytes())
}

fn scramble(bytes: &[u8]) -> String {
    swap_pairs(&STANDARD.encode(bytes))
}

/// Swap characters 0<->1, 2<->3, ...; a trailing odd character stays put.
/// Applying it twice restores the input.
fn swap_pairs(s: &str) -> String {
    let mut chars: Vec<char> = s.chars().collect();
    for pair in chars.chunks_mut(2) {
        pair.reverse();
    }
    chars.into_iter().collect()
}

/// Every `%` must introduce two hex digits.
fn check_escapes(bytes: &[u8]) -> Result<(), CodecError> {
    for (idx, &b) in bytes.iter().enumerate() {
        if b != b'%' {
            continue;
        }
        let well_formed = bytes
            .get(idx + 1..idx + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !well_formed {
            return Err(CodecError::PercentEscape(idx));
        }
    }
    Ok(())
}

/// Leading decimal digits of `tail` after optional whitespace and `+`;
/// trailing junk is ignored.
fn parse_leading_digits(tail: &str) -> Result<Score, CodecError> {
    let tail = tail.trim_start();
    let tail = tail.strip_prefix('+').unwrap_or(tail);
    let end = tail.find(|c: char| !c.is_ascii_digit()).unwrap_or(tail.len());
    tail[..end].parse().map_err(|_| CodecError::NotNumeric)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn it_matches_known_encoding() {
        // base64("abcd-42") = "YWJjZC00Mg=="
        assert_eq!(encode_with_salt("abcd", 42), "WYjJCZ00gM==");
        assert_eq!(decode("WYjJCZ00gM=="), 42);
    }

    #[test]
    fn it_swaps_pairs() {
        assert_eq!(swap_pairs(""), "");
        assert_eq!(swap_pairs("a"), "a");
        assert_eq!(swap_pairs("abcd"), "badc");
        assert_eq!(swap_pairs("abcde"), "badce");
        assert_eq!(swap_pairs(&swap_pairs("hello world")), "hello world");
    }

    #[test]
    fn it_round_trips_random_scores() {
        let mut rng = StdRng::seed_from_u64(2048);
        for _ in 0..1000 {
            let score: Score = rng.gen();
            assert_eq!(decode(&encode(score, &mut rng)), score);
        }
        for score in [0, 1, 2, 4, u64::MAX] {
            assert_eq!(try_decode(&encode(score, &mut rng)), Ok(score));
        }
    }

    #[test]
    fn it_salts_each_encoding() {
        let mut rng = StdRng::seed_from_u64(1);
        let a = encode(100, &mut rng);
        let b = encode(100, &mut rng);
        assert_ne!(a, b);
        assert_eq!(decode(&a), decode(&b));
    }

    #[test]
    fn it_rejects_garbage() {
        assert_eq!(decode("!!!not base64!!!"), 0);
        assert_eq!(decode(""), 0);
        assert!(matches!(try_decode("***"), Err(CodecError::Base64(_))));
        assert_eq!(try_decode(""), Err(CodecError::MissingSeparator));
    }

    #[test]
    fn it_reports_bad_payloads() {
        assert_eq!(try_decode(&scramble(b"nosalt")), Err(CodecError::MissingSeparator));
        assert_eq!(try_decode(&scramble(b"abcd-")), Err(CodecError::NotNumeric));
        assert_eq!(try_decode(&scramble(b"abcd-x9")), Err(CodecError::NotNumeric));
        assert_eq!(try_decode(&scramble(b"abcd-%zz")), Err(CodecError::PercentEscape(5)));
        assert_eq!(try_decode(&scramble(b"abcd-%4")), Err(CodecError::PercentEscape(5)));
        assert!(matches!(try_decode(&scramble(b"abcd-%FF")), Err(CodecError::Utf8(_))));
        assert_eq!(try_decode(&scramble(b"abcd-99999999999999999999999")), Err(CodecError::NotNumeric));
    }

    #[test]
    fn it_reads_leading_digits() {
        assert_eq!(try_decode(&scramble(b"abcd-12abc")), Ok(12));
        assert_eq!(try_decode(&scramble(b"abcd-7-3")), Ok(7));
        assert_eq!(try_decode(&scramble(b"abcd-%31%32")), Ok(12));
    }

    #[test]
    fn it_skips_leading_space_and_plus() {
        assert_eq!(try_decode(&scramble(b"abcd- 12")), Ok(12));
        assert_eq!(try_decode(&scramble(b"abcd-%2012")), Ok(12));
        assert_eq!(try_decode(&scramble(b"abcd-+7")), Ok(7));
        assert_eq!(try_decode(&scramble(b"abcd- +7x")), Ok(7));
        assert_eq!(try_decode(&scramble(b"abcd-+")), Err(CodecError::NotNumeric));
        assert_eq!(try_decode(&scramble(b"abcd-++7")), Err(CodecError::NotNumeric));
    }

    #[test]
    fn it_survives_single_char_tampering() {
        let mut rng = StdRng::seed_from_u64(77);
        let encoded = encode(123_456, &mut rng);
        for idx in 0..encoded.len() {
            for replacement in ['A', 'z', '0', '+', '/', '=', '%', '-', 'é'] {
                let mut chars: Vec<char> = encoded.chars().collect();
                chars[idx] = replacement;
                let tampered: String = chars.into_iter().collect();
                // total: either 0 or some parsed value, never a panic
                let _ = decode(&tampered);
            }
        }
    }
}
