//! Identifier generation for `UserPlugin` and `ComponentLua` guids.
//!
//! The console stores guids as 16 uppercase hex octets separated by single
//! spaces. Fresh guids come from whatever CSPRNG the caller injects, which
//! keeps tests reproducible without touching process-wide state.

use rand::{CryptoRng, RngCore};

/// Number of random bytes in a guid.
pub const GUID_LEN: usize = 16;

/// Generate a fresh guid such as `C3 13 5E E5 B6 B5 10 02 15 9F 34 2F 14 B7 E5 8B`.
pub fn generate_guid<R: RngCore + CryptoRng>(rng: &mut R) -> String {
    let mut bytes = [0u8; GUID_LEN];
    rng.fill_bytes(&mut bytes);
    format_guid(&bytes)
}

/// Render bytes in console guid notation.
pub fn format_guid(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Use the supplied guid verbatim when it is non-empty, otherwise generate one.
pub fn resolve_guid<R: RngCore + CryptoRng>(supplied: Option<&str>, rng: &mut R) -> String {
    match supplied {
        Some(guid) if !guid.is_empty() => guid.to_string(),
        _ => generate_guid(rng),
    }
}

/// Check that `s` is in console guid notation.
pub fn is_guid(s: &str) -> bool {
    let octets: Vec<&str> = s.split(' ').collect();
    octets.len() == GUID_LEN
        && octets.iter().all(|o| {
            o.len() == 2
                && o.bytes()
                    .all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b))
        })
}
