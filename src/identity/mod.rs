//! Block identifier lifecycle
//!
//! Identifiers come in two forms:
//! - base form: exactly four lowercase hex characters (e.g. "ab12"),
//!   generated client-side before submission;
//! - suffixed form: base form + "_" + positive record id (e.g. "ab12_55"),
//!   bound host-side once the block belongs to a durable record.
//!
//! `finalize` is idempotent: applied to an already-suffixed identifier it
//! replaces the suffix, it never stacks a second one. The host-side stage
//! in `host::binding` applies the identical rule; the two implementations
//! are covered by shared equivalence tests.

use rand::rngs::OsRng;
use rand::RngCore;
use regex::Regex;
use std::sync::OnceLock;

/// Attribute key carrying the block identifier.
pub const BLOCK_ID_ATTR: &str = "blockId";

/// Length of the base-form identifier in hex characters.
pub const BASE_LEN: usize = 4;

fn base_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9a-f]{4}$").expect("valid base pattern"))
}

fn suffixed_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9a-f]{4}_[1-9][0-9]*$").expect("valid suffixed pattern"))
}

/// Returns the pattern string for the base form (used in fix guidance).
pub fn base_pattern() -> &'static str {
    "^[0-9a-f]{4}$"
}

/// Returns the pattern string for the suffixed form (used in fix guidance).
pub fn suffixed_pattern() -> &'static str {
    "^[0-9a-f]{4}_[1-9][0-9]*$"
}

/// Checks whether `id` is a valid base-form identifier.
pub fn is_base(id: &str) -> bool {
    base_re().is_match(id)
}

/// Checks whether `id` is a valid suffixed-form identifier.
pub fn is_suffixed(id: &str) -> bool {
    suffixed_re().is_match(id)
}

/// Checks whether `id` is valid in either form.
pub fn is_valid(id: &str) -> bool {
    is_base(id) || is_suffixed(id)
}

/// Generates a fresh base-form identifier.
///
/// Uses the operating system's CSPRNG. Collisions at tree scope are
/// accepted as negligible; duplicates are warned on, not rejected.
pub fn generate() -> String {
    let mut bytes = [0u8; BASE_LEN / 2];
    OsRng.fill_bytes(&mut bytes);
    format!("{:02x}{:02x}", bytes[0], bytes[1])
}

/// Binds an identifier to a durable record.
///
/// If `id` is base-form the record id is appended; if it is already
/// suffixed only the suffix is replaced, the base is kept. Applying
/// `finalize` twice with the same record id is a no-op. The rule is
/// total: a malformed base is passed through mechanically and left for
/// the validator to report.
pub fn finalize(id: &str, record_id: u64) -> String {
    let base = match id.find('_') {
        Some(pos) => &id[..pos],
        None => id,
    };
    format!("{}_{}", base, record_id)
}
