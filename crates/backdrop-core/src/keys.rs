//! Asset key generation and parsing
//!
//! Keys double as file names in the file-backed store:
//! `asset_<unix-millis>_<random6>.<ext>`. The record id is the
//! `<unix-millis>_<random6>` part.

use chrono::{DateTime, TimeZone, Utc};
use rand::Rng;

/// Prefix shared by every generated key
pub const KEY_PREFIX: &str = "asset_";

/// Extension used when the caller's hint is empty or unusable
pub const FALLBACK_EXTENSION: &str = "jpg";

const SUFFIX_LEN: usize = 6;
const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const MAX_EXTENSION_LEN: usize = 8;

/// A freshly generated key with its derived id and timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedKey {
    pub id: String,
    pub key: String,
    pub created_at: DateTime<Utc>,
}

/// Components recovered from a well-formed key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKey {
    pub id: String,
    pub key: String,
    pub created_at: DateTime<Utc>,
    pub extension: String,
}

/// Normalize an extension hint: lowercase ASCII alphanumerics only
///
/// Accepts `"PNG"`, `".png"` or `"photo.PNG"` and yields `"png"`.
pub fn normalize_extension(hint: &str) -> String {
    let tail = hint.rsplit('.').next().unwrap_or_default();
    let ext = tail.trim().to_ascii_lowercase();
    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return FALLBACK_EXTENSION.to_string();
    }
    ext
}

fn random_suffix<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.random_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect()
}

/// Generate a key for an asset created at `now`
pub fn generate_key_at(now: DateTime<Utc>, extension_hint: &str) -> GeneratedKey {
    let millis = now.timestamp_millis();
    let suffix = random_suffix(&mut rand::rng());
    let id = format!("{}_{}", millis, suffix);
    let key = format!("{}{}.{}", KEY_PREFIX, id, normalize_extension(extension_hint));
    GeneratedKey {
        id,
        key,
        created_at: Utc
            .timestamp_millis_opt(millis)
            .single()
            .unwrap_or(now),
    }
}

/// Generate a key timestamped with the current wall clock
pub fn generate_key(extension_hint: &str) -> GeneratedKey {
    generate_key_at(Utc::now(), extension_hint)
}

/// Parse a key produced by [`generate_key`]
///
/// Returns `None` for anything else, including dotfiles and temp files left
/// in a backend directory.
pub fn parse_key(key: &str) -> Option<ParsedKey> {
    let rest = key.strip_prefix(KEY_PREFIX)?;
    let (id, extension) = rest.rsplit_once('.')?;
    let (millis, suffix) = id.split_once('_')?;

    if millis.is_empty() || !millis.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if suffix.is_empty()
        || !suffix
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
    {
        return None;
    }
    if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }

    let created_at = Utc.timestamp_millis_opt(millis.parse().ok()?).single()?;
    Some(ParsedKey {
        id: id.to_string(),
        key: key.to_string(),
        created_at,
        extension: extension.to_string(),
    })
}
