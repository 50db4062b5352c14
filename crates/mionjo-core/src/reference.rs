//! Resolution of stored attachment references into storage object keys.
//!
//! A record's `lien_fichier` has accumulated several historical shapes: a
//! full public storage URL, a bare object key, or some other URL written by
//! an earlier upload path. Resolution returns a best-guess key; whether
//! that key actually exists is the reconciler's job.

use crate::defaults::BUCKET_URL_SEGMENT;

/// Derive a storage object key from a stored attachment reference.
///
/// Priority order:
/// 1. Reference contains the public-bucket segment (`/mionjo_files/`):
///    everything after it, percent-decoded.
/// 2. No scheme and no path separator: the reference already is a bare key.
/// 3. Fallback: the substring after the final `/`, percent-decoded.
///
/// Pure and total: empty or unusable input yields `None`, never an error.
/// A key that fails percent-decoding is returned raw rather than dropped.
pub fn resolve_object_key(reference: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }

    if let Some(idx) = reference.find(BUCKET_URL_SEGMENT) {
        let tail = &reference[idx + BUCKET_URL_SEGMENT.len()..];
        return non_empty(percent_decode(tail));
    }

    if !reference.contains("://") && !reference.contains('/') {
        return Some(reference.to_string());
    }

    let tail = reference.rsplit('/').next().unwrap_or("");
    non_empty(percent_decode(tail))
}

fn percent_decode(s: &str) -> String {
    match urlencoding::decode(s) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => s.to_string(),
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
