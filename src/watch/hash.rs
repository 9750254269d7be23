// src/watch/hash.rs

use blake3::Hasher;

use crate::document::ElementRef;

/// Number of bytes of the blake3 output kept for an identity digest.
///
/// 8 bytes (16 hex chars) is plenty for distinguishing elements within one
/// document while keeping watch keys short in logs.
const DIGEST_BYTES: usize = 8;

/// Compute the identity digest of an element.
///
/// The digest is taken over the element's `id` attribute, falling back to
/// its text content when the id is absent or empty. Two elements with the
/// same identifying content produce the same digest, so a re-rendered
/// element keeps the identity of the one it replaced.
pub fn identity_digest(element: &ElementRef) -> String {
    let identity = match element.id_attr() {
        Some(id) if !id.is_empty() => id,
        _ => element.text(),
    };
    digest_str(&identity)
}

/// Stable hex digest of an arbitrary string.
pub fn digest_str(input: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(input.as_bytes());
    let hash = hasher.finalize();
    hash.as_bytes()[..DIGEST_BYTES]
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
