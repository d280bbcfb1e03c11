//! Persisted kernel identities.
//!
//! A kernel registration is identified by the FNV-1a hash of its canonical
//! definition text. Kernels that layout rewrites may insert at load time have a
//! fixed entry in the static table so a persisted reference resolves without a
//! stored hash. When a registration is edited its hash changes; the remap table
//! sends the old value to the new one.
use std::collections::HashMap;

use once_cell::sync::Lazy;

const FNV1A_OFFSET: u64 = 0xcbf29ce484222325;
const FNV1A_PRIME: u64 = 0x100000001b3;

pub fn fnv1a_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV1A_PRIME);
    }
    hash
}

pub fn fnv1a_hash(bytes: &[u8]) -> u64 {
    fnv1a_bytes(FNV1A_OFFSET, bytes)
}

// Transpose 1-12 and 13+ after `bool` joined the type constraint.
const TRANSPOSE_1: u64 = 0x8faec76c9281d8a8;
const TRANSPOSE_13: u64 = 0xf1d1b72b9c133600;
const IDENTITY_1: u64 = 0xc27b9b71d5f502d0;
// Identity 14 after its constraint was renamed from `V` to `T`.
const IDENTITY_14: u64 = 0x2fac62224404dd1e;

static STATIC_KERNEL_HASHES: Lazy<HashMap<(&'static str, i32), u64>> = Lazy::new(|| {
    HashMap::from([
        (("Transpose", 1), TRANSPOSE_1),
        (("Transpose", 13), TRANSPOSE_13),
        (("Identity", 1), IDENTITY_1),
        (("Identity", 14), IDENTITY_14),
    ])
});

static LEGACY_HASH_REMAP: Lazy<HashMap<u64, u64>> = Lazy::new(|| {
    HashMap::from([
        (0x46e89ef7b3b7bb54, TRANSPOSE_1),
        (0x521e9157c4e737fc, TRANSPOSE_13),
        (0xa7664f86ba16d6d0, IDENTITY_14),
    ])
});

/// Fixed hash for `(op_type, since_version)`, if the kernel has one.
///
/// # Example
/// ```no_run
/// # use eagerinfer::kernel::hash;
/// assert!(hash::lookup("Transpose", 13).is_some());
/// assert!(hash::lookup("Add", 14).is_none());
/// ```
pub fn lookup(op_type: &str, since_version: i32) -> Option<u64> {
    STATIC_KERNEL_HASHES.get(&(op_type, since_version)).copied()
}

/// Replace a legacy hash with its current value. Unmapped hashes pass through.
pub fn remap(hash: u64) -> u64 {
    LEGACY_HASH_REMAP.get(&hash).copied().unwrap_or(hash)
}

/// All `(op_type, since_version, hash)` entries of the static table.
pub fn static_entries() -> impl Iterator<Item = (&'static str, i32, u64)> {
    STATIC_KERNEL_HASHES
        .iter()
        .map(|((op, version), hash)| (*op, *version, *hash))
}

/// All `(legacy, current)` pairs of the remap table.
pub fn legacy_remaps() -> impl Iterator<Item = (u64, u64)> {
    LEGACY_HASH_REMAP.iter().map(|(from, to)| (*from, *to))
}
