//! Identifier generation for new entities.
//!
//! Ids are random v4 UUIDs drawn from the OS entropy source. If the OS source
//! is unavailable we fall back to a seeded PRNG value followed by the current
//! timestamp, both base-36 encoded. Generation never fails.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::{OsRng, StdRng};
use rand::{Rng, RngCore, SeedableRng};
use uuid::Uuid;

static FALLBACK_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a new unique entity id.
pub fn new_id() -> String {
    let mut bytes = [0u8; 16];
    match OsRng.try_fill_bytes(&mut bytes) {
        Ok(()) => uuid::Builder::from_random_bytes(bytes)
            .into_uuid()
            .to_string(),
        Err(e) => {
            tracing::debug!("OS randomness unavailable ({e}), using fallback id");
            fallback_id()
        }
    }
}

/// Non-cryptographic id: base36(prng) + base36(now in ms).
pub(crate) fn fallback_id() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();
    let nonce = FALLBACK_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut rng = StdRng::seed_from_u64(now.rotate_left(17) ^ nonce.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    let random: u64 = rng.r#gen();

    format!("{}{}", to_base36(random), to_base36(now))
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if n == 0 {
        return "0".to_string();
    }

    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// True if `id` parses as a UUID (i.e. it came from the primary strategy).
pub fn is_uuid(id: &str) -> bool {
    Uuid::parse_str(id).is_ok()
}
