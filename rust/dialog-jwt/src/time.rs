//! Wall-clock time in JWT `NumericDate` seconds.

/// Seconds since the UNIX epoch.
///
/// Uses `std::time::SystemTime::now()` on native and
/// `web_time::SystemTime::now()` on WASM. A clock set before the epoch
/// reads as zero.
#[cfg(not(target_arch = "wasm32"))]
pub fn now() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

/// Seconds since the UNIX epoch.
///
/// Uses `std::time::SystemTime::now()` on native and
/// `web_time::SystemTime::now()` on WASM. A clock set before the epoch
/// reads as zero.
#[cfg(target_arch = "wasm32")]
pub fn now() -> u64 {
    use web_time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}
