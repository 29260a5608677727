use std::sync::OnceLock;
use std::sync::atomic::{AtomicI64, Ordering};

/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a Snowflake-style i64 for use as resource ID.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 12 bits: randomly-seeded per-process sequence (4096 values per ms)
///
/// The sequence keeps ids minted in the same millisecond distinct within
/// one process; the random seed keeps independent processes apart.
pub fn snowflake_id() -> i64 {
    use rand::Rng;
    // Custom epoch: 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;

    static SEED: OnceLock<i64> = OnceLock::new();
    static SEQUENCE: AtomicI64 = AtomicI64::new(0);

    let seed = *SEED.get_or_init(|| rand::thread_rng().gen_range(0..0x1000));
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);

    let now = now_millis();
    let ts = (now - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    (ts << 12) | ((seed + seq) & 0xFFF) // 12 bits
}
