use std::sync::{
    OnceLock,
    atomic::{AtomicU64, Ordering},
};

/// Returns a process-unique connection id for log correlation.
///
/// Ids count up from a random base, so two server runs rarely reuse the
/// same values in aggregated logs.
pub fn rand_id() -> u64 {
    static COUNTER: OnceLock<AtomicU64> = OnceLock::new();
    let counter = COUNTER.get_or_init(|| AtomicU64::new(rand::random::<u32>() as u64));
    counter.fetch_add(1, Ordering::Relaxed)
}
