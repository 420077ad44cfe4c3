// Process-wide timestamp source for outgoing messages
//
// Microseconds since the UNIX epoch, never repeating or going backwards
// even if the wall clock is stepped.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static LAST_UTIME: AtomicI64 = AtomicI64::new(0);

/// Current wall-clock time in microseconds since the UNIX epoch
fn wall_clock_utime() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as i64)
        .unwrap_or(0)
}

/// Next timestamp, strictly greater than any previously returned one
pub fn now() -> i64 {
    let wall = wall_clock_utime();
    let mut last = LAST_UTIME.load(Ordering::Relaxed);
    loop {
        let next = wall.max(last + 1);
        match LAST_UTIME.compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(actual) => last = actual,
        }
    }
}
