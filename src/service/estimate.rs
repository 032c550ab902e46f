//! Output size and generation time estimates.

use std::hint::black_box;
use std::time::{Duration, Instant};

use bytes::BytesMut;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::domain::EstimateResponse;
use crate::service::synthesizer::Synthesizer;

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

const MS_PER_DAY: u128 = 86_400_000;
/// 365.25 days.
const MS_PER_YEAR: u128 = 31_557_600_000;
/// 30.4375 days.
const MS_PER_MONTH: u128 = 2_629_800_000;

/// Expected output size in bytes for `count` lines.
#[must_use]
pub fn estimate_size(synth: &Synthesizer, count: u64) -> u64 {
    let defs = synth.definitions();
    let line_total: u128 = defs
        .iter()
        .map(|d| u128::from(d.length()) + 1)
        .sum();
    let n = defs.len() as u128;
    let bytes = (u128::from(count) * line_total + n / 2) / n;
    u64::try_from(bytes).unwrap_or(u64::MAX)
}

/// Render a byte count with a 1024-based unit and two decimals.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.2} {}", SIZE_UNITS[unit])
}

/// Time one synthesis by running `samples` of them.
#[must_use]
pub fn measure_per_number(synth: &Synthesizer, samples: u32) -> Duration {
    let samples = samples.max(1);
    let mut rng = StdRng::seed_from_u64(0);
    let mut out = BytesMut::with_capacity(64 * 1024);

    let start = Instant::now();
    for _ in 0..samples {
        synth.write_next(&mut rng, &mut out);
        if out.len() >= 60 * 1024 {
            black_box(&out);
            out.clear();
        }
    }
    black_box(&out);

    start.elapsed() / samples
}

/// Total time for `count` syntheses at `per_number` each.
#[must_use]
pub fn estimate_duration(per_number: Duration, count: u64) -> Duration {
    let nanos = per_number.as_nanos().saturating_mul(u128::from(count));
    let secs = u64::try_from(nanos / 1_000_000_000).unwrap_or(u64::MAX);
    #[allow(clippy::cast_possible_truncation)] // < 1e9
    let sub = (nanos % 1_000_000_000) as u32;
    Duration::new(secs, sub)
}

/// Render a duration as `[N years ][N months ][N days ]HH:MM:SS:mmm`.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let mut ms = duration.as_millis();
    let mut out = String::new();

    for (unit, name) in [(MS_PER_YEAR, "years"), (MS_PER_MONTH, "months"), (MS_PER_DAY, "days")] {
        let n = ms / unit;
        ms %= unit;
        if n > 0 {
            out.push_str(&format!("{n} {name} "));
        }
    }

    let hours = ms / 3_600_000;
    ms %= 3_600_000;
    let minutes = ms / 60_000;
    ms %= 60_000;
    let seconds = ms / 1_000;
    ms %= 1_000;

    out.push_str(&format!("{hours:02}:{minutes:02}:{seconds:02}:{ms:03}"));
    out
}

/// Size and time estimate for `count` numbers from `synth`.
#[must_use]
pub fn estimate(synth: &Synthesizer, count: u64, samples: u32) -> EstimateResponse {
    let bytes = estimate_size(synth, count);
    let per_number = measure_per_number(synth, samples);
    let total = estimate_duration(per_number, count);

    EstimateResponse {
        count,
        bytes,
        size: format_size(bytes),
        per_number_ns: u64::try_from(per_number.as_nanos()).unwrap_or(u64::MAX),
        duration_ms: u64::try_from(total.as_millis()).unwrap_or(u64::MAX),
        duration: format_duration(total),
    }
}
