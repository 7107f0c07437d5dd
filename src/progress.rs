//! Load-progress estimation.
//!
//! The upstream comment count includes replies while only top-level threads
//! are paginated, so the denominator is a conservative guess capped at
//! [`MAX_EXPECTED_THREADS`].

/// Upper bound for the expected number of top-level threads.
pub const MAX_EXPECTED_THREADS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadProgress {
    /// Percentage text such as `40%` or `24.7%`.
    pub percentage: String,
    /// Raw counts such as `(400 / 1,000 comments indexed)`.
    pub count_text: String,
}

/// `min(floor(0.8 * expected), 1000)`.
pub fn estimate_total(expected_comment_count: u64) -> u64 {
    let guess = expected_comment_count / 5 * 4 + expected_comment_count % 5 * 4 / 5;
    guess.min(MAX_EXPECTED_THREADS)
}

/// Decimal places shown for a given total: one more digit per order of
/// magnitude past 10,000 so large totals still move visibly between updates.
pub fn precision(total: u64) -> usize {
    if total == 0 {
        return 0;
    }
    total.ilog10().saturating_sub(3) as usize
}

/// Returns `None` when `total` is zero; the caller must leave its progress
/// display untouched in that case.
pub fn percentage(count: u64, total: u64) -> Option<LoadProgress> {
    if total == 0 {
        return None;
    }
    let digits = precision(total);
    Some(LoadProgress {
        percentage: format!("{}%", rounded_percent(count, total, digits)),
        count_text: format!(
            "({} / {} comments indexed)",
            group_digits(count),
            group_digits(total)
        ),
    })
}

/// `count / total * 100` to `digits` decimals, exact halves rounding up.
fn rounded_percent(count: u64, total: u64, digits: usize) -> String {
    // u64 inputs cap `digits` at 16, which keeps every product inside u128.
    let scale = 10u128.pow(digits as u32);
    let total = u128::from(total);
    let scaled = u128::from(count) * 100 * scale;
    let q = (2 * scaled + total) / (2 * total);
    if digits == 0 {
        q.to_string()
    } else {
        format!("{}.{:0digits$}", q / scale, q % scale)
    }
}

/// Formats an integer with comma thousands separators.
pub fn group_digits(value: u64) -> String {
    let raw = value.to_string();
    let mut out = String::with_capacity(raw.len() + raw.len() / 3);
    for (i, ch) in raw.chars().enumerate() {
        if i > 0 && (raw.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
