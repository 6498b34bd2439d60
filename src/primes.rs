//! Prime helpers used for table sizing and the double hashing step

/// Returns true if `n` is prime
#[must_use]
pub fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    let mut divisor: usize = 2;
    while divisor.saturating_mul(divisor) <= n {
        if n.checked_rem(divisor) == Some(0) {
            return false;
        }
        divisor = divisor.saturating_add(1);
    }
    true
}

/// Returns the smallest prime strictly greater than `n`
#[must_use]
pub fn next_prime(n: usize) -> usize {
    let mut candidate = n.saturating_add(1);
    while !is_prime(candidate) {
        candidate = candidate.saturating_add(1);
    }
    candidate
}

/// Returns the largest prime strictly less than `n`, computed with a sieve over `[0, n)`.
///
/// Returns `None` when `n < 3`, as no prime exists below it.
#[must_use]
pub fn largest_prime_below(n: usize) -> Option<usize> {
    if n < 3 {
        return None;
    }

    let mut sieve = vec![true; n];
    for flag in sieve.iter_mut().take(2) {
        *flag = false;
    }

    let mut factor: usize = 2;
    while factor.saturating_mul(factor) < n {
        if sieve.get(factor).copied().unwrap_or(false) {
            for flag in sieve.iter_mut().skip(factor.saturating_mul(factor)).step_by(factor) {
                *flag = false;
            }
        }
        factor = factor.saturating_add(1);
    }

    sieve.iter().rposition(|&prime| prime)
}

/// Picks a table capacity for `count` elements at the given load factor.
///
/// The result is the smallest prime strictly greater than `count / load_factor`.
/// Load factors outside `(0, 1]` are clamped into it.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::arithmetic_side_effects
)]
pub fn capacity_for(count: usize, load_factor: f64) -> usize {
    let load_factor = if load_factor.is_finite() && load_factor > 0.0 {
        load_factor.min(1.0)
    } else {
        1.0
    };
    let slots = (count as f64 / load_factor).floor() as usize;
    next_prime(slots)
}
