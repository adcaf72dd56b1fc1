//! Continuous mapping of parameter strings to real values (CoME).
//!
//! A parameter `p[0..n]` over an alphabet of size β decodes to
//!
//! ```text
//!   Σ index(p[i]) · (β·α)^(-i)
//! ─────────────────────────────
//!  (β - 1) · Σ (β·α)^(-i)
//! ```
//!
//! a weighted mean of symbol positions scaled into `[0, 1]`. With `β·α ≥ 1`
//! the leading symbols dominate, so appending symbols refines the value
//! rather than moving it far.

#![allow(clippy::cast_precision_loss)]

/// Decode `raw` against `symbols` with decay `alpha`.
///
/// Returns `None` for an empty string or a symbol outside the alphabet. A
/// single-symbol alphabet decodes everything to `0.0`.
pub(crate) fn decode_parameter(symbols: &[char], alpha: f64, raw: &str) -> Option<f64> {
    let indices = raw
        .chars()
        .map(|c| symbols.iter().position(|&s| s == c))
        .collect::<Option<Vec<usize>>>()?;
    if indices.is_empty() {
        return None;
    }
    if symbols.len() < 2 {
        return Some(0.0);
    }

    let beta = symbols.len() as f64;
    let ratio = beta * alpha;
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    let mut weight = 1.0;

    // Weights are scaled so the largest is 1; the quotient is unchanged and
    // ratio == 0 (all weight on the last symbol) stays finite.
    if ratio >= 1.0 {
        for &index in &indices {
            numerator += index as f64 * weight;
            denominator += weight;
            weight /= ratio;
        }
    } else {
        for &index in indices.iter().rev() {
            numerator += index as f64 * weight;
            denominator += weight;
            weight *= ratio;
        }
    }

    Some(numerator / ((beta - 1.0) * denominator))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACGT: [char; 4] = ['A', 'C', 'G', 'T'];

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_single_symbol_ignores_alpha() {
        for alpha in [0.0, 0.1, 0.5, 1.0] {
            assert!(close(decode_parameter(&ACGT, alpha, "A").unwrap(), 0.0));
            assert!(close(decode_parameter(&ACGT, alpha, "G").unwrap(), 2.0 / 3.0));
            assert!(close(decode_parameter(&ACGT, alpha, "T").unwrap(), 1.0));
        }
    }

    #[test]
    fn test_two_symbols() {
        // (3·1 + 1·¼) / (3 · (1 + ¼))
        let expected = (3.0 + 0.25) / (3.0 * 1.25);
        assert!(close(decode_parameter(&ACGT, 1.0, "TC").unwrap(), expected));
    }

    #[test]
    fn test_zero_alpha_takes_last_symbol() {
        assert!(close(decode_parameter(&ACGT, 0.0, "TTA").unwrap(), 0.0));
        assert!(close(decode_parameter(&ACGT, 0.0, "AAG").unwrap(), 2.0 / 3.0));
    }

    #[test]
    fn test_small_alpha_matches_formula() {
        // β·α = 0.5: weights 1, 2, 4
        let expected = (1.0 * 1.0 + 2.0 * 2.0 + 3.0 * 4.0) / (3.0 * 7.0);
        assert!(close(decode_parameter(&ACGT, 0.125, "CGT").unwrap(), expected));
    }

    #[test]
    fn test_bounds() {
        let v = decode_parameter(&ACGT, 1.0, "TTTTTTTT").unwrap();
        assert!(close(v, 1.0));
        let v = decode_parameter(&ACGT, 1.0, "AAAAAAAA").unwrap();
        assert!(close(v, 0.0));
    }

    #[test]
    fn test_rejects_empty_and_foreign() {
        assert_eq!(decode_parameter(&ACGT, 1.0, ""), None);
        assert_eq!(decode_parameter(&ACGT, 1.0, "AXA"), None);
    }

    #[test]
    fn test_single_symbol_alphabet() {
        assert_eq!(decode_parameter(&['A'], 1.0, "AAA"), Some(0.0));
    }
}
