//! Smith-Waterman local alignment for terminal similarity.

#![allow(clippy::cast_precision_loss)]

use crate::descriptor::Descriptor;

/// Score of an exact match without a substitution matrix.
pub(crate) const MATCH_SCORE: f64 = 2.0;

/// Score of a mismatch or gap without a substitution matrix.
pub(crate) const MISMATCH_SCORE: f64 = -1.0;

/// Score for aligning `x` (from the first string) with `y` (from the second).
///
/// `None` stands for a gap. With a substitution matrix, a symbol outside the
/// alphabet is scored like a gap.
fn weight(desc: &Descriptor, x: Option<char>, y: Option<char>) -> f64 {
    match desc.scoring() {
        None => match (x, y) {
            (Some(x), Some(y)) if x == y => MATCH_SCORE,
            _ => MISMATCH_SCORE,
        },
        Some(matrix) => {
            match (x.and_then(|c| desc.index_of(c)), y.and_then(|c| desc.index_of(c))) {
                (Some(i), Some(j)) => matrix[i][j],
                _ => desc.gap(),
            }
        }
    }
}

/// Best local alignment score between `a` and `b`.
///
/// Only two rows of the score matrix are kept, sized by the shorter string.
pub(crate) fn local_alignment_score(desc: &Descriptor, a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let swapped = b.len() > a.len();
    let (rows, cols) = if swapped { (&b, &a) } else { (&a, &b) };

    // w takes symbols in (row, col) order; restore (a, b) order for the matrix
    let w = |r: Option<char>, c: Option<char>| {
        if swapped {
            weight(desc, c, r)
        } else {
            weight(desc, r, c)
        }
    };

    let mut previous = vec![0.0; cols.len() + 1];
    let mut current = vec![0.0; cols.len() + 1];
    let mut best: f64 = 0.0;

    for &r in rows {
        current[0] = 0.0;
        for (j, &c) in cols.iter().enumerate() {
            let h = (previous[j] + w(Some(r), Some(c)))
                .max(previous[j + 1] + w(Some(r), None))
                .max(current[j] + w(None, Some(c)))
                .max(0.0);
            current[j + 1] = h;
            best = best.max(h);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    best
}

/// Length-normalized similarity `2·score / (|a| + |b|)`; `0.0` if both are empty.
pub(crate) fn terminal_score(desc: &Descriptor, a: &str, b: &str) -> f64 {
    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 0.0;
    }
    2.0 * local_alignment_score(desc, a, b) / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::RawDescriptor;

    fn plain() -> Descriptor {
        RawDescriptor::new("ACGT", ["ACGA"], "TGC", "TGA")
            .validate()
            .unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_identical_strings() {
        let desc = plain();
        assert!(close(local_alignment_score(&desc, "ACGT", "ACGT"), 8.0));
        assert!(close(terminal_score(&desc, "ACGT", "ACGT"), 2.0));
    }

    #[test]
    fn test_first_symbols_count() {
        let desc = plain();
        assert!(close(local_alignment_score(&desc, "A", "A"), 2.0));
        assert!(close(local_alignment_score(&desc, "AT", "AG"), 2.0));
    }

    #[test]
    fn test_substring() {
        let desc = plain();
        assert!(close(local_alignment_score(&desc, "TTGCAT", "GCA"), 6.0));
        assert!(close(local_alignment_score(&desc, "GCA", "TTGCAT"), 6.0));
    }

    #[test]
    fn test_gap_and_mismatch() {
        let desc = plain();
        // ACGT vs ACT: AC (4), gap (-1), T (2)
        assert!(close(local_alignment_score(&desc, "ACGT", "ACT"), 5.0));
        // AAGAA vs AATAA: two matches, mismatch, two matches
        assert!(close(local_alignment_score(&desc, "AAGAA", "AATAA"), 7.0));
    }

    #[test]
    fn test_disjoint_and_empty() {
        let desc = plain();
        assert!(close(local_alignment_score(&desc, "AAAA", "CCCC"), 0.0));
        assert!(close(local_alignment_score(&desc, "", "ACGT"), 0.0));
        assert!(close(terminal_score(&desc, "", ""), 0.0));
    }

    #[test]
    fn test_matrix_scoring_is_not_transposed() {
        // A→C scores 3, C→A scores -5
        let mut matrix = vec![vec![-1.0; 4]; 4];
        for (i, row) in matrix.iter_mut().enumerate() {
            row[i] = 1.0;
        }
        matrix[0][1] = 3.0;
        matrix[1][0] = -5.0;
        let desc = RawDescriptor::new("ACGT", ["ACGA"], "TGC", "TGA")
            .with_scoring(matrix, -2.0)
            .validate()
            .unwrap();

        assert!(close(local_alignment_score(&desc, "A", "C"), 3.0));
        assert!(close(local_alignment_score(&desc, "C", "A"), 0.0));
        // the longer string is iterated as rows; scores must not depend on it
        assert!(close(local_alignment_score(&desc, "A", "GCG"), 3.0));
        assert!(close(local_alignment_score(&desc, "GCG", "A"), 0.0));
    }
}
