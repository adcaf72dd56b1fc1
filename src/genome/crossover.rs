//! Crossover between genomes.
//!
//! Chromosomes are paired by position. Each pair is cut at an independent
//! random point per chromosome and the tails are swapped; one of the two
//! recombinants, chosen at random, goes to the child. Chromosomes of the
//! longer parent without a partner are inherited with probability one half.

use rand::Rng;

/// Byte offset of the `p`-th symbol of `s`, or `s.len()` past the end.
fn offset(s: &str, p: usize) -> usize {
    s.char_indices().nth(p).map_or(s.len(), |(i, _)| i)
}

/// Swap the tails of `a` and `b` cut after `pa` and `pb` symbols.
///
/// Returns `(a[..pa] + b[pb..], b[..pb] + a[pa..])`.
pub(crate) fn splice_tails(a: &str, b: &str, pa: usize, pb: usize) -> (String, String) {
    let (a_head, a_tail) = a.split_at(offset(a, pa));
    let (b_head, b_tail) = b.split_at(offset(b, pb));
    ([a_head, b_tail].concat(), [b_head, a_tail].concat())
}

/// Recombine two chromosome lists into a child list.
///
/// Recombinants that come out empty are not inherited.
pub(crate) fn crossover_chromosomes<R: Rng>(a: &[String], b: &[String], rng: &mut R) -> Vec<String> {
    let paired = a.len().min(b.len());
    let mut child = Vec::with_capacity(a.len().max(b.len()));

    for (ca, cb) in a.iter().zip(b) {
        let pa = rng.gen_range(0..=ca.chars().count());
        let pb = rng.gen_range(0..=cb.chars().count());
        let (first, second) = splice_tails(ca, cb, pa, pb);
        let kept = if rng.gen_bool(0.5) { first } else { second };
        if !kept.is_empty() {
            child.push(kept);
        }
    }

    let longer = if a.len() > b.len() { a } else { b };
    for chromosome in &longer[paired..] {
        if rng.gen_bool(0.5) {
            child.push(chromosome.clone());
        }
    }

    child
}
