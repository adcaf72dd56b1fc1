//! Mutation operators on chromosome strings.
//!
//! Each operator runs as a repeated Bernoulli trial: while the genome still
//! has chromosomes and a uniform draw falls below the operator's probability,
//! one edit is applied to a uniformly chosen chromosome. Edits that cannot
//! apply (e.g. deleting a fragment from a one-symbol chromosome) are skipped
//! but still consume their draws. Every inserted symbol is taken from the
//! alphabet or from a device marker, so chromosomes never leave the alphabet.

use crate::descriptor::{Descriptor, Mutation};
use crate::genome::crossover::splice_tails;
use rand::Rng;
use rand::seq::SliceRandom;

/// Minimum upper bound for the payload length of an inserted device.
const MIN_DEVICE_PAYLOAD: usize = 5;

/// Apply every mutation operator in order, then drop empty chromosomes.
pub(crate) fn mutate<R: Rng>(desc: &Descriptor, chromosomes: &mut Vec<String>, rng: &mut R) {
    for mutation in Mutation::ALL {
        let p = desc.possibility(mutation);
        let mut applied = 0usize;
        while !chromosomes.is_empty() && rng.r#gen::<f64>() < p {
            if apply(mutation, desc, chromosomes, rng) {
                applied += 1;
            }
        }
        if applied > 0 {
            log::trace!("{mutation} applied {applied} times");
        }
    }
    chromosomes.retain(|c| !c.is_empty());
}

/// Apply one instance of `mutation`; returns whether anything changed.
fn apply<R: Rng>(
    mutation: Mutation,
    desc: &Descriptor,
    chromosomes: &mut Vec<String>,
    rng: &mut R,
) -> bool {
    let i = rng.gen_range(0..chromosomes.len());
    match mutation {
        Mutation::CharDelete => edit(&mut chromosomes[i], 1, |buf| {
            let p = rng.gen_range(0..buf.len());
            buf.remove(p);
        }),
        Mutation::CharInsert => edit(&mut chromosomes[i], 1, |buf| {
            let p = rng.gen_range(0..=buf.len());
            buf.insert(p, random_symbol(desc, rng));
        }),
        Mutation::CharReplace => edit(&mut chromosomes[i], 1, |buf| {
            let p = rng.gen_range(0..buf.len());
            buf[p] = random_symbol(desc, rng);
        }),
        Mutation::FragDelete => edit(&mut chromosomes[i], 2, |buf| {
            let (start, len) = random_fragment(buf.len(), rng);
            buf.drain(start..start + len);
        }),
        Mutation::FragMove => edit(&mut chromosomes[i], 2, |buf| {
            let (start, len) = random_fragment(buf.len(), rng);
            // insertion points of the remainder, minus the original spot
            let mut dest = rng.gen_range(0..buf.len() - len);
            if dest >= start {
                dest += 1;
            }
            move_fragment(buf, start, len, dest);
        }),
        Mutation::FragCopy => edit(&mut chromosomes[i], 2, |buf| {
            let (start, len) = random_fragment(buf.len(), rng);
            let dest = rng.gen_range(0..=buf.len());
            copy_fragment(buf, start, len, dest);
        }),
        Mutation::DeviceInsert => edit(&mut chromosomes[i], 0, |buf| {
            let p = rng.gen_range(0..=buf.len());
            let bound = (buf.len() / 5).max(MIN_DEVICE_PAYLOAD);
            let payload = rng.gen_range(0..bound);
            let mut inserted: Vec<char> = desc
                .devices()
                .choose(rng)
                .map(|marker| marker.chars().collect())
                .unwrap_or_default();
            inserted.extend((0..payload).map(|_| random_symbol(desc, rng)));
            buf.splice(p..p, inserted);
        }),
        Mutation::ChromosomeDelete => {
            chromosomes.remove(i);
            true
        }
        Mutation::ChromosomeCopy => {
            let copy = chromosomes[i].clone();
            chromosomes.push(copy);
            true
        }
        Mutation::ChromosomeCrossover => {
            if chromosomes.len() < 2 {
                return false;
            }
            let mut j = rng.gen_range(0..chromosomes.len() - 1);
            if j >= i {
                j += 1;
            }
            let pa = rng.gen_range(0..=chromosomes[i].chars().count());
            let pb = rng.gen_range(0..=chromosomes[j].chars().count());
            let (a, b) = splice_tails(&chromosomes[i], &chromosomes[j], pa, pb);
            chromosomes[i] = a;
            chromosomes[j] = b;
            true
        }
    }
}

/// Run `f` on the symbols of `chromosome` if it has at least `min_len` of them.
fn edit(chromosome: &mut String, min_len: usize, f: impl FnOnce(&mut Vec<char>)) -> bool {
    let mut buf: Vec<char> = chromosome.chars().collect();
    if buf.len() < min_len {
        return false;
    }
    f(&mut buf);
    *chromosome = buf.into_iter().collect();
    true
}

fn random_symbol<R: Rng>(desc: &Descriptor, rng: &mut R) -> char {
    let symbols = desc.symbols();
    symbols[rng.gen_range(0..symbols.len())]
}

/// A run `(start, len)` with `len ≥ 1` that leaves at least one symbol outside.
///
/// Requires `n ≥ 2`.
fn random_fragment<R: Rng>(n: usize, rng: &mut R) -> (usize, usize) {
    let start = rng.gen_range(0..n - 1);
    let len = rng.gen_range(1..n - start);
    (start, len)
}

/// Cut `buf[start..start + len]` out and reinsert it at position `dest` of
/// what remains.
///
/// `dest` ranges over `0..=buf.len() - len`; `dest == start` is the identity.
pub(crate) fn move_fragment(buf: &mut Vec<char>, start: usize, len: usize, dest: usize) {
    let run: Vec<char> = buf.drain(start..start + len).collect();
    buf.splice(dest..dest, run);
}

/// Insert a copy of `buf[start..start + len]` before position `dest` of the
/// original buffer.
pub(crate) fn copy_fragment(buf: &mut Vec<char>, start: usize, len: usize, dest: usize) {
    let run = buf[start..start + len].to_vec();
    buf.splice(dest..dest, run);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::RawDescriptor;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn text(buf: &[char]) -> String {
        buf.iter().collect()
    }

    fn only(name: &str, p: f64) -> Descriptor {
        RawDescriptor::new("ACGT", ["ACGA", "ACAA"], "TGC", "TGA")
            .with_possibility(name, p)
            .validate()
            .unwrap()
    }

    #[test]
    fn test_move_fragment_forward_and_back() {
        let mut buf = chars("abcdefg");
        move_fragment(&mut buf, 1, 2, 3);
        assert_eq!(text(&buf), "adebcfg");

        let mut buf = chars("abcdefg");
        move_fragment(&mut buf, 4, 2, 0);
        assert_eq!(text(&buf), "efabcdg");

        let mut buf = chars("abcdefg");
        move_fragment(&mut buf, 2, 3, 2);
        assert_eq!(text(&buf), "abcdefg");

        let mut buf = chars("abcdefg");
        move_fragment(&mut buf, 0, 3, 4);
        assert_eq!(text(&buf), "defgabc");
    }

    #[test]
    fn test_copy_fragment_overlapping_destination() {
        let mut buf = chars("abcdef");
        copy_fragment(&mut buf, 1, 3, 2);
        assert_eq!(text(&buf), "abbcdcdef");

        let mut buf = chars("abcdef");
        copy_fragment(&mut buf, 0, 2, 6);
        assert_eq!(text(&buf), "abcdefab");
    }

    #[test]
    fn test_frag_move_preserves_symbols() {
        let desc = only("frag_move", 0.9);
        let mut rng = SmallRng::seed_from_u64(7);
        let original = "AACCGGTTACGT".to_owned();
        for _ in 0..200 {
            let mut chromosomes = vec![original.clone()];
            mutate(&desc, &mut chromosomes, &mut rng);
            let mut a = chars(&chromosomes[0]);
            let mut b = chars(&original);
            a.sort_unstable();
            b.sort_unstable();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_zero_possibilities_change_nothing() {
        let desc = RawDescriptor::new("ACGT", ["ACGA"], "TGC", "TGA")
            .validate()
            .unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        let mut chromosomes = vec!["ACGTACGT".to_owned(), "TTTT".to_owned()];
        mutate(&desc, &mut chromosomes, &mut rng);
        assert_eq!(chromosomes, vec!["ACGTACGT".to_owned(), "TTTT".to_owned()]);
    }

    #[test]
    fn test_char_delete_empties_are_removed() {
        let desc = only("char_delete", 0.99);
        let mut rng = SmallRng::seed_from_u64(3);
        let mut chromosomes = vec!["A".to_owned()];
        // 0.99 is near certain to fire at least once for this seed
        for _ in 0..10 {
            mutate(&desc, &mut chromosomes, &mut rng);
        }
        assert!(chromosomes.iter().all(|c| !c.is_empty()));
    }

    #[test]
    fn test_certain_chromosome_delete_empties_genome() {
        let desc = only("chromosome_delete", 1.0);
        let mut rng = SmallRng::seed_from_u64(13);
        let mut chromosomes = vec!["ACGT".to_owned(), "TTGA".to_owned(), "CC".to_owned()];
        mutate(&desc, &mut chromosomes, &mut rng);
        assert!(chromosomes.is_empty());
    }

    #[test]
    fn test_no_operator_fires_on_empty_genome() {
        let desc = only("chromosome_copy", 0.9);
        let mut rng = SmallRng::seed_from_u64(11);
        let mut chromosomes = Vec::new();
        mutate(&desc, &mut chromosomes, &mut rng);
        assert!(chromosomes.is_empty());
    }

    #[test]
    fn test_device_insert_adds_marker() {
        let desc = only("device_insert", 0.5);
        let mut rng = SmallRng::seed_from_u64(5);
        let mut grew = false;
        for _ in 0..50 {
            let mut chromosomes = vec!["TTTTTTTTTT".to_owned()];
            mutate(&desc, &mut chromosomes, &mut rng);
            if chromosomes[0].len() > 10 {
                grew = true;
                assert!(chromosomes[0].contains("ACGA") || chromosomes[0].contains("ACAA"));
            }
        }
        assert!(grew);
    }

    #[test]
    fn test_chromosome_crossover_conserves_total_length() {
        let desc = only("chromosome_crossover", 0.5);
        let mut rng = SmallRng::seed_from_u64(9);
        for _ in 0..100 {
            let mut chromosomes = vec!["AAAAAA".to_owned(), "CCC".to_owned()];
            mutate(&desc, &mut chromosomes, &mut rng);
            let total: usize = chromosomes.iter().map(String::len).sum();
            assert_eq!(total, 9);
        }
    }
}
