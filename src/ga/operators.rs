//! Text-based genetic operators.
//!
//! Candidates in the code-translation instance are plain source text, so
//! the operators work on `&str` and are independent of any oracle.
//!
//! # Crossover
//!
//! - [`crossover_lines`]: length-weighted, probabilistic line interleaving
//!
//! # Mutation
//!
//! - [`mutate_chars`]: per-character replacement with printable ASCII

use crate::random::RandomSource;

/// Lowest code point produced by [`mutate_chars`].
pub const PRINTABLE_START: u32 = 32;

/// One past the highest code point produced by [`mutate_chars`].
pub const PRINTABLE_END: u32 = 126;

// ============================================================================
// Crossover
// ============================================================================

/// Splits text into lines on `\n` or `\r\n`.
///
/// Unlike [`str::lines`], a trailing newline yields a final empty line and
/// empty text yields one empty line, so both parents always contribute at
/// least one line.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// Combines two texts by interleaving their lines.
///
/// Two cursors walk the parents. Each step draws twice: the first draw
/// (`< 0.5`) decides whether a line is emitted at all, the second
/// (`< len(a) / (len(a) + len(b))`) decides which side the line comes
/// from. Only the chosen side's cursor advances, whether or not its line
/// was emitted. The walk stops as soon as either side is exhausted.
///
/// The longer parent is chosen proportionally more often. The offspring
/// never has more lines than both parents combined.
///
/// # Examples
///
/// ```
/// use u_genecode::ga::operators::crossover_lines;
/// use u_genecode::random::create_rng;
///
/// let child = crossover_lines("int a;\nint b;", "float x;", &mut create_rng(1));
/// assert!(child.lines().count() <= 3);
/// ```
pub fn crossover_lines<R: RandomSource + ?Sized>(a: &str, b: &str, rng: &mut R) -> String {
    let a_lines = split_lines(a);
    let b_lines = split_lines(b);

    let a_probability = a_lines.len() as f64 / (a_lines.len() + b_lines.len()) as f64;

    let mut combined: Vec<&str> = Vec::with_capacity(a_lines.len().max(b_lines.len()));
    let (mut ai, mut bi) = (0usize, 0usize);
    while ai < a_lines.len() && bi < b_lines.len() {
        let emit = rng.next_f64() < 0.5;
        if rng.next_f64() < a_probability {
            if emit {
                combined.push(a_lines[ai]);
            }
            ai += 1;
        } else {
            if emit {
                combined.push(b_lines[bi]);
            }
            bi += 1;
        }
    }

    combined.join("\n")
}

// ============================================================================
// Mutation
// ============================================================================

/// Replaces each character, with independent probability `rate`, by a
/// printable ASCII character in `32..=125`.
///
/// One draw decides each position; a replaced position takes a second draw
/// for the new character. The output has the same number of characters as
/// the input.
///
/// # Examples
///
/// ```
/// use u_genecode::ga::operators::mutate_chars;
/// use u_genecode::random::create_rng;
///
/// let same = mutate_chars("return 0;", 0.0, &mut create_rng(3));
/// assert_eq!(same, "return 0;");
/// ```
pub fn mutate_chars<R: RandomSource + ?Sized>(text: &str, rate: f64, rng: &mut R) -> String {
    text.chars()
        .map(|c| {
            if rng.next_f64() < rate {
                random_printable(rng)
            } else {
                c
            }
        })
        .collect()
}

fn random_printable<R: RandomSource + ?Sized>(rng: &mut R) -> char {
    let span = PRINTABLE_END - PRINTABLE_START;
    let code = PRINTABLE_START + rng.next_i32().unsigned_abs() % span;
    // always ASCII
    char::from_u32(code).unwrap_or(' ')
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;
    use proptest::prelude::*;

    /// Replays a fixed sequence of draws.
    struct ScriptedRng {
        floats: Vec<f64>,
        ints: Vec<i32>,
        fi: usize,
        ii: usize,
    }

    impl ScriptedRng {
        fn new(floats: &[f64], ints: &[i32]) -> Self {
            Self {
                floats: floats.to_vec(),
                ints: ints.to_vec(),
                fi: 0,
                ii: 0,
            }
        }
    }

    impl RandomSource for ScriptedRng {
        fn next_f64(&mut self) -> f64 {
            let v = self.floats[self.fi % self.floats.len()];
            self.fi += 1;
            v
        }

        fn next_i32(&mut self) -> i32 {
            let v = self.ints[self.ii % self.ints.len()];
            self.ii += 1;
            v
        }
    }

    // ---- split_lines ----

    #[test]
    fn test_split_lines_handles_crlf_and_empty() {
        assert_eq!(split_lines("a\r\nb\nc"), vec!["a", "b", "c"]);
        assert_eq!(split_lines(""), vec![""]);
        assert_eq!(split_lines("a\n"), vec!["a", ""]);
    }

    // ---- crossover ----

    #[test]
    fn test_crossover_fixed_sequence() {
        // a has 3 lines, b has 2: a is chosen when the side draw < 0.6
        // step 1: emit, side a  -> "A"
        // step 2: skip, side b  -> (X skipped)
        // step 3: emit, side b  -> "Y", b exhausted
        let mut rng = ScriptedRng::new(&[0.1, 0.2, 0.9, 0.7, 0.3, 0.8], &[0]);
        let child = crossover_lines("A\nB\nC", "X\nY", &mut rng);
        assert_eq!(child, "A\nY");
        assert_eq!(rng.fi, 6);
    }

    #[test]
    fn test_crossover_all_from_a_until_exhausted() {
        let mut rng = ScriptedRng::new(&[0.0], &[0]);
        let child = crossover_lines("A\nB\nC", "X\nY", &mut rng);
        assert_eq!(child, "A\nB\nC");
    }

    #[test]
    fn test_crossover_never_emitting_gives_empty() {
        let mut rng = ScriptedRng::new(&[0.99], &[0]);
        let child = crossover_lines("A\nB", "X\nY", &mut rng);
        assert_eq!(child, "");
    }

    #[test]
    fn test_crossover_mixes_both_parents() {
        let a = "a1\na2\na3\na4\na5\na6\na7\na8";
        let b = "b1\nb2\nb3\nb4\nb5\nb6\nb7\nb8";
        let mut rng = create_rng(42);
        let mut saw_a = false;
        let mut saw_b = false;
        for _ in 0..50 {
            let child = crossover_lines(a, b, &mut rng);
            saw_a |= child.lines().any(|l| l.starts_with('a'));
            saw_b |= child.lines().any(|l| l.starts_with('b'));
        }
        assert!(saw_a && saw_b);
    }

    #[test]
    fn test_crossover_prefers_longer_parent() {
        let long: String = (0..40).map(|i| format!("L{i}")).collect::<Vec<_>>().join("\n");
        let short = "S0\nS1\nS2\nS3";
        let mut rng = create_rng(7);
        let (mut from_long, mut from_short) = (0usize, 0usize);
        for _ in 0..200 {
            let child = crossover_lines(&long, short, &mut rng);
            from_long += child.lines().filter(|l| l.starts_with('L')).count();
            from_short += child.lines().filter(|l| l.starts_with('S')).count();
        }
        assert!(from_long > from_short, "long={from_long} short={from_short}");
    }

    // ---- mutation ----

    #[test]
    fn test_mutation_rate_zero_is_identity() {
        let text = "fn main() { println!(\"hi\"); }";
        let mut rng = create_rng(5);
        assert_eq!(mutate_chars(text, 0.0, &mut rng), text);
    }

    #[test]
    fn test_mutation_rate_one_replaces_every_position() {
        // every replacement maps to code 32 + 3 = '#'
        let mut rng = ScriptedRng::new(&[0.0], &[3]);
        let out = mutate_chars("abc\n", 1.0, &mut rng);
        assert_eq!(out, "####");
    }

    #[test]
    fn test_mutation_range_bounds() {
        let mut rng = ScriptedRng::new(&[0.0], &[i32::MIN, i32::MAX, -1, 93, 94]);
        let out: Vec<u32> = mutate_chars("abcde", 1.0, &mut rng)
            .chars()
            .map(|c| c as u32)
            .collect();
        for code in &out {
            assert!((PRINTABLE_START..PRINTABLE_END).contains(code));
        }
        assert_eq!(out[3], 125);
        assert_eq!(out[4], 32);
    }

    #[test]
    fn test_mutation_handles_multibyte_text() {
        let mut rng = create_rng(9);
        let out = mutate_chars("héllo wörld", 0.5, &mut rng);
        assert_eq!(out.chars().count(), "héllo wörld".chars().count());
    }

    proptest! {
        #[test]
        fn prop_mutation_preserves_length(text in ".{0,64}", rate in 0.0f64..=1.0, seed in any::<u64>()) {
            let mut rng = create_rng(seed);
            let out = mutate_chars(&text, rate, &mut rng);
            prop_assert_eq!(out.chars().count(), text.chars().count());
        }

        #[test]
        fn prop_crossover_line_bound(
            a in proptest::collection::vec("[a-z]{0,8}", 1..12),
            b in proptest::collection::vec("[a-z]{0,8}", 1..12),
            seed in any::<u64>(),
        ) {
            let (a, b) = (a.join("\n"), b.join("\n"));
            let mut rng = create_rng(seed);
            let child = crossover_lines(&a, &b, &mut rng);
            let bound = split_lines(&a).len() + split_lines(&b).len();
            prop_assert!(split_lines(&child).len() <= bound);
        }
    }
}
