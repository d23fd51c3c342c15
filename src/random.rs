use rand::Rng;

/// Draw one entry with probability proportional to its weight: a uniform draw
/// over `[0, total)` returns the first entry whose cumulative weight exceeds it.
///
/// Panics when `entries` is empty or every weight is zero; call sites guard
/// their candidate collections before invoking this.
pub fn weighted_pick<'a, T, R: Rng>(entries: &'a [(T, u32)], rng: &mut R) -> &'a T {
    let total: u32 = entries.iter().map(|(_, weight)| weight).sum();
    assert!(total > 0, "weighted_pick requires positive total weight");

    let draw = rng.gen_range(0..total);
    let mut cumulative = 0;
    for (candidate, weight) in entries {
        cumulative += weight;
        if draw < cumulative {
            return candidate;
        }
    }
    // Unreachable: draw < total and the cumulative sum reaches total.
    &entries[entries.len() - 1].0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn single_entry_always_wins() {
        let mut rng = StdRng::seed_from_u64(7);
        let entries = [("only", 3)];
        for _ in 0..10 {
            assert_eq!(*weighted_pick(&entries, &mut rng), "only");
        }
    }

    #[test]
    fn zero_weight_entries_never_win() {
        let mut rng = StdRng::seed_from_u64(11);
        let entries = [("never", 0), ("always", 5)];
        for _ in 0..50 {
            assert_eq!(*weighted_pick(&entries, &mut rng), "always");
        }
    }

    #[test]
    fn draw_frequencies_track_weights() {
        let mut rng = StdRng::seed_from_u64(42);
        let entries = [("light", 1), ("heavy", 9)];
        let mut heavy = 0;
        for _ in 0..1000 {
            if *weighted_pick(&entries, &mut rng) == "heavy" {
                heavy += 1;
            }
        }
        // Expect ~900; a generous band keeps the test deterministic per seed.
        assert!((800..=980).contains(&heavy), "heavy won {heavy} of 1000");
    }

    #[test]
    #[should_panic]
    fn empty_entries_panic() {
        let mut rng = StdRng::seed_from_u64(1);
        let entries: [(u8, u32); 0] = [];
        weighted_pick(&entries, &mut rng);
    }
}
