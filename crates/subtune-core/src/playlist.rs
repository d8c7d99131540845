//! Shuffle playlist generation.
//!
//! A playlist is a permutation of all subsong indices. The generator reseeds
//! its RNG on every call instead of advancing shared state, so a playlist can
//! always be rebuilt from the seed it was created with.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Generate a shuffled playlist over `0..songs`.
///
/// The same `(seed, songs)` pair always produces the same permutation.
/// Callers must not pass `songs == 0`; the sequencer guarantees a non-empty
/// collection before shuffle mode is entered.
pub fn generate(seed: u64, songs: usize) -> Vec<usize> {
    debug_assert!(songs > 0, "playlist requested for an empty collection");

    let mut playlist: Vec<usize> = (0..songs).collect();
    let mut rng = SmallRng::seed_from_u64(seed);
    playlist.shuffle(&mut rng);
    playlist
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playlist_is_permutation() {
        for songs in [1, 2, 7, 32, 100] {
            for seed in [0u64, 1, 42, u64::MAX] {
                let playlist = generate(seed, songs);
                assert_eq!(playlist.len(), songs);

                let mut sorted = playlist.clone();
                sorted.sort_unstable();
                let expected: Vec<usize> = (0..songs).collect();
                assert_eq!(
                    sorted, expected,
                    "playlist for seed {seed} / {songs} songs must contain every index exactly once"
                );
            }
        }
    }

    #[test]
    fn test_playlist_is_reproducible() {
        for seed in [0u64, 3, 1234567] {
            assert_eq!(
                generate(seed, 24),
                generate(seed, 24),
                "same seed must yield the same permutation"
            );
        }
    }

    #[test]
    fn test_neighbor_seeds_usually_differ() {
        // Not guaranteed for every seed, but these particular neighbors
        // produce distinct orders and catch a generator that ignores its seed.
        let a = generate(100, 16);
        let b = generate(101, 16);
        assert_ne!(a, b);
    }

    #[test]
    fn test_single_song_playlist() {
        assert_eq!(generate(9, 1), vec![0]);
    }
}
