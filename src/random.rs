use tracing::debug;

use crate::{alphabet::Alphabet, builder::MooreBuilder, error::Result, MooreMachine};

/// Parameters for [`generate_random_moore`].
#[derive(Debug, Clone, PartialEq)]
pub struct RandomMooreConfig {
    /// Number of states of the generated machine.
    pub states: usize,
    /// Number of distinct input symbols, see [`random_alphabet`].
    pub symbols: usize,
    /// Outputs are drawn uniformly from `0..outputs`.
    pub outputs: usize,
    /// Probability with which a transition is present for a given state and symbol. A value
    /// of `1.0` or more yields complete machines.
    pub density: f64,
    /// Seed of the random number generator, equal configurations produce equal machines.
    pub seed: u64,
}

impl Default for RandomMooreConfig {
    fn default() -> Self {
        Self {
            states: 8,
            symbols: 2,
            outputs: 2,
            density: 1.0,
            seed: 0,
        }
    }
}

/// The alphabet consisting of the first `symbols` lowercase letters, starting with `'a'`.
pub fn random_alphabet(symbols: usize) -> Alphabet<char> {
    ('a'..='z').take(symbols).collect()
}

/// Generates a random Moore machine of `config.states` states by drawing, for every state
/// and symbol, whether a transition exists and if so a uniformly chosen target. States are
/// labeled `"q0"`, `"q1"` and so on, and `"q0"` is initial. Note that some states may be
/// unreachable from the initial state.
///
/// Fails with [`crate::MooreError::NoInitialState`] if `config.states` is zero.
pub fn generate_random_moore(config: &RandomMooreConfig) -> Result<MooreMachine<char, usize>> {
    let mut rng = fastrand::Rng::with_seed(config.seed);
    let alphabet = random_alphabet(config.symbols);
    let mut builder = MooreBuilder::new();

    for q in 0..config.states {
        let output = rng.usize(..config.outputs.max(1));
        let handle = builder.state(format!("q{q}")).output(output);
        let mut handle = if q == 0 { handle.init() } else { handle };
        for sym in alphabet.universe() {
            if rng.f64() < config.density {
                let target = rng.usize(..config.states);
                handle = handle.to(*sym, format!("q{target}"))?;
            }
        }
    }

    let machine = builder.build()?;
    debug!(
        "generated random machine with {} states and {} transitions from seed {}",
        machine.size(),
        machine.transitions().count(),
        config.seed
    );
    Ok(machine)
}

/// Generates `number` random words over `alphabet`, the length of each word is drawn
/// uniformly from `min_len..=max_len`.
pub fn generate_random_words(
    alphabet: &Alphabet<char>,
    number: usize,
    min_len: usize,
    max_len: usize,
    seed: u64,
) -> Vec<Vec<char>> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let charset: Vec<char> = alphabet.universe().copied().collect();
    if charset.is_empty() {
        return vec![vec![]; number];
    }
    (0..number)
        .map(|_| {
            let length = rng.usize(min_len..=max_len);
            (0..length)
                .map(|_| charset[rng.usize(..charset.len())])
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MooreError;

    #[test_log::test]
    fn random_machines_respect_config() {
        let config = RandomMooreConfig {
            states: 12,
            symbols: 3,
            outputs: 4,
            density: 1.0,
            seed: 42,
        };
        let m = generate_random_moore(&config).unwrap();
        assert_eq!(m.size(), 12);
        assert!(m.is_complete_over(&random_alphabet(3)));
        assert!(m.states().all(|q| *m.output(q).unwrap() < 4));
        assert_eq!(m.label(m.initial_state().unwrap()).map(String::as_str), Some("q0"));
    }

    #[test_log::test]
    fn generation_is_reproducible() {
        let config = RandomMooreConfig {
            density: 0.6,
            seed: 7,
            ..Default::default()
        };
        assert_eq!(
            generate_random_moore(&config).unwrap(),
            generate_random_moore(&config).unwrap()
        );
    }

    #[test_log::test]
    fn sparse_machines_are_partial() {
        let config = RandomMooreConfig {
            density: 0.0,
            ..Default::default()
        };
        let m = generate_random_moore(&config).unwrap();
        assert_eq!(m.transitions().count(), 0);
        assert_eq!(m.size(), 8);
    }

    #[test_log::test]
    fn zero_states_have_no_initial_state() {
        let config = RandomMooreConfig {
            states: 0,
            ..Default::default()
        };
        assert_eq!(generate_random_moore(&config), Err(MooreError::NoInitialState));
    }

    #[test_log::test]
    fn random_words() {
        let alphabet = random_alphabet(2);
        let words = generate_random_words(&alphabet, 20, 1, 5, 3);
        assert_eq!(words.len(), 20);
        for word in &words {
            assert!((1..=5).contains(&word.len()));
            assert!(word.iter().all(|c| alphabet.contains(c)));
        }
        assert_eq!(words, generate_random_words(&alphabet, 20, 1, 5, 3));
    }
}
