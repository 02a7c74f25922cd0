use moore::{
    prelude::*,
    random::{generate_random_moore, generate_random_words, random_alphabet, RandomMooreConfig},
};

fn configs() -> impl Iterator<Item = RandomMooreConfig> {
    (0..40u64).map(|seed| RandomMooreConfig {
        states: 1 + (seed as usize % 13),
        symbols: 1 + (seed as usize % 3),
        outputs: 1 + (seed as usize % 4),
        density: if seed % 2 == 0 { 1.0 } else { 0.7 },
        seed,
    })
}

#[test_log::test]
fn minimization_is_idempotent_and_never_grows() {
    for config in configs() {
        let m = generate_random_moore(&config).unwrap();
        let min = m.minimize().unwrap();
        assert!(min.size() <= m.size(), "{config:?}");
        assert_eq!(min.minimize().unwrap(), min, "{config:?}");
        assert_eq!(min.equivalence_partition().unwrap().size(), min.size());
    }
}

#[test_log::test]
fn minimization_preserves_behavior() {
    for config in configs() {
        let m = generate_random_moore(&config).unwrap();
        let min = m.minimize().unwrap();
        let partition = m.equivalence_partition().unwrap();
        let words = generate_random_words(&random_alphabet(config.symbols), 25, 0, 8, config.seed);

        assert!(min.bisimilar(&m), "{config:?}");
        for word in &words {
            let (long, short) = (m.run(word), min.run(word));
            assert_eq!(long.outputs(), short.outputs(), "{config:?} on {word:?}");
            assert_eq!(long.successful(), short.successful());
        }
        for q in m.reachable_states() {
            let class = StateId::new(partition.class_of(q).unwrap());
            assert_eq!(m.output(q), min.output(class));
            for word in &words {
                assert_eq!(
                    m.run_from(q, word).unwrap().outputs(),
                    min.run_from(class, word).unwrap().outputs()
                );
            }
        }
    }
}

#[test_log::test]
fn completion_is_total_and_stable() {
    for config in configs() {
        let m = generate_random_moore(&config).unwrap();
        let alphabet = random_alphabet(config.symbols + 1);
        let completed = m.complete(alphabet.clone(), usize::MAX).unwrap();

        assert!(completed.is_complete_over(&alphabet));
        assert_eq!(completed.size(), m.size() + 1);
        for t in m.transitions() {
            assert_eq!(completed.transition(t.source, t.symbol), Ok(Some(t.target)));
        }
        for q in m.states() {
            assert_eq!(completed.output(q), m.output(q));
        }
        assert_eq!(completed.complete(alphabet.clone(), 0).unwrap(), completed);

        let min = completed.minimize().unwrap();
        assert!(min.size() <= completed.size());
        assert!(min.is_complete_over(&alphabet));
    }
}

#[test_log::test]
fn readme_scenario() {
    let mut builder = MooreBuilder::new();
    builder.state("s0").init().output("a").to(0u8, "s1").unwrap().to(1, "s0").unwrap();
    builder.state("s1").output("a").to(0, "any-name").unwrap().to(1, "s1").unwrap();
    builder.state("any-name").output("b").to(0, "s0").unwrap().to(1, "s0").unwrap();
    let m = builder.build().unwrap();

    assert_eq!(m.minimize().unwrap().size(), 3);
    let completed = m.complete([0u8, 1, 2], "sink").unwrap();
    assert_eq!(completed.size(), 4);
    assert_eq!(completed.map(&[2, 0]), Some(&"sink"));
}
