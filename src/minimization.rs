pub(crate) mod partition_refinement;

use crate::{error::Result, math::Partition, Label, MooreMachine, Output, Symbol};

impl<A: Symbol, O: Output, L: Label> MooreMachine<A, O, L> {
    /// Returns the unique minimal Moore machine that is bisimilar to `self`, meaning that
    /// every state of `self` produces the same outputs on every finite word as the state of
    /// the result that it was merged into. This is done using Moore's partition refinement
    /// algorithm.
    ///
    /// A transition that is defined in one state and undefined in another distinguishes
    /// the two states. To merge such states, [`Self::complete`] the machine first.
    ///
    /// The result is canonical for a given input: states of the result are ordered by the
    /// smallest state they contain and carry the label of that state, so minimizing twice
    /// yields a machine that is equal to the one obtained by minimizing once.
    pub fn minimize(&self) -> Result<Self> {
        minimize(self)
    }

    /// Computes the coarsest partition of the states of `self` into classes of states that
    /// produce the same output on every word. This is the partition that [`Self::minimize`]
    /// uses to merge states.
    pub fn equivalence_partition(&self) -> Result<Partition> {
        self.validate()?;
        Ok(partition_refinement::moore_partition_refinement(self))
    }
}

/// Minimizes `machine`, see [`MooreMachine::minimize`].
pub fn minimize<A: Symbol, O: Output, L: Label>(
    machine: &MooreMachine<A, O, L>,
) -> Result<MooreMachine<A, O, L>> {
    machine.validate()?;
    let partition = partition_refinement::moore_partition_refinement(machine);
    partition_refinement::quotient(machine, &partition)
}

#[cfg(test)]
mod tests {
    use crate::{
        prelude::*,
        tests::{readme_machine, redundant_machine},
    };

    #[test_log::test]
    fn readme_machine_is_already_minimal() {
        let m = readme_machine();
        let partition = m.equivalence_partition().unwrap();
        assert!(!partition.equivalent(m.find("s0").unwrap(), m.find("s1").unwrap()));

        let min = m.minimize().unwrap();
        assert_eq!(min.size(), 3);
        assert_eq!(min, m);
        assert_eq!(min.minimize().unwrap(), min);
        assert!(min.bisimilar(&m));
    }

    #[test_log::test]
    fn redundant_states_are_merged() {
        let m = redundant_machine();
        let min = minimize(&m).unwrap();
        assert_eq!(min.size(), 3);
        assert!(min.bisimilar(&m));
        assert!(min.bisimilar(&readme_machine()));

        let labels: Vec<_> = min.states().map(|q| min.label(q).cloned()).collect();
        assert_eq!(
            labels,
            vec![
                Some("q0".to_string()),
                Some("q1".to_string()),
                Some("q2".to_string())
            ]
        );
        let words: [&[u8]; 6] = [&[0], &[1], &[0, 0, 0], &[1, 1, 1], &[0, 1, 1], &[1, 0, 0, 0]];
        for word in words {
            assert_eq!(m.run(word).outputs(), min.run(word).outputs());
        }
        assert_eq!(min.minimize().unwrap(), min);
    }

    #[test_log::test]
    fn collapses_to_single_state() {
        let mut builder = MooreBuilder::new();
        builder.state("p").init().output("a").to(0, "q").unwrap().to(1, "q").unwrap();
        builder.state("q").output("a").to(1, "p").unwrap().to(0, "q").unwrap();
        let m = builder.build().unwrap();
        let min = m.minimize().unwrap();
        assert_eq!(min.size(), 1);
        assert_eq!(min.transition(StateId::new(0), &0), Ok(Some(StateId::new(0))));
        assert_eq!(min.transitions().count(), 2);
        assert!(min.bisimilar(&m));
    }

    #[test_log::test]
    fn partiality_distinguishes_states() {
        let mut builder = MooreBuilder::new();
        builder.state("p").init().output(0).to('a', "q").unwrap();
        builder.state("q").output(0).to('a', "r").unwrap();
        builder.state("r").output(0);
        let m = builder.build().unwrap();
        assert_eq!(m.minimize().unwrap().size(), 3);

        let completed = m.complete(Alphabet::from(['a']), 0).unwrap();
        assert_eq!(completed.size(), 4);
        assert_eq!(completed.minimize().unwrap().size(), 1);
    }

    #[test_log::test]
    fn initial_class_follows_initial_state() {
        let mut builder = MooreBuilder::new();
        builder.state("x").output(1).to('a', "y").unwrap();
        builder.state("y").output(1).to('a', "x").unwrap();
        builder.state("z").init().output(2).to('a', "y").unwrap();
        let m = builder.build().unwrap();
        let min = m.minimize().unwrap();
        assert_eq!(min.size(), 2);
        assert_eq!(min.initial_state(), Ok(StateId::new(1)));
        assert_eq!(min.label(StateId::new(1)).map(String::as_str), Some("z"));
        assert_eq!(min.map(&['a', 'a']), Some(&1));
    }
}
