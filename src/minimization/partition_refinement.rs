use tracing::{debug, trace};

use crate::{
    error::Result,
    math::{Bijection, OrderedMap, Partition},
    Label, MooreMachine, Output, StateId, Symbol,
};

/// Computes the coarsest partition of the states of `machine` that is compatible with the
/// outputs and the transitions, using Moore's algorithm.
///
/// We start by grouping states by their output. In each round, every state is assigned a
/// signature consisting of its current class together with, for every symbol, the class of
/// its successor (or nothing if the transition is undefined). States with equal signatures
/// stay together. As the signature contains the current class, each round refines the
/// previous partition, so once the number of classes stays the same, we have reached the
/// fixed point. This happens after at most as many rounds as there are states.
pub(crate) fn moore_partition_refinement<A: Symbol, O: Output, L: Label>(
    machine: &MooreMachine<A, O, L>,
) -> Partition {
    let alphabet = machine.alphabet();
    let outputs: Vec<&O> = machine.states().map(|q| machine.raw_output(q)).collect();
    let mut partition = Partition::from_keys(&outputs);
    trace!(
        "initial partition by output has {} classes: {partition}",
        partition.size()
    );

    let mut round = 0;
    loop {
        round += 1;
        let class_of = partition.assignment();
        let signatures: Vec<(usize, Vec<Option<usize>>)> = machine
            .states()
            .map(|q| {
                let edges = machine.raw_edges(q);
                (
                    class_of[q.index()],
                    alphabet
                        .universe()
                        .map(|sym| edges.get(sym).map(|p| class_of[p.index()]))
                        .collect(),
                )
            })
            .collect();

        let refined = Partition::from_hashable_keys(&signatures);
        trace!(
            "refinement round {round} split {} classes into {}",
            partition.size(),
            refined.size()
        );
        if refined.size() == partition.size() {
            debug!(
                "partition refinement stabilized after {round} rounds with {} classes",
                refined.size()
            );
            return refined;
        }
        partition = refined;
    }
}

/// Builds the machine whose states are the classes of `partition`. The partition has to be
/// a congruence, i.e. states in the same class have the same output and their successors on
/// each symbol lie in the same class, which is what [`moore_partition_refinement`] produces.
/// The smallest member of each class serves as its representative: it determines the
/// outgoing transitions and lends its label to the class.
pub(crate) fn quotient<A: Symbol, O: Output, L: Label>(
    machine: &MooreMachine<A, O, L>,
    partition: &Partition,
) -> Result<MooreMachine<A, O, L>> {
    let class_of = partition.assignment();
    let representatives = partition.representatives();

    let outputs = representatives
        .iter()
        .map(|rep| machine.raw_output(*rep).clone())
        .collect();
    let edges = representatives
        .iter()
        .map(|rep| {
            machine
                .raw_edges(*rep)
                .iter()
                .map(|(sym, p)| (sym.clone(), StateId::new(class_of[p.index()])))
                .collect::<OrderedMap<_, _>>()
        })
        .collect();
    let mut labels = Bijection::new();
    for (class, rep) in representatives.iter().enumerate() {
        if let Some(label) = machine.label(*rep) {
            labels.insert(label.clone(), StateId::new(class));
        }
    }
    let initial = StateId::new(class_of[machine.raw_initial().index()]);

    debug!(
        "merged {} states into {} classes",
        machine.size(),
        representatives.len()
    );
    MooreMachine::from_parts(outputs, edges, initial, labels)
}

#[cfg(test)]
mod tests {
    use super::moore_partition_refinement;
    use crate::prelude::*;

    #[test_log::test]
    fn refinement_needs_several_rounds() {
        let mut builder = MooreBuilder::new();
        builder.state("0").init().output('a').to(true, "1").unwrap().to(false, "0").unwrap();
        builder.state("1").output('a').to(true, "2").unwrap().to(false, "0").unwrap();
        builder.state("2").output('a').to(true, "2").unwrap().to(false, "3").unwrap();
        builder.state("3").output('b').to(true, "0").unwrap().to(false, "0").unwrap();
        let m = builder.build().unwrap();

        let partition = moore_partition_refinement(&m);
        assert_eq!(partition.size(), 4);
        assert_eq!(m.minimize().unwrap(), m);
    }

    #[test_log::test]
    fn equal_outputs_and_successors_merge() {
        let mut builder = MooreBuilder::new();
        builder.state("0").init().output('a').to(true, "1").unwrap().to(false, "0").unwrap();
        builder.state("1").output('a').to(true, "2").unwrap().to(false, "0").unwrap();
        builder.state("2").output('a').to(true, "2").unwrap().to(false, "2").unwrap();
        let m = builder.build().unwrap();

        let partition = moore_partition_refinement(&m);
        assert_eq!(partition.size(), 1);
        assert_eq!(partition.representatives(), vec![StateId::new(0)]);
    }

    #[test_log::test]
    fn no_transitions_at_all() {
        let mut builder: MooreBuilder<u8, _> = MooreBuilder::new();
        builder.state("a").init().output(1);
        builder.state("b").output(2);
        builder.state("c").output(1);
        let m = builder.build().unwrap();
        let partition = moore_partition_refinement(&m);
        assert!(partition.equivalent(StateId::new(0), StateId::new(2)));
        assert_eq!(partition.size(), 2);
        assert_eq!(m.minimize().unwrap().size(), 2);
    }
}
