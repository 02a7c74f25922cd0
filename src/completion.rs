use tracing::debug;

use crate::{
    alphabet::Alphabet,
    error::{MooreError, Result},
    math::{Bijection, OrderedMap},
    Label, MooreMachine, Output, StateId, Symbol,
};

impl<A: Symbol, O: Output, L: Label> MooreMachine<A, O, L> {
    /// Makes the transition function total over `alphabet`, see [`complete`].
    pub fn complete(&self, alphabet: impl Into<Alphabet<A>>, sink_output: O) -> Result<Self> {
        complete(self, alphabet, sink_output)
    }
}

/// Produces a machine in which every state has a transition on every symbol of `alphabet`.
/// All transitions that are missing in `machine` are redirected to a single new sink state,
/// which emits `sink_output` and loops on every symbol of `alphabet`. The sink is appended
/// after the existing states and has no label. Transitions on symbols outside of `alphabet`
/// are kept as they are.
///
/// If `machine` is already complete over `alphabet`, an identical machine is returned and no
/// sink is added. Completing over an empty alphabet fails with [`MooreError::EmptyAlphabet`].
///
/// # Example
/// ```
/// use moore::prelude::*;
///
/// let mut builder = MooreBuilder::new();
/// builder.state("on").init().output(true).to('t', "off")?;
/// builder.state("off").output(false).to('t', "on")?;
/// let machine = builder.build()?;
///
/// let completed = complete(&machine, ['t', 'x'], false)?;
/// assert_eq!(completed.size(), 3);
/// assert!(completed.is_complete_over(&Alphabet::from(['t', 'x'])));
/// # Ok::<(), MooreError>(())
/// ```
pub fn complete<A: Symbol, O: Output, L: Label>(
    machine: &MooreMachine<A, O, L>,
    alphabet: impl Into<Alphabet<A>>,
    sink_output: O,
) -> Result<MooreMachine<A, O, L>> {
    let alphabet = alphabet.into();
    machine.validate()?;
    if alphabet.is_empty() && machine.size() > 0 {
        return Err(MooreError::EmptyAlphabet(machine.size()));
    }
    if machine.is_complete_over(&alphabet) {
        debug!("machine is already complete over {alphabet:?}");
        return Ok(machine.clone());
    }

    let sink = StateId::new(machine.size());
    let mut missing = 0;
    let mut edges: Vec<OrderedMap<A, StateId>> = machine
        .states()
        .map(|q| {
            let mut edges = machine.raw_edges(q).clone();
            for sym in alphabet.universe() {
                if !edges.contains_key(sym) {
                    edges.insert(sym.clone(), sink);
                    missing += 1;
                }
            }
            edges
        })
        .collect();
    edges.push(
        alphabet
            .universe()
            .map(|sym| (sym.clone(), sink))
            .collect(),
    );

    let mut outputs: Vec<O> = machine
        .states()
        .map(|q| machine.raw_output(q).clone())
        .collect();
    outputs.push(sink_output);

    let mut labels = Bijection::new();
    for q in machine.states() {
        if let Some(label) = machine.label(q) {
            labels.insert(label.clone(), q);
        }
    }

    debug!("redirected {missing} missing transitions to new sink {sink}");
    MooreMachine::from_parts(outputs, edges, machine.raw_initial(), labels)
}
