use std::{borrow::Borrow, collections::VecDeque, fmt::Debug};

use bit_set::BitSet;
use itertools::Itertools;
use owo_colors::OwoColorize;
use tracing::trace;

use crate::{
    alphabet::Alphabet,
    error::{MooreError, Result},
    math::{Bijection, OrderedMap, Set},
    Label, Output, Symbol,
};

/// Identifies a state of a [`MooreMachine`]. States are numbered densely starting from `0`,
/// in the order in which they were declared.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct StateId(usize);

impl StateId {
    /// Creates the id of the state with the given position.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// The position of the state.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "q{}", self.0)
    }
}

/// Implementors can be used to address a state of the machine `M`. This is implemented for
/// [`StateId`] as well as for references to labels, so states can be queried by the name
/// they were given in the [`crate::MooreBuilder`].
pub trait Indexes<M> {
    /// Returns the [`StateId`] that `self` refers to, or `None` if there is no such state in `machine`.
    fn to_index(&self, machine: &M) -> Option<StateId>;
    /// A human readable rendering of `self`, used in error messages.
    fn describe(&self) -> String;
}

impl<A: Symbol, O: Output, L: Label> Indexes<MooreMachine<A, O, L>> for StateId {
    fn to_index(&self, machine: &MooreMachine<A, O, L>) -> Option<StateId> {
        (self.0 < machine.size()).then_some(*self)
    }
    fn describe(&self) -> String {
        self.to_string()
    }
}

impl<'a, A: Symbol, O: Output, L: Label> Indexes<MooreMachine<A, O, L>> for &'a L {
    fn to_index(&self, machine: &MooreMachine<A, O, L>) -> Option<StateId> {
        machine.find(*self)
    }
    fn describe(&self) -> String {
        format!("{:?}", self)
    }
}

impl<'a, A: Symbol, O: Output> Indexes<MooreMachine<A, O, String>> for &'a str {
    fn to_index(&self, machine: &MooreMachine<A, O, String>) -> Option<StateId> {
        machine.find(*self)
    }
    fn describe(&self) -> String {
        format!("{:?}", self)
    }
}

/// A single transition of a [`MooreMachine`], going from `source` to `target` on `symbol`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transition<'a, A> {
    /// The state in which the transition originates.
    pub source: StateId,
    /// The input symbol that triggers the transition.
    pub symbol: &'a A,
    /// The successor state.
    pub target: StateId,
}

/// A deterministic Moore machine over input symbols of type `A`, where each state emits an
/// output of type `O`. States may carry a label of type `L`, which is how they were named
/// in the [`crate::MooreBuilder`].
///
/// Once constructed, a machine is immutable. It is guaranteed to have at least one state,
/// precisely one initial state and an output for every state. The transition function may be
/// partial, meaning for some state and symbol there might be no successor. Whether a machine
/// is complete can only be decided relative to an [`Alphabet`], see [`Self::is_complete_over`].
#[derive(Clone)]
pub struct MooreMachine<A: Symbol, O: Output, L: Label = String> {
    outputs: Vec<O>,
    edges: Vec<OrderedMap<A, StateId>>,
    initial: StateId,
    labels: Bijection<L, StateId>,
}

impl<A: Symbol, O: Output, L: Label> MooreMachine<A, O, L> {
    /// Assembles a machine from its parts and checks that all invariants hold.
    pub(crate) fn from_parts(
        outputs: Vec<O>,
        edges: Vec<OrderedMap<A, StateId>>,
        initial: StateId,
        labels: Bijection<L, StateId>,
    ) -> Result<Self> {
        let machine = Self::from_parts_unchecked(outputs, edges, initial, labels);
        machine.validate()?;
        Ok(machine)
    }

    pub(crate) fn from_parts_unchecked(
        outputs: Vec<O>,
        edges: Vec<OrderedMap<A, StateId>>,
        initial: StateId,
        labels: Bijection<L, StateId>,
    ) -> Self {
        Self {
            outputs,
            edges,
            initial,
            labels,
        }
    }

    /// Checks the structural invariants: every state has an output, the initial state exists
    /// and all transitions and labels point to existing states.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.outputs.len() != self.edges.len() {
            return Err(MooreError::InvalidModel(format!(
                "{} states have an output but {} have a transition table",
                self.outputs.len(),
                self.edges.len()
            )));
        }
        if self.initial.index() >= self.size() {
            return Err(MooreError::InvalidModel(format!(
                "initial state {} is not among the {} states",
                self.initial,
                self.size()
            )));
        }
        for t in self.transitions() {
            if t.target.index() >= self.size() {
                return Err(MooreError::InvalidModel(format!(
                    "transition from {} on {:?} leads to unknown state {}",
                    t.source, t.symbol, t.target
                )));
            }
        }
        if let Some((label, q)) = self.labels.iter().find(|(_, q)| q.index() >= self.size()) {
            return Err(MooreError::InvalidModel(format!(
                "label {label:?} names unknown state {q}"
            )));
        }
        Ok(())
    }

    pub(crate) fn unknown<I: Indexes<Self>>(state: &I) -> MooreError {
        MooreError::UnknownState(state.describe())
    }

    pub(crate) fn raw_output(&self, state: StateId) -> &O {
        &self.outputs[state.index()]
    }

    pub(crate) fn raw_edges(&self, state: StateId) -> &OrderedMap<A, StateId> {
        &self.edges[state.index()]
    }

    pub(crate) fn raw_initial(&self) -> StateId {
        self.initial
    }

    /// Gives the number of states.
    pub fn size(&self) -> usize {
        self.outputs.len()
    }

    /// Returns an iterator over all states in ascending order.
    pub fn states(&self) -> impl Iterator<Item = StateId> + Clone {
        (0..self.size()).map(StateId::new)
    }

    /// Returns the designated initial state.
    pub fn initial_state(&self) -> Result<StateId> {
        if self.initial.index() < self.size() {
            Ok(self.initial)
        } else {
            Err(MooreError::InvalidModel(format!(
                "initial state {} does not exist",
                self.initial
            )))
        }
    }

    /// Returns the output of the given state.
    pub fn output<I: Indexes<Self>>(&self, state: I) -> Result<&O> {
        let q = state.to_index(self).ok_or_else(|| Self::unknown(&state))?;
        Ok(&self.outputs[q.index()])
    }

    /// Returns the successor of `state` on `symbol`. An undefined transition of a partial
    /// machine yields `Ok(None)`, whereas querying a state that does not exist is an error.
    pub fn transition<I: Indexes<Self>>(&self, state: I, symbol: &A) -> Result<Option<StateId>> {
        let q = state.to_index(self).ok_or_else(|| Self::unknown(&state))?;
        Ok(self.edges[q.index()].get(symbol).copied())
    }

    /// Iterates over the transitions leaving `state` in the order they were declared.
    pub fn transitions_from<I: Indexes<Self>>(
        &self,
        state: I,
    ) -> Result<impl Iterator<Item = Transition<'_, A>> + Clone> {
        let source = state.to_index(self).ok_or_else(|| Self::unknown(&state))?;
        Ok(self.edges[source.index()]
            .iter()
            .map(move |(symbol, target)| Transition {
                source,
                symbol,
                target: *target,
            }))
    }

    /// Returns a lazy iterator over all transitions. States are visited in ascending order
    /// and the transitions of each state in the order they were declared. The iterator can
    /// be cloned, and calling this method again starts over.
    pub fn transitions(&self) -> Transitions<'_, A> {
        Transitions {
            edges: &self.edges,
            source: 0,
            inner: self.edges.first().map(|e| e.iter()),
        }
    }

    /// Returns the label of `state`. States introduced by transformations, like the sink of
    /// [`Self::complete`], do not have a label.
    pub fn label(&self, state: StateId) -> Option<&L> {
        self.labels.get_by_right(&state)
    }

    /// Looks up the state that carries the given label.
    pub fn find<Q>(&self, label: &Q) -> Option<StateId>
    where
        L: Borrow<Q>,
        Q: std::hash::Hash + Eq + ?Sized,
    {
        self.labels.get_by_left(label).copied()
    }

    /// Collects all symbols that appear on some transition, in the order of [`Self::transitions`].
    pub fn alphabet(&self) -> Alphabet<A> {
        self.transitions().map(|t| t.symbol.clone()).collect()
    }

    /// Collects the distinct outputs of all states, in ascending state order.
    pub fn output_alphabet(&self) -> Vec<O> {
        let mut out: Vec<O> = vec![];
        for o in &self.outputs {
            if !out.contains(o) {
                out.push(o.clone());
            }
        }
        out
    }

    /// Returns true if every state has a transition for every symbol of `alphabet`.
    pub fn is_complete_over(&self, alphabet: &Alphabet<A>) -> bool {
        self.edges
            .iter()
            .all(|e| alphabet.universe().all(|sym| e.contains_key(sym)))
    }

    /// Returns the states that can be reached from the initial state, in breadth-first order.
    pub fn reachable_states(&self) -> Vec<StateId> {
        let mut seen = BitSet::with_capacity(self.size());
        let mut queue = VecDeque::from([self.initial]);
        let mut out = vec![];
        seen.insert(self.initial.index());
        while let Some(q) = queue.pop_front() {
            out.push(q);
            for target in self.edges[q.index()].values() {
                if seen.insert(target.index()) {
                    queue.push_back(*target);
                }
            }
        }
        out
    }

    /// Reads `word` starting in `state` and records the visited states together with their
    /// outputs. The run contains one more state than symbols were read, as the output of the
    /// state in which the run starts is emitted as well. If some transition is undefined, the
    /// run stops there and is marked as unsuccessful.
    pub fn run_from<'w, I, W>(&self, state: I, word: W) -> Result<Run<O>>
    where
        I: Indexes<Self>,
        W: IntoIterator<Item = &'w A>,
        A: 'w,
    {
        let mut q = state.to_index(self).ok_or_else(|| Self::unknown(&state))?;
        let mut states = vec![q];
        let mut outputs = vec![self.outputs[q.index()].clone()];
        for symbol in word {
            match self.edges[q.index()].get(symbol) {
                Some(p) => {
                    q = *p;
                    states.push(q);
                    outputs.push(self.outputs[q.index()].clone());
                }
                None => {
                    trace!("run got stuck in {q} on {symbol:?}");
                    return Ok(Run {
                        states,
                        outputs,
                        successful: false,
                    });
                }
            }
        }
        Ok(Run {
            states,
            outputs,
            successful: true,
        })
    }

    /// Runs `word` from the initial state, see [`Self::run_from`].
    pub fn run<'w, W>(&self, word: W) -> Run<O>
    where
        W: IntoIterator<Item = &'w A>,
        A: 'w,
    {
        let mut q = self.initial;
        let mut states = vec![q];
        let mut outputs = vec![self.outputs[q.index()].clone()];
        for symbol in word {
            let Some(p) = self.edges[q.index()].get(symbol) else {
                return Run {
                    states,
                    outputs,
                    successful: false,
                };
            };
            q = *p;
            states.push(q);
            outputs.push(self.outputs[q.index()].clone());
        }
        Run {
            states,
            outputs,
            successful: true,
        }
    }

    /// Runs the given `word` from the initial state. If the run is successful, the output of
    /// the state that it reaches is returned, otherwise `None`.
    pub fn map<'w, W>(&self, word: W) -> Option<&O>
    where
        W: IntoIterator<Item = &'w A>,
        A: 'w,
    {
        let mut q = self.initial;
        for symbol in word {
            q = *self.edges[q.index()].get(symbol)?;
        }
        Some(&self.outputs[q.index()])
    }

    /// Returns true if `self` and `other` produce the same outputs for every finite word,
    /// see [`Self::witness_non_bisimilarity`].
    pub fn bisimilar<M: Label>(&self, other: &MooreMachine<A, O, M>) -> bool {
        self.witness_non_bisimilarity(other).is_none()
    }

    /// Returns a shortest word on which `self` and `other` behave differently, either because
    /// the reached states have different outputs or because the word can be read in only one
    /// of the two machines. If the machines are bisimilar, `None` is returned.
    pub fn witness_non_bisimilarity<M: Label>(
        &self,
        other: &MooreMachine<A, O, M>,
    ) -> Option<Vec<A>> {
        let mut alphabet = self.alphabet();
        alphabet.extend(other.alphabet().universe().cloned());

        let start = (self.initial, other.initial);
        let mut seen: Set<(StateId, StateId)> = Set::default();
        seen.insert(start);
        let mut queue = VecDeque::from([(start, vec![])]);

        while let Some(((p, q), word)) = queue.pop_front() {
            if self.outputs[p.index()] != other.outputs[q.index()] {
                return Some(word);
            }
            for sym in alphabet.universe() {
                let successors = (
                    self.edges[p.index()].get(sym),
                    other.edges[q.index()].get(sym),
                );
                let mut extended = word.clone();
                extended.push(sym.clone());
                match successors {
                    (Some(p2), Some(q2)) => {
                        if seen.insert((*p2, *q2)) {
                            queue.push_back(((*p2, *q2), extended));
                        }
                    }
                    (None, None) => {}
                    _ => return Some(extended),
                }
            }
        }
        None
    }

    /// Renders the transition table of `self`, rows are states and columns are symbols.
    pub fn transition_table(&self) -> String {
        let alphabet = self.alphabet();
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(
            ["State".to_string(), "Output".to_string()]
                .into_iter()
                .chain(alphabet.universe().map(|sym| format!("{sym:?}"))),
        );
        for q in self.states() {
            let name = match self.label(q) {
                Some(label) => format!("{q} {label:?}"),
                None => q.to_string(),
            };
            let name = if q == self.initial {
                name.bold().to_string()
            } else {
                name
            };
            let mut row = vec![name, format!("{:?}", self.outputs[q.index()])];
            row.extend(alphabet.universe().map(|sym| {
                self.edges[q.index()]
                    .get(sym)
                    .map_or("-".to_string(), |p| p.to_string())
            }));
            builder.push_record(row);
        }
        builder
            .build()
            .with(tabled::settings::Style::rounded())
            .to_string()
    }
}

/// Two machines are equal if they are structurally identical: they have the same states in the
/// same order with the same outputs, labels, transitions and initial state.
impl<A: Symbol, O: Output, L: Label> PartialEq for MooreMachine<A, O, L> {
    fn eq(&self, other: &Self) -> bool {
        self.initial == other.initial
            && self.outputs == other.outputs
            && self.edges == other.edges
            && self.states().all(|q| self.label(q) == other.label(q))
    }
}
impl<A: Symbol, O: Output, L: Label> Eq for MooreMachine<A, O, L> {}

impl<A: Symbol, O: Output, L: Label> Debug for MooreMachine<A, O, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Initial state {}", self.initial)?;
        write!(f, "{}", self.transition_table())
    }
}

/// Iterator over all transitions of a [`MooreMachine`], see [`MooreMachine::transitions`].
#[derive(Clone)]
pub struct Transitions<'a, A> {
    edges: &'a [OrderedMap<A, StateId>],
    source: usize,
    inner: Option<indexmap::map::Iter<'a, A, StateId>>,
}

impl<'a, A> Iterator for Transitions<'a, A> {
    type Item = Transition<'a, A>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let inner = self.inner.as_mut()?;
            if let Some((symbol, target)) = inner.next() {
                return Some(Transition {
                    source: StateId::new(self.source),
                    symbol,
                    target: *target,
                });
            }
            self.source += 1;
            self.inner = self.edges.get(self.source).map(|e| e.iter());
        }
    }
}

/// The result of reading a word in a [`MooreMachine`], see [`MooreMachine::run_from`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run<O> {
    states: Vec<StateId>,
    outputs: Vec<O>,
    successful: bool,
}

impl<O> Run<O> {
    /// Returns true if the whole word could be read.
    pub fn successful(&self) -> bool {
        self.successful
    }

    /// The visited states, starting with the one in which the run began.
    pub fn states(&self) -> &[StateId] {
        &self.states
    }

    /// The outputs of the visited states.
    pub fn outputs(&self) -> &[O] {
        &self.outputs
    }

    /// The last state of the run. For unsuccessful runs, this is the state in which the
    /// missing transition was encountered.
    pub fn reached(&self) -> StateId {
        self.states[self.states.len() - 1]
    }

    /// Gives the emitted outputs if the run was successful.
    pub fn ok(self) -> Option<Vec<O>> {
        self.successful.then_some(self.outputs)
    }
}

impl<O: Debug> std::fmt::Display for Run<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}",
            self.states
                .iter()
                .zip(&self.outputs)
                .map(|(q, o)| format!("{q}|{o:?}"))
                .join(" -> "),
            if self.successful { "" } else { " -> !" }
        )
    }
}
