use tracing::{debug, warn};

use crate::{
    error::{MooreError, Result},
    math::{Bijection, OrderedMap},
    moore::{MooreMachine, StateId},
    Label, Output, Symbol,
};

/// Helper struct for the incremental construction of a [`MooreMachine`]. States are named by
/// labels of type `L` and are created the first time a label is mentioned, either through
/// [`Self::state`] or as the target of a transition. Each call to [`Self::state`] hands out a
/// [`StateHandle`] through which the output, the initial state and outgoing transitions can be
/// set in a chained fashion.
///
/// Consistency is checked in two stages. Declaring a second transition for the same state and
/// symbol fails right away, while missing outputs and a missing initial state are only
/// reported when the machine is frozen with [`Self::build`].
///
/// # Example
/// ```
/// use moore::prelude::*;
///
/// let mut builder = MooreBuilder::new();
/// builder.state("init").init().output("first").to(0, "init")?.to(1, "s1")?;
/// builder.state("s1").output("second").to(0, "init")?.to(1, "s1")?;
/// let machine = builder.build()?;
///
/// assert_eq!(machine.map(&[0, 1]), Some(&"second"));
/// # Ok::<(), MooreError>(())
/// ```
pub struct MooreBuilder<A: Symbol, O: Output, L: Label = String> {
    labels: Bijection<L, StateId>,
    outputs: Vec<Option<O>>,
    edges: Vec<OrderedMap<A, StateId>>,
    initial: Option<StateId>,
    redesignations: Vec<(StateId, StateId)>,
}

impl<A: Symbol, O: Output> MooreBuilder<A, O, String> {
    /// Creates an empty builder whose states are named by strings. For other label types,
    /// use [`Default::default`].
    pub fn new() -> Self {
        Self::default()
    }
}

impl<A: Symbol, O: Output, L: Label> Default for MooreBuilder<A, O, L> {
    fn default() -> Self {
        Self {
            labels: Bijection::new(),
            outputs: vec![],
            edges: vec![],
            initial: None,
            redesignations: vec![],
        }
    }
}

impl<A: Symbol, O: Output, L: Label> MooreBuilder<A, O, L> {
    /// Begins or resumes the declaration of the state named `label`. Mentioning the same
    /// label again refers to the same state.
    pub fn state(&mut self, label: impl Into<L>) -> StateHandle<'_, A, O, L> {
        let state = self.intern(label.into());
        StateHandle {
            builder: self,
            state,
        }
    }

    /// Returns the number of states declared so far.
    pub fn size(&self) -> usize {
        self.outputs.len()
    }

    /// Returns true if a state with the given label has been declared.
    pub fn contains(&self, label: &L) -> bool {
        self.labels.contains_left(label)
    }

    /// Lists every time the initial state was moved from one state to another, as pairs of
    /// the previous and the new initial state.
    pub fn initial_redesignations(&self) -> &[(StateId, StateId)] {
        &self.redesignations
    }

    fn intern(&mut self, label: L) -> StateId {
        if let Some(q) = self.labels.get_by_left(&label) {
            return *q;
        }
        let q = StateId::new(self.outputs.len());
        self.outputs.push(None);
        self.edges.push(OrderedMap::default());
        self.labels.insert(label, q);
        q
    }

    fn describe(&self, state: StateId) -> String {
        self.labels
            .get_by_right(&state)
            .map_or_else(|| state.to_string(), |label| format!("{label:?}"))
    }

    /// Freezes `self` into an immutable [`MooreMachine`]. States keep the order in which
    /// their labels were first mentioned. Fails with [`MooreError::NoInitialState`] if no
    /// state was marked as initial, and with [`MooreError::MissingOutput`] for the first
    /// state that never received an output.
    pub fn build(self) -> Result<MooreMachine<A, O, L>> {
        let initial = self.initial.ok_or(MooreError::NoInitialState)?;
        if !self.redesignations.is_empty() {
            warn!(
                "initial state was redesignated {} times, keeping {}",
                self.redesignations.len(),
                self.describe(initial)
            );
        }

        if let Some(q) = self.outputs.iter().position(Option::is_none) {
            return Err(MooreError::MissingOutput(self.describe(StateId::new(q))));
        }
        let outputs: Vec<O> = self.outputs.into_iter().flatten().collect();

        debug!(
            "building moore machine with {} states and {} transitions",
            outputs.len(),
            self.edges.iter().map(|e| e.len()).sum::<usize>()
        );
        MooreMachine::from_parts(outputs, self.edges, initial, self.labels)
    }
}

/// A handle on a single state of a [`MooreBuilder`], obtained through [`MooreBuilder::state`].
/// The handle borrows the builder, all modifications are applied to the builder directly.
pub struct StateHandle<'b, A: Symbol, O: Output, L: Label> {
    builder: &'b mut MooreBuilder<A, O, L>,
    state: StateId,
}

impl<'b, A: Symbol, O: Output, L: Label> StateHandle<'b, A, O, L> {
    /// The id that the state will have in the built machine.
    pub fn id(&self) -> StateId {
        self.state
    }

    /// Marks this state as the initial one. If another state was marked before, the latest
    /// designation wins and the change is remembered, so that [`MooreBuilder::build`] can
    /// warn about it.
    pub fn init(self) -> Self {
        match self.builder.initial {
            Some(previous) if previous != self.state => {
                debug!(
                    "moving initial state from {} to {}",
                    self.builder.describe(previous),
                    self.builder.describe(self.state)
                );
                self.builder.redesignations.push((previous, self.state));
            }
            _ => {}
        }
        self.builder.initial = Some(self.state);
        self
    }

    /// Assigns `value` as output of this state, replacing any previously assigned output.
    pub fn output(self, value: O) -> Self {
        self.builder.outputs[self.state.index()] = Some(value);
        self
    }

    /// Adds a transition on `symbol` to the state named `target`, which is created if it does
    /// not exist yet. As machines are deterministic, this fails with
    /// [`MooreError::DuplicateTransition`] if the state already has a transition on `symbol`,
    /// in which case the builder is left unchanged.
    pub fn to(self, symbol: A, target: impl Into<L>) -> Result<Self> {
        if self.builder.edges[self.state.index()].contains_key(&symbol) {
            return Err(MooreError::DuplicateTransition {
                state: self.builder.describe(self.state),
                symbol: format!("{symbol:?}"),
            });
        }
        let target = self.builder.intern(target.into());
        self.builder.edges[self.state.index()].insert(symbol, target);
        Ok(self)
    }
}
