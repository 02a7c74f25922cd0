//! Library for working with deterministic Moore machines in Rust.
//!
//! A Moore machine is a finite transition system in which every state carries exactly one
//! output value. Reading a word moves the machine from state to state along its transitions
//! and the outputs of the visited states form the output of the run. In contrast to Mealy
//! machines, the output only depends on the current state and not on the symbol that was
//! just consumed.
//!
//! Machines are constructed through a [`MooreBuilder`], which hands out a [`builder::StateHandle`]
//! for each declared state so that outputs, the initial state and transitions can be chained.
//! Freezing the builder validates the machine and yields an immutable [`MooreMachine`], which
//! can then be queried (see [`MooreMachine::states`], [`MooreMachine::output`],
//! [`MooreMachine::transition`] and [`MooreMachine::transitions`]) or transformed:
//! - [`MooreMachine::minimize`] merges all states which produce the same outputs on every word,
//!   using Moore's partition refinement algorithm.
//! - [`MooreMachine::complete`] makes the transition function total over a given [`Alphabet`]
//!   by redirecting all missing transitions into a fresh sink state.
//!
//! Both transformations leave their input untouched and return a new machine, so they can be
//! composed in either order. Note that completing before minimizing can lead to a smaller
//! result, as partial transitions are otherwise treated as distinguishing.
//!
//! ```
//! use moore::prelude::*;
//!
//! let mut builder = MooreBuilder::new();
//! builder.state("s0").init().output("a").to(0, "s1")?.to(1, "s0")?;
//! builder.state("s1").output("a").to(0, "any-name")?.to(1, "s1")?;
//! builder.state("any-name").output("b").to(0, "s0")?.to(1, "s0")?;
//! let machine = builder.build()?;
//!
//! let minimal = machine.minimize()?;
//! assert_eq!(minimal.size(), 3);
//!
//! let completed = machine.complete(Alphabet::from_iter([0, 1, 2]), "sink")?;
//! assert_eq!(completed.size(), 4);
//! # Ok::<(), moore::MooreError>(())
//! ```
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::{fmt::Debug, hash::Hash};

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use moore::prelude::*;` should be enough to use the package.
pub mod prelude {
    #[cfg(feature = "minimize")]
    pub use super::minimization::minimize;
    pub use super::{
        alphabet::Alphabet,
        builder::{MooreBuilder, StateHandle},
        completion::complete,
        dot::Dottable,
        error::{MooreError, Result},
        math,
        moore::{Indexes, MooreMachine, Run, StateId, Transition},
        Label, Output, Symbol,
    };
}

/// Contains some definitions of mathematical objects which are used throughout the crate.
pub mod math;

/// Module that contains definitions for dealing with alphabets.
pub mod alphabet;
pub use alphabet::Alphabet;

/// Error type shared by all fallible operations.
pub mod error;
pub use error::{MooreError, Result};

/// The immutable machine model together with its query surface.
pub mod moore;
pub use moore::{MooreMachine, StateId};

/// Incremental construction of machines.
pub mod builder;
pub use builder::MooreBuilder;

/// Contains the minimization algorithm. This is feature gated behind the `minimize` feature.
#[cfg(feature = "minimize")]
pub mod minimization;
#[cfg(feature = "minimize")]
pub use minimization::minimize;

/// Completion of partial machines with a sink state.
pub mod completion;
pub use completion::complete;

/// Export of machines in the DOT format of graphviz.
pub mod dot;

/// Implements the generation of random Moore machines.
#[cfg(feature = "random")]
pub mod random;

/// An input symbol. Symbols only need to be comparable and hashable, the remaining bounds
/// are needed for building fresh machines and for logging.
pub trait Symbol: Clone + Eq + Hash + Debug {}
impl<T: Clone + Eq + Hash + Debug> Symbol for T {}

/// An output value that is attached to a state. Outputs only need to be comparable for
/// equality, in particular they need not be hashable or ordered.
pub trait Output: Clone + Eq + Debug {}
impl<T: Clone + Eq + Debug> Output for T {}

/// A label which is used to name states during construction.
pub trait Label: Clone + Eq + Hash + Debug {}
impl<T: Clone + Eq + Hash + Debug> Label for T {}

#[cfg(test)]
pub(crate) mod tests {
    use crate::prelude::*;

    /// The machine from the README: `s0` and `s1` share an output but can be told apart
    /// by reading `0`, so nothing can be merged.
    pub fn readme_machine() -> MooreMachine<u8, &'static str> {
        let mut builder = MooreBuilder::new();
        builder
            .state("s0")
            .init()
            .output("a")
            .to(0, "s1")
            .unwrap()
            .to(1, "s0")
            .unwrap();
        builder
            .state("s1")
            .output("a")
            .to(0, "any-name")
            .unwrap()
            .to(1, "s1")
            .unwrap();
        builder
            .state("any-name")
            .output("b")
            .to(0, "s0")
            .unwrap()
            .to(1, "s0")
            .unwrap();
        builder.build().unwrap()
    }

    /// A machine with six states that behaves like [`readme_machine`], every state of the
    /// README machine is duplicated once.
    pub fn redundant_machine() -> MooreMachine<u8, &'static str> {
        let mut builder = MooreBuilder::new();
        for (q, out, zero, one) in [
            ("q0", "a", "q1", "q0"),
            ("q1", "a", "q2", "q1"),
            ("q2", "b", "q3", "q3"),
            ("q3", "a", "q4", "q3"),
            ("q4", "a", "q5", "q4"),
            ("q5", "b", "q0", "q0"),
        ] {
            builder
                .state(q)
                .output(out)
                .to(0, zero)
                .unwrap()
                .to(1, one)
                .unwrap();
        }
        builder.state("q0").init();
        builder.build().unwrap()
    }
}
