use std::fmt::Display;

use itertools::Itertools;
use thiserror::Error;

use crate::{error::MooreError, Label, MooreMachine, Output, Symbol};

/// Errors that can occur while producing or rendering a DOT representation.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("could not query the machine: {0}")]
    /// Querying the machine failed.
    Model(#[from] MooreError),
    #[error("could not communicate with the dot process: \"{0:?}\"")]
    /// Spawning or talking to the `dot` executable failed.
    Io(#[from] std::io::Error),
    #[error("Child process had non-zero exit status \"{0}\"")]
    /// The `dot` executable did not exit successfully.
    NonZeroExit(std::process::ExitStatus),
}

fn escape_dot_label(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Objects which can be exported in the DOT format of graphviz. For more information on the
/// format, see the [graphviz documentation](https://graphviz.org/doc/info/lang.html).
pub trait Dottable {
    /// The name of the produced graph.
    fn dot_name(&self) -> Option<String>;

    /// Statements that are placed right after the opening of the graph.
    fn dot_header_statements(&self) -> Result<Vec<String>, RenderError> {
        Ok(vec![])
    }

    /// Returns an identifier and the attributes for each node.
    fn dot_nodes(&self) -> Result<Vec<(String, Vec<DotStateAttribute>)>, RenderError>;

    /// Returns source, target and attributes of each edge.
    fn dot_edges(&self) -> Result<Vec<(String, String, Vec<DotTransitionAttribute>)>, RenderError>;

    /// Compute the graphviz representation of `self`.
    fn dot_representation(&self) -> Result<String, RenderError> {
        let header = std::iter::once(format!(
            "digraph {} {{",
            self.dot_name().unwrap_or("A".to_string())
        ))
        .chain(self.dot_header_statements()?);

        let nodes = self.dot_nodes()?.into_iter().map(|(ident, attributes)| {
            format!("{ident} [{}]", attributes.into_iter().join(", "))
        });
        let edges = self
            .dot_edges()?
            .into_iter()
            .map(|(source, target, attributes)| {
                format!("{source} -> {target} [{}]", attributes.into_iter().join(", "))
            });

        let mut lines = header
            .chain(nodes)
            .chain(edges)
            .chain(std::iter::once("}".to_string()));
        Ok(lines.join("\n"))
    }

    /// Renders the object visually (as PNG) and returns a vec of bytes/u8s encoding
    /// the rendered image. This method is only available on the `graphviz` crate feature
    /// and requires the `dot` executable to be installed.
    #[cfg(feature = "graphviz")]
    fn render(&self) -> Result<Vec<u8>, RenderError> {
        use std::io::{Read, Write};

        let dot = self.dot_representation()?;
        tracing::trace!("writing dot representation\n{}", dot);

        let mut child = std::process::Command::new("dot")
            .arg("-Tpng")
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(dot.as_bytes())?;
        }

        let mut output = Vec::new();
        if let Some(mut stdout) = child.stdout.take() {
            stdout.read_to_end(&mut output)?;
        }

        let status = child.wait()?;
        if !status.success() {
            return Err(RenderError::NonZeroExit(status));
        }
        Ok(output)
    }

    /// Renders the object to a PNG file with the given filename. The DOT representation is
    /// staged in a temporary file. Only available on the `graphviz` crate feature.
    #[cfg(feature = "graphviz")]
    fn render_to_file_name(&self, filename: &str) -> Result<(), RenderError> {
        use std::io::Write;

        tracing::trace!("Outputting dot and rendering to png");
        let dot = self.dot_representation()?;
        let mut tempfile = tempfile::NamedTempFile::new()?;
        tempfile.write_all(dot.as_bytes())?;

        let status = std::process::Command::new("dot")
            .arg("-Tpng")
            .arg("-o")
            .arg(filename)
            .arg(tempfile.path())
            .status()?;
        if !status.success() {
            return Err(RenderError::NonZeroExit(status));
        }
        Ok(())
    }
}

/// The DOT export only relies on the public query surface of the machine: one node per
/// state showing its label and output, one edge per transition showing its symbol and an
/// invisible node pointing to the initial state.
impl<A: Symbol, O: Output, L: Label> Dottable for MooreMachine<A, O, L> {
    fn dot_name(&self) -> Option<String> {
        Some("MooreMachine".into())
    }

    fn dot_header_statements(&self) -> Result<Vec<String>, RenderError> {
        Ok(vec![
            "init [label=\"\", shape=none]".to_string(),
            format!("init -> {}", self.initial_state()?),
        ])
    }

    fn dot_nodes(&self) -> Result<Vec<(String, Vec<DotStateAttribute>)>, RenderError> {
        self.states()
            .map(|q| -> Result<_, RenderError> {
                let name = match self.label(q) {
                    Some(label) => format!("{label:?}"),
                    None => q.to_string(),
                };
                Ok((
                    q.to_string(),
                    vec![
                        DotStateAttribute::Shape("circle".into()),
                        DotStateAttribute::Label(format!("{name} | {:?}", self.output(q)?)),
                    ],
                ))
            })
            .collect()
    }

    fn dot_edges(&self) -> Result<Vec<(String, String, Vec<DotTransitionAttribute>)>, RenderError> {
        Ok(self
            .transitions()
            .map(|t| {
                (
                    t.source.to_string(),
                    t.target.to_string(),
                    vec![DotTransitionAttribute::Label(format!("{:?}", t.symbol))],
                )
            })
            .collect())
    }
}

/// Enum that abstracts attributes of nodes in the DOT format.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DotStateAttribute {
    /// The label of a node
    Label(String),
    /// The shape of a node
    Shape(String),
    /// The color of a node
    Color(String),
}

impl Display for DotStateAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DotStateAttribute::Label(s) => write!(f, "label=\"{}\"", escape_dot_label(s)),
            DotStateAttribute::Shape(s) => write!(f, "shape=\"{}\"", escape_dot_label(s)),
            DotStateAttribute::Color(c) => write!(f, "color=\"{}\"", escape_dot_label(c)),
        }
    }
}

/// Enum that abstracts attributes of edges in the DOT format.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DotTransitionAttribute {
    /// The label of an edge
    Label(String),
}

impl Display for DotTransitionAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DotTransitionAttribute::Label(lbl) => write!(f, "label=\"{}\"", escape_dot_label(lbl)),
        }
    }
}
