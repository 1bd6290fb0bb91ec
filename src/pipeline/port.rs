//! Block ports.
//!
//! Every non-source block has one input port on its left edge and every
//! block has one output port on its right edge. Connections always run
//! output → input.

/// Side of a block a connection attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortKind {
    Input,
    Output,
}

impl PortKind {
    pub fn opposite(self) -> Self {
        match self {
            PortKind::Input => PortKind::Output,
            PortKind::Output => PortKind::Input,
        }
    }

    /// Source blocks expose only an output port.
    pub fn exists_on(self, is_source: bool) -> bool {
        !(is_source && self == PortKind::Input)
    }
}

impl std::fmt::Display for PortKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortKind::Input => write!(f, "input"),
            PortKind::Output => write!(f, "output"),
        }
    }
}
