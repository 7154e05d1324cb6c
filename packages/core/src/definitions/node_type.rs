use std::fmt::Display;

/// Whether a node can calculate routes itself or relies on routing info
/// from a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Controller,
    EndNode,
}

impl Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Controller => write!(f, "Controller"),
            Self::EndNode => write!(f, "End Node"),
        }
    }
}
