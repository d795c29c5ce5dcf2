use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Index path from the root group to a node. The empty path is the root itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Parent path and the index inside the parent, `None` for the root.
    pub fn split_last(&self) -> Option<(NodePath, usize)> {
        let (&last, parent) = self.0.split_last()?;
        Some((Self(parent.to_vec()), last))
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl<const N: usize> From<[usize; N]> for NodePath {
    fn from(indices: [usize; N]) -> Self {
        Self(indices.to_vec())
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for index in &self.0 {
            write!(f, "/{}", index)?;
        }
        Ok(())
    }
}

impl FromStr for NodePath {
    type Err = String;

    /// Accepts `/0/2`, `0/2`, `0.2`; an empty string or `/` is the root.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .split(['/', '.'])
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<usize>()
                    .map_err(|_| format!("Invalid path segment {:?} in {:?}", part, s))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl TryFrom<String> for NodePath {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NodePath> for String {
    fn from(path: NodePath) -> Self {
        path.to_string()
    }
}
