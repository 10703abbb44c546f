//! JSON node description format.
//!
//! ```json
//! {
//!     "name": "labels",
//!     "visible": true,
//!     "children": [{ "name": "label-0" }, { "name": "label-1", "visible": false }]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::scene::{Node, NodeRef};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDescription {
    pub name: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDescription>,
}

fn default_visible() -> bool {
    true
}

impl NodeDescription {
    /// Instantiates the described subtree.
    #[must_use]
    pub fn build(&self) -> NodeRef {
        let node = Node::new(&self.name);
        node.set_visible(self.visible);
        for child in &self.children {
            node.add_child(&child.build());
        }
        node
    }

    /// Captures the structure of an existing subtree.
    #[must_use]
    pub fn describe(node: &Node) -> Self {
        Self {
            name: node.name().to_string(),
            visible: node.is_visible(),
            children: node.children().iter().map(|c| Self::describe(c)).collect(),
        }
    }
}
