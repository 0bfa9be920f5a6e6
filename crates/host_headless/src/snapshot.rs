//! Serialized tree snapshots for structural assertions.

use serde::Serialize;

use crate::{HeadlessHost, HostKey};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeSnapshot {
    pub tag: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attrs: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

impl HeadlessHost {
    /// The committed tree under the container, as plain data.
    pub fn snapshot(&self) -> Vec<NodeSnapshot> {
        self.container_children()
            .into_iter()
            .map(|key| self.snapshot_node(key))
            .collect()
    }

    pub fn snapshot_json(&self) -> String {
        serde_json::to_string_pretty(&self.snapshot()).unwrap_or_default()
    }

    fn snapshot_node(&self, key: HostKey) -> NodeSnapshot {
        let (tag, attrs, text, children) = {
            let doc = self.doc.borrow();
            match doc.nodes.get(key.0 as usize) {
                Some(node) => (
                    node.tag.to_string(),
                    node.attrs
                        .iter()
                        .map(|(name, value)| (name.to_string(), value.clone()))
                        .collect(),
                    node.text.clone(),
                    node.children.clone(),
                ),
                None => (String::new(), Vec::new(), None, Vec::new()),
            }
        };
        NodeSnapshot {
            tag,
            attrs,
            text,
            children: children
                .into_iter()
                .map(|child| self.snapshot_node(child))
                .collect(),
        }
    }
}
