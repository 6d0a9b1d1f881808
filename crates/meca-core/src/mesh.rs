//! Node index translating source-format node ids to dense positions.
//!
//! Geometry and cell storage live outside the IR; the model only needs a
//! stable position per node id, optional coordinates, and named node groups.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Node id from the source format.
pub type NodeId = u32;

/// Dense mesh-local index of a node.
pub type NodePosition = usize;

/// A node known to the mesh. Reserved nodes have no coordinates yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub position: NodePosition,
    pub coords: Option<[f64; 3]>,
}

impl Node {
    pub fn is_reserved(&self) -> bool {
        self.coords.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Mesh {
    nodes: Vec<Node>,
    #[serde(skip)]
    position_by_id: HashMap<NodeId, NodePosition>,
    groups: BTreeMap<String, BTreeSet<NodePosition>>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn all_node_positions(&self) -> impl Iterator<Item = NodePosition> + '_ {
        self.nodes.iter().map(|node| node.position)
    }

    pub fn find_node(&self, position: NodePosition) -> Option<&Node> {
        self.nodes.get(position)
    }

    pub fn find_node_position(&self, id: NodeId) -> Option<NodePosition> {
        self.position_by_id.get(&id).copied()
    }

    /// Position of `id`, failing with [`ModelError::NodeNotFound`].
    pub fn require_node_position(&self, id: NodeId) -> Result<NodePosition> {
        self.find_node_position(id).ok_or(ModelError::NodeNotFound(id))
    }

    /// Position of `id`, reserving a placeholder if the node is not known yet.
    pub fn find_or_reserve_node(&mut self, id: NodeId) -> NodePosition {
        if let Some(position) = self.find_node_position(id) {
            return position;
        }
        let position = self.nodes.len();
        self.nodes.push(Node {
            id,
            position,
            coords: None,
        });
        self.position_by_id.insert(id, position);
        position
    }

    /// Define a node, filling its reserved placeholder if one exists.
    pub fn add_node(&mut self, id: NodeId, coords: [f64; 3]) -> NodePosition {
        let position = self.find_or_reserve_node(id);
        self.nodes[position].coords = Some(coords);
        position
    }

    pub fn node_id(&self, position: NodePosition) -> Result<NodeId> {
        self.find_node(position)
            .map(|node| node.id)
            .ok_or(ModelError::NodePositionNotFound(position))
    }

    pub fn coords(&self, position: NodePosition) -> Result<[f64; 3]> {
        self.find_node(position)
            .and_then(|node| node.coords)
            .ok_or(ModelError::NodePositionNotFound(position))
    }

    /// Nodes referenced but never defined.
    pub fn reserved_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|node| node.is_reserved())
    }

    pub fn find_or_create_node_group(&mut self, name: &str) -> &mut BTreeSet<NodePosition> {
        self.groups.entry(name.to_string()).or_default()
    }

    pub fn find_node_group(&self, name: &str) -> Option<&BTreeSet<NodePosition>> {
        self.groups.get(name)
    }

    pub fn add_node_to_group(&mut self, name: &str, position: NodePosition) {
        self.find_or_create_node_group(name).insert(position);
    }

    /// Remove a node from a group; returns whether it was a member.
    pub fn remove_node_from_group(&mut self, name: &str, position: NodePosition) -> bool {
        self.groups
            .get_mut(name)
            .map(|group| group.remove(&position))
            .unwrap_or(false)
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }
}
