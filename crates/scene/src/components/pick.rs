use foundation::ids::ConflictId;

/// Marks a node as a clickable conflict marker.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickTarget {
    pub conflict: ConflictId,
    /// Hit radius in world units around the node position.
    pub radius: f64,
}
