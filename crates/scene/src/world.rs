use foundation::handles::HandleAllocator;
use foundation::math::{Orientation, Quat, Vec3};

use crate::components::{Drawable, Layer, PickTarget, Transform};
use crate::entity::NodeId;

/// Flat scene: every node hangs off a single globe root whose orientation
/// rotates the whole world.
#[derive(Debug)]
pub struct SceneGraph {
    nodes: HandleAllocator,
    ids: Vec<Option<NodeId>>,
    layers: Vec<Option<Layer>>,
    transforms: Vec<Option<Transform>>,
    drawables: Vec<Option<Drawable>>,
    visible: Vec<bool>,
    pick_targets: Vec<Option<PickTarget>>,
    layer_visible: [bool; Layer::ALL.len()],
    orientation: Orientation,
    root_rotation: Quat,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self {
            nodes: HandleAllocator::new(),
            ids: Vec::new(),
            layers: Vec::new(),
            transforms: Vec::new(),
            drawables: Vec::new(),
            visible: Vec::new(),
            pick_targets: Vec::new(),
            layer_visible: [true; Layer::ALL.len()],
            orientation: Orientation::default(),
            root_rotation: Quat::IDENTITY,
        }
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, layer: Layer) -> NodeId {
        let id = NodeId(self.nodes.alloc());
        let idx = id.index() as usize;
        self.ensure_capacity(idx);
        self.ids[idx] = Some(id);
        self.layers[idx] = Some(layer);
        self.transforms[idx] = Some(Transform::identity());
        self.drawables[idx] = None;
        self.visible[idx] = true;
        self.pick_targets[idx] = None;
        id
    }

    /// Returns `false` for stale or already-despawned nodes.
    pub fn despawn(&mut self, node: NodeId) -> bool {
        if !self.nodes.release(node.0) {
            return false;
        }
        let idx = node.index() as usize;
        self.ids[idx] = None;
        self.layers[idx] = None;
        self.transforms[idx] = None;
        self.drawables[idx] = None;
        self.pick_targets[idx] = None;
        true
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.is_live(node.0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.live_count()
    }

    pub fn count_in_layer(&self, layer: Layer) -> usize {
        self.layers.iter().filter(|l| **l == Some(layer)).count()
    }

    pub fn set_transform(&mut self, node: NodeId, transform: Transform) {
        if let Some(slot) = self.slot_mut(node, |g| &mut g.transforms) {
            *slot = Some(transform);
        }
    }

    pub fn transform(&self, node: NodeId) -> Option<Transform> {
        self.live_index(node)
            .and_then(|idx| self.transforms.get(idx).copied().flatten())
    }

    pub fn set_drawable(&mut self, node: NodeId, drawable: Drawable) {
        if let Some(slot) = self.slot_mut(node, |g| &mut g.drawables) {
            *slot = Some(drawable);
        }
    }

    pub fn drawable(&self, node: NodeId) -> Option<Drawable> {
        self.live_index(node)
            .and_then(|idx| self.drawables.get(idx).copied().flatten())
    }

    pub fn set_pick_target(&mut self, node: NodeId, target: PickTarget) {
        if let Some(slot) = self.slot_mut(node, |g| &mut g.pick_targets) {
            *slot = Some(target);
        }
    }

    pub fn set_visible(&mut self, node: NodeId, visible: bool) {
        if let Some(idx) = self.live_index(node) {
            self.visible[idx] = visible;
        }
    }

    pub fn is_visible(&self, node: NodeId) -> bool {
        self.live_index(node).is_some_and(|idx| self.visible[idx])
    }

    pub fn set_layer_visible(&mut self, layer: Layer, visible: bool) {
        self.layer_visible[layer.index()] = visible;
    }

    pub fn layer_visible(&self, layer: Layer) -> bool {
        self.layer_visible[layer.index()]
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
        self.root_rotation = orientation.to_quat();
    }

    /// Visible drawables with their world transforms, in draw order.
    pub fn drawables(&self) -> Vec<(NodeId, Layer, Transform, Drawable)> {
        let mut out: Vec<_> = self
            .shown_nodes()
            .filter_map(|(idx, layer)| {
                let drawable = self.drawables[idx]?;
                let transform = self.transforms[idx]?;
                Some((
                    self.node_at(idx)?,
                    layer,
                    transform.rotated_by(self.root_rotation),
                    drawable,
                ))
            })
            .collect();
        out.sort_by_key(|(node, layer, _, _)| (layer.draw_order(), node.index()));
        out
    }

    /// Visible pickable nodes with their world-space centres.
    pub fn pick_targets(&self) -> Vec<(NodeId, Vec3, PickTarget)> {
        self.shown_nodes()
            .filter_map(|(idx, _)| {
                let target = self.pick_targets[idx]?;
                let transform = self.transforms[idx]?;
                Some((
                    self.node_at(idx)?,
                    self.root_rotation.rotate(transform.position),
                    target,
                ))
            })
            .collect()
    }

    fn shown_nodes(&self) -> impl Iterator<Item = (usize, Layer)> + '_ {
        self.layers.iter().enumerate().filter_map(|(idx, layer)| {
            let layer = (*layer)?;
            (self.visible[idx] && self.layer_visible[layer.index()]).then_some((idx, layer))
        })
    }

    fn node_at(&self, idx: usize) -> Option<NodeId> {
        self.ids.get(idx).copied().flatten()
    }

    fn live_index(&self, node: NodeId) -> Option<usize> {
        self.contains(node).then_some(node.index() as usize)
    }

    fn slot_mut<T>(
        &mut self,
        node: NodeId,
        column: impl FnOnce(&mut Self) -> &mut Vec<Option<T>>,
    ) -> Option<&mut Option<T>> {
        let idx = self.live_index(node)?;
        column(self).get_mut(idx)
    }

    fn ensure_capacity(&mut self, idx: usize) {
        if self.layers.len() <= idx {
            let new_len = idx + 1;
            self.ids.resize(new_len, None);
            self.layers.resize(new_len, None);
            self.transforms.resize(new_len, None);
            self.drawables.resize(new_len, None);
            self.visible.resize(new_len, true);
            self.pick_targets.resize(new_len, None);
        }
    }
}
