use foundation::ids::ConflictId;
use foundation::math::Vec3;
use foundation::math::precision::stable_total_cmp_f64;

use crate::SceneGraph;
use crate::entity::NodeId;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.dir.scale(t)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerHit {
    pub node: NodeId,
    pub conflict: ConflictId,
    pub distance: f64,
}

/// Nearest non-negative intersection distance with a sphere, if any.
pub fn ray_sphere(ray: Ray, center: Vec3, radius: f64) -> Option<f64> {
    let dir = ray.dir.normalized()?;
    let oc = ray.origin - center;
    let b = oc.dot(dir);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    let t0 = -b - sq;
    let t1 = -b + sq;
    if t0 >= 0.0 {
        Some(t0)
    } else if t1 >= 0.0 {
        Some(t1)
    } else {
        None
    }
}

/// Deterministic marker picking.
///
/// The closest hit along the ray wins; equal distances go to the lower node
/// index. Hidden nodes and hidden layers are never hit.
pub fn pick_marker(graph: &SceneGraph, ray: Ray) -> Option<MarkerHit> {
    let mut best: Option<MarkerHit> = None;
    for (node, center, target) in graph.pick_targets() {
        let Some(t) = ray_sphere(ray, center, target.radius) else {
            continue;
        };
        let better = match best {
            None => true,
            Some(b) => stable_total_cmp_f64(t, b.distance)
                .then_with(|| node.index().cmp(&b.node.index()))
                .is_lt(),
        };
        if better {
            best = Some(MarkerHit {
                node,
                conflict: target.conflict,
                distance: t,
            });
        }
    }
    best
}

/// World-space point where the ray first meets the globe.
pub fn intersect_globe(ray: Ray, radius: f64) -> Option<Vec3> {
    let dir = ray.dir.normalized()?;
    let t = ray_sphere(Ray::new(ray.origin, dir), Vec3::ZERO, radius)?;
    Some(ray.origin + dir.scale(t))
}

#[cfg(test)]
mod tests {
    use super::{Ray, intersect_globe, pick_marker, ray_sphere};
    use crate::SceneGraph;
    use crate::components::{Layer, PickTarget, Transform};
    use foundation::ids::ConflictId;
    use foundation::math::Vec3;

    fn marker(graph: &mut SceneGraph, id: u64, at: Vec3) {
        let node = graph.spawn(Layer::Markers);
        graph.set_transform(node, Transform::translate(at));
        graph.set_pick_target(
            node,
            PickTarget {
                conflict: ConflictId(id),
                radius: 0.5,
            },
        );
    }

    #[test]
    fn ray_picks_nearest_marker() {
        let mut graph = SceneGraph::new();
        marker(&mut graph, 1, Vec3::new(10.0, 0.0, 0.0));
        marker(&mut graph, 2, Vec3::new(5.0, 0.0, 0.0));

        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        let hit = pick_marker(&graph, ray).expect("hit");
        assert_eq!(hit.conflict, ConflictId(2));
        assert!((hit.distance - 4.5).abs() < 1e-12);
    }

    #[test]
    fn tie_breaks_by_node_index() {
        let mut graph = SceneGraph::new();
        marker(&mut graph, 7, Vec3::new(5.0, 0.0, 0.0));
        marker(&mut graph, 3, Vec3::new(5.0, 0.0, 0.0));

        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(pick_marker(&graph, ray).map(|h| h.conflict), Some(ConflictId(7)));
    }

    #[test]
    fn hidden_markers_are_not_picked() {
        let mut graph = SceneGraph::new();
        marker(&mut graph, 1, Vec3::new(5.0, 0.0, 0.0));
        graph.set_layer_visible(Layer::Markers, false);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        assert!(pick_marker(&graph, ray).is_none());
    }

    #[test]
    fn globe_hit_is_on_the_near_side() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 3.0), Vec3::new(0.0, 0.0, -2.0));
        let p = intersect_globe(ray, 1.0).expect("hit");
        assert!(p.distance(Vec3::new(0.0, 0.0, 1.0)) < 1e-12);

        let miss = Ray::new(Vec3::new(0.0, 2.0, 3.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(intersect_globe(miss, 1.0).is_none());
        let behind = Ray::new(Vec3::new(0.0, 0.0, 3.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(ray_sphere(behind, Vec3::ZERO, 1.0).is_none());
    }
}
