use gpu::{DrawCall, FrameSubmission};

use crate::SceneGraph;
use crate::camera::Camera;

pub struct Renderer;

impl Renderer {
    /// Collects every visible drawable into one submission, in layer order.
    pub fn collect(graph: &SceneGraph, camera: &Camera) -> FrameSubmission {
        let draws = graph
            .drawables()
            .into_iter()
            .map(|(_, _, transform, drawable)| DrawCall {
                geometry: drawable.geometry,
                material: drawable.material,
                model: transform.to_matrix(),
            })
            .collect();
        FrameSubmission {
            view_proj: camera.view_proj(),
            draws,
        }
    }
}
