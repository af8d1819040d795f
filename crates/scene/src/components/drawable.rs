use gpu::{GeometryHandle, MaterialHandle};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Drawable {
    pub geometry: GeometryHandle,
    pub material: MaterialHandle,
}

impl Drawable {
    pub fn new(geometry: GeometryHandle, material: MaterialHandle) -> Self {
        Self { geometry, material }
    }
}
