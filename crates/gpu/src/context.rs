#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SurfaceState {
    Active,
    /// Terminal; the surface never comes back.
    Lost,
}

/// Drawing surface size and liveness.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceContext {
    width: u32,
    height: u32,
    state: SurfaceState,
}

impl SurfaceContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            state: SurfaceState::Active,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    pub fn is_lost(&self) -> bool {
        self.state == SurfaceState::Lost
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    /// Returns `true` only on the transition into `Lost`.
    pub fn mark_lost(&mut self) -> bool {
        let was_active = self.state == SurfaceState::Active;
        self.state = SurfaceState::Lost;
        was_active
    }
}
