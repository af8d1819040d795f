#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Globe,
    Borders,
    Markers,
    Frontlines,
}

impl Layer {
    pub const ALL: [Layer; 4] = [
        Layer::Globe,
        Layer::Borders,
        Layer::Markers,
        Layer::Frontlines,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Draw order; overlays go on top of the globe.
    pub fn draw_order(self) -> u8 {
        self as u8
    }
}
