use gpu::Rgb;

/// Colour and lift (fraction of globe radius above the surface) for one
/// overlay layer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LayerStyle {
    pub color: Rgb,
    pub opacity: f32,
    pub lift: f64,
}

impl LayerStyle {
    pub const fn new(color: Rgb, opacity: f32, lift: f64) -> Self {
        Self {
            color,
            opacity,
            lift,
        }
    }

    pub fn radius(&self) -> f64 {
        foundation::math::GLOBE_RADIUS * (1.0 + self.lift)
    }
}

pub const GLOBE_STYLE: LayerStyle = LayerStyle::new(Rgb::from_u32(0x1b2a41), 1.0, 0.0);
pub const BORDER_STYLE: LayerStyle = LayerStyle::new(Rgb::from_u32(0x9fb3c8), 0.6, 0.002);
pub const FRONTLINE_FILL_STYLE: LayerStyle = LayerStyle::new(Rgb::WHITE, 0.35, 0.003);
pub const FRONTLINE_LINE_STYLE: LayerStyle = LayerStyle::new(Rgb::WHITE, 0.9, 0.005);
pub const MARKER_STYLE: LayerStyle = LayerStyle::new(Rgb::WHITE, 1.0, 0.008);

/// Fixed colour for conflicts that have frontline data.
pub const HIGHLIGHT_COLOR: Rgb = Rgb::from_u32(0xffd166);
pub const DEFAULT_CONFLICT_COLOR: Rgb = Rgb::from_u32(0xe63946);

const TYPE_COLORS: &[(&str, u32)] = &[
    ("interstate", 0xd62828),
    ("civil_war", 0xf77f00),
    ("insurgency", 0xfcbf49),
    ("independence", 0x2a9d8f),
    ("liberation", 0x2a9d8f),
    ("colonial", 0x8d5fd3),
    ("ethnic", 0xe76f51),
    ("revolution", 0x4cc9f0),
    ("coup", 0xb5838d),
    ("territorial", 0x90be6d),
];

/// Marker colour for a conflict type; unknown types fall back to
/// [`DEFAULT_CONFLICT_COLOR`].
pub fn type_color(conflict_type: &str) -> Rgb {
    let normalized = conflict_type.trim().to_ascii_lowercase().replace([' ', '-'], "_");
    TYPE_COLORS
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|(_, hex)| Rgb::from_u32(*hex))
        .unwrap_or(DEFAULT_CONFLICT_COLOR)
}

const SIDE_PALETTE: [u32; 8] = [
    0xe63946, 0x457b9d, 0x2a9d8f, 0xf4a261, 0x8d5fd3, 0x90be6d, 0xb5838d, 0x4cc9f0,
];

/// Assigns palette colours to side keys in order of first appearance.
#[derive(Debug, Clone, Default)]
pub struct SidePalette {
    seen: Vec<String>,
}

impl SidePalette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color_for(&mut self, side: &str) -> Rgb {
        let slot = match self.seen.iter().position(|s| s == side) {
            Some(i) => i,
            None => {
                self.seen.push(side.to_string());
                self.seen.len() - 1
            }
        };
        Rgb::from_u32(SIDE_PALETTE[slot % SIDE_PALETTE.len()])
    }
}
