/// What a pointer event turned out to mean.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PointerAction {
    None,
    /// Pointer moved without dragging; ray-cast for a tooltip.
    Hover { x_px: f64, y_px: f64 },
    /// Rotation delta since the previous drag sample.
    Drag { dx_px: f64, dy_px: f64 },
    /// Press and release without crossing the drag threshold.
    Click { x_px: f64, y_px: f64 },
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum Phase {
    Idle,
    Pressed { start: [f64; 2] },
    Dragging { last: [f64; 2] },
}

/// Splits raw pointer input into hover, drag and click.
#[derive(Debug, Clone)]
pub struct PointerTracker {
    threshold_px: f64,
    phase: Phase,
}

impl PointerTracker {
    pub fn new(threshold_px: f64) -> Self {
        Self {
            threshold_px,
            phase: Phase::Idle,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging { .. })
    }

    pub fn is_pressed(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    pub fn down(&mut self, x_px: f64, y_px: f64) {
        self.phase = Phase::Pressed {
            start: [x_px, y_px],
        };
    }

    pub fn moved(&mut self, x_px: f64, y_px: f64) -> PointerAction {
        match self.phase {
            Phase::Idle => PointerAction::Hover { x_px, y_px },
            Phase::Pressed { start } => {
                if distance(start, [x_px, y_px]) >= self.threshold_px {
                    self.phase = Phase::Dragging { last: [x_px, y_px] };
                    PointerAction::Drag {
                        dx_px: x_px - start[0],
                        dy_px: y_px - start[1],
                    }
                } else {
                    PointerAction::Hover { x_px, y_px }
                }
            }
            Phase::Dragging { last } => {
                self.phase = Phase::Dragging { last: [x_px, y_px] };
                PointerAction::Drag {
                    dx_px: x_px - last[0],
                    dy_px: y_px - last[1],
                }
            }
        }
    }

    pub fn up(&mut self, x_px: f64, y_px: f64) -> PointerAction {
        let phase = std::mem::replace(&mut self.phase, Phase::Idle);
        match phase {
            Phase::Pressed { start } if distance(start, [x_px, y_px]) < self.threshold_px => {
                PointerAction::Click { x_px, y_px }
            }
            _ => PointerAction::None,
        }
    }

    /// Pointer left the surface mid-gesture.
    pub fn cancel(&mut self) {
        self.phase = Phase::Idle;
    }
}

fn distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    (a[0] - b[0]).hypot(a[1] - b[1])
}

#[cfg(test)]
mod tests {
    use super::{PointerAction, PointerTracker};

    #[test]
    fn short_press_is_a_click() {
        let mut p = PointerTracker::new(5.0);
        p.down(100.0, 100.0);
        assert_eq!(p.moved(102.0, 101.0), PointerAction::Hover { x_px: 102.0, y_px: 101.0 });
        assert_eq!(p.up(103.0, 101.0), PointerAction::Click { x_px: 103.0, y_px: 101.0 });
    }

    #[test]
    fn crossing_the_threshold_drags_and_suppresses_the_click() {
        let mut p = PointerTracker::new(5.0);
        p.down(0.0, 0.0);
        assert_eq!(p.moved(6.0, 0.0), PointerAction::Drag { dx_px: 6.0, dy_px: 0.0 });
        assert!(p.is_dragging());
        assert_eq!(p.moved(8.0, 1.0), PointerAction::Drag { dx_px: 2.0, dy_px: 1.0 });
        // Returning near the start does not turn the gesture back into a click.
        assert_eq!(p.up(1.0, 0.0), PointerAction::None);
        assert!(!p.is_pressed());
    }

    #[test]
    fn release_far_from_the_press_is_not_a_click() {
        let mut p = PointerTracker::new(5.0);
        p.down(0.0, 0.0);
        assert_eq!(p.up(20.0, 0.0), PointerAction::None);
    }

    #[test]
    fn idle_movement_hovers() {
        let mut p = PointerTracker::new(5.0);
        assert_eq!(p.moved(1.0, 2.0), PointerAction::Hover { x_px: 1.0, y_px: 2.0 });
        assert_eq!(p.up(1.0, 2.0), PointerAction::None);
    }
}
