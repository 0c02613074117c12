/// Pointer position as a fraction of the viewport, for the `--mouse-x` and
/// `--mouse-y` CSS variables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerFraction {
    pub x: f64,
    pub y: f64,
}

pub fn pointer_fraction(x: f64, y: f64, width: f64, height: f64) -> PointerFraction {
    PointerFraction {
        x: fraction(x, width),
        y: fraction(y, height),
    }
}

fn fraction(position: f64, extent: f64) -> f64 {
    if extent > 0.0 && position.is_finite() {
        (position / extent).clamp(0.0, 1.0)
    } else {
        0.0
    }
}
