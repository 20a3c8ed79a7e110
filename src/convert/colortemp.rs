//! Color temperature to RGB approximation
//!
//! Piecewise fit with independent branches per channel, computed in the
//! 0..255 domain and normalized at the end. The constants are part of the
//! conversion contract and must not be re-tuned: downstream comparisons
//! depend on the exact boundary behavior (6600 K lands on the seam of the
//! two red branches and resolves to full red).

/// Convert a blackbody temperature in kelvin to a normalized RGB color.
///
/// Channels are clamped to [0, 1]; temperatures far outside the fit range
/// saturate rather than overflow.
pub fn temperature_to_rgb(temperature: f64) -> [f32; 3] {
    let t = temperature / 100.0;

    let red = if t <= 66.0 {
        255.0
    } else {
        clamp_255(329.698727446 * (t - 60.0).powf(-0.1332047592))
    };

    let green = if t <= 66.0 {
        clamp_255(99.4708025861 * t.ln() - 161.1195681661)
    } else {
        clamp_255(288.1221695283 * (t - 60.0).powf(-0.0755148492))
    };

    let blue = if t >= 66.0 {
        255.0
    } else if t <= 19.0 {
        0.0
    } else {
        clamp_255(138.5177312231 * (t - 10.0).ln() - 305.0447927307)
    };

    [
        (red / 255.0) as f32,
        (green / 255.0) as f32,
        (blue / 255.0) as f32,
    ]
}

fn clamp_255(v: f64) -> f64 {
    v.clamp(0.0, 255.0)
}
