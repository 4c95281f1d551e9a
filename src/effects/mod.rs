use std::io::{BufWriter, Stdout};

pub mod moon;
pub mod starfield;

pub trait Effect {
    fn update(&mut self, dt: f32);
    fn render(&mut self, stdout: &mut BufWriter<Stdout>) -> std::io::Result<()>;
    fn resize(&mut self, width: usize, height: usize);
    fn dispose(&mut self) {}
}

/// Background color for a cell. `--bg-color` wins; otherwise the night-sky
/// radial gradient (deep blue-black at the center fading to black by 70% of
/// the way out).
pub fn background_at(x: usize, y: usize, width: usize, height: usize) -> (u8, u8, u8) {
    if let Some(color) = crate::bg_color_override() {
        return color;
    }
    const CENTER: (f32, f32, f32) = (15.0, 15.0, 35.0);
    let cx = width as f32 * 0.5;
    let cy = height as f32 * 0.5;
    let max_dist = (cx * cx + cy * cy).sqrt().max(1.0);
    let dx = x as f32 + 0.5 - cx;
    let dy = y as f32 + 0.5 - cy;
    let t = ((dx * dx + dy * dy).sqrt() / (max_dist * 0.7)).min(1.0);
    (
        (CENTER.0 * (1.0 - t)) as u8,
        (CENTER.1 * (1.0 - t)) as u8,
        (CENTER.2 * (1.0 - t)) as u8,
    )
}

/// Blends a white star of the given alpha over the background color.
pub fn blend_star(bg: (u8, u8, u8), alpha: f32) -> (u8, u8, u8) {
    let a = alpha.clamp(0.0, 1.0);
    (
        (bg.0 as f32 * (1.0 - a) + 255.0 * a) as u8,
        (bg.1 as f32 * (1.0 - a) + 255.0 * a) as u8,
        (bg.2 as f32 * (1.0 - a) + 255.0 * a) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_darkens_toward_the_corners() {
        let center = background_at(40, 24, 80, 48);
        let corner = background_at(0, 0, 80, 48);
        assert!(center.2 > corner.2);
        assert_eq!(corner, (0, 0, 0));
    }

    #[test]
    fn blend_is_bg_at_zero_and_white_at_one() {
        assert_eq!(blend_star((10, 10, 30), 0.0), (10, 10, 30));
        assert_eq!(blend_star((10, 10, 30), 1.0), (255, 255, 255));
        let mid = blend_star((0, 0, 0), 0.5);
        assert_eq!(mid, (127, 127, 127));
    }
}
