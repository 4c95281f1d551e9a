use super::{Effect, background_at, blend_star};
use noise::{NoiseFn, Perlin};
use std::fs;
use std::io::{BufWriter, Stdout, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Instant;

/// Fixed rotation per tick, radians.
const ROTATION_STEP: f32 = 0.005;

/// Sinusoidal tilt, driven by wall-clock time. The rotation below runs on
/// the tick counter instead; the two bases are intentionally separate.
const TILT_RATE: f32 = 0.5;
const TILT_AMPLITUDE: f32 = 0.1;

/// Texture resolution for the procedurally generated surface.
const TEX_WIDTH: usize = 256;
const TEX_HEIGHT: usize = 128;

/// Equirectangular grayscale albedo map.
pub struct MoonAsset {
    width: usize,
    height: usize,
    albedo: Vec<f32>,
}

impl MoonAsset {
    fn sample(&self, u: f32, v: f32) -> f32 {
        let x = ((u.rem_euclid(1.0)) * self.width as f32) as usize % self.width;
        let y = ((v.clamp(0.0, 0.9999)) * self.height as f32) as usize % self.height;
        self.albedo[y * self.width + x]
    }

    /// Cratered surface from layered Perlin noise, sampled on the sphere so
    /// the map has no seam at the date line.
    fn generate() -> Self {
        let perlin = Perlin::new(fastrand::u32(..));
        let mut albedo = Vec::with_capacity(TEX_WIDTH * TEX_HEIGHT);
        for ty in 0..TEX_HEIGHT {
            let lat = (ty as f64 / TEX_HEIGHT as f64 - 0.5) * std::f64::consts::PI;
            for tx in 0..TEX_WIDTH {
                let lon = tx as f64 / TEX_WIDTH as f64 * std::f64::consts::TAU;
                let px = lat.cos() * lon.cos();
                let py = lat.sin();
                let pz = lat.cos() * lon.sin();

                // Broad maria plus finer grain.
                let mut value = 0.0;
                let mut amplitude = 1.0;
                let mut frequency = 1.8;
                for _ in 0..4 {
                    value += perlin.get([px * frequency, py * frequency, pz * frequency]) * amplitude;
                    amplitude *= 0.5;
                    frequency *= 2.1;
                }
                let shade = (0.62 + value as f32 * 0.22).clamp(0.15, 1.0);
                albedo.push(shade);
            }
        }
        Self { width: TEX_WIDTH, height: TEX_HEIGHT, albedo }
    }

    /// Binary (P5) grayscale PGM, 8-bit, comments allowed in the header.
    fn from_pgm(bytes: &[u8]) -> Option<Self> {
        let mut pos = 0usize;
        let mut fields = [0usize; 3];

        if !bytes.starts_with(b"P5") {
            return None;
        }
        pos += 2;

        let mut field = 0;
        while field < 3 {
            while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }
            if pos < bytes.len() && bytes[pos] == b'#' {
                while pos < bytes.len() && bytes[pos] != b'\n' {
                    pos += 1;
                }
                continue;
            }
            let start = pos;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
            if pos == start {
                return None;
            }
            let text = std::str::from_utf8(&bytes[start..pos]).ok()?;
            fields[field] = text.parse().ok()?;
            field += 1;
        }
        // Single whitespace byte between header and raster.
        pos += 1;

        let [width, height, maxval] = fields;
        if width == 0 || height == 0 || maxval == 0 || maxval > 255 {
            return None;
        }
        let len = width.checked_mul(height)?;
        let raster = bytes.get(pos..pos.checked_add(len)?)?;
        let albedo = raster.iter().map(|&b| b as f32 / maxval as f32).collect();
        Some(Self { width, height, albedo })
    }
}

fn load_asset(texture: Option<PathBuf>) -> Option<MoonAsset> {
    match texture {
        Some(path) => MoonAsset::from_pgm(&fs::read(path).ok()?),
        None => Some(MoonAsset::generate()),
    }
}

/// The rotating moon scene: one persistent shaded sphere instead of a
/// particle collection. The asset loads on a background thread; until it
/// arrives (or forever, if the load fails) the scene renders empty.
pub struct MoonEffect {
    width: usize,
    height: usize,
    asset: Option<MoonAsset>,
    loader: Option<Receiver<MoonAsset>>,
    rotation: f32,
    started: Instant,
    output_buf: Vec<u8>,
}

impl MoonEffect {
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_texture(width, height, crate::moon_texture_path())
    }

    pub fn with_texture(width: usize, height: usize, texture: Option<PathBuf>) -> Self {
        let (tx, rx) = mpsc::channel();
        let seed = fastrand::u64(..);
        thread::spawn(move || {
            fastrand::seed(seed);
            // A failed load sends nothing; dropping the sender is the whole
            // error path.
            if let Some(asset) = load_asset(texture) {
                let _ = tx.send(asset);
            }
        });

        Self {
            width,
            height,
            asset: None,
            loader: Some(rx),
            rotation: 0.0,
            started: Instant::now(),
            output_buf: Vec::with_capacity(width * height * 25),
        }
    }

    fn poll_asset(&mut self) {
        let Some(rx) = &self.loader else { return };
        match rx.try_recv() {
            Ok(asset) => {
                self.asset = Some(asset);
                self.loader = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.loader = None;
            }
        }
    }

    fn tilt(&self) -> f32 {
        (self.started.elapsed().as_secs_f32() * TILT_RATE).sin() * TILT_AMPLITUDE
    }

    /// Shade for one cell, or None outside the disc (or before the asset
    /// has arrived).
    fn shade_at(&self, x: usize, y: usize) -> Option<f32> {
        let asset = self.asset.as_ref()?;

        let radius = (self.width.min(self.height) as f32) * 0.42;
        if radius < 1.0 {
            return None;
        }
        let cx = self.width as f32 * 0.5;
        let cy = self.height as f32 * 0.5;
        let nx = (x as f32 + 0.5 - cx) / radius;
        let ny = (y as f32 + 0.5 - cy) / radius;
        let rr = nx * nx + ny * ny;
        if rr > 1.0 {
            return None;
        }
        let nz = (1.0 - rr).sqrt();

        // View-space normal back into object space: undo tilt (about x),
        // then the accumulated rotation (about y).
        let tilt = self.tilt();
        let (oy, z1) = (
            ny * tilt.cos() - nz * tilt.sin(),
            ny * tilt.sin() + nz * tilt.cos(),
        );
        let (ox, oz) = (
            nx * self.rotation.cos() - z1 * self.rotation.sin(),
            nx * self.rotation.sin() + z1 * self.rotation.cos(),
        );

        let lon = oz.atan2(ox);
        let lat = oy.clamp(-1.0, 1.0).asin();
        let u = lon / std::f32::consts::TAU + 0.5;
        let v = lat / std::f32::consts::PI + 0.5;
        let albedo = asset.sample(u, v);

        // Fixed sun from the upper left, plus a little ambient so the limb
        // never goes fully dark.
        let light = (-0.45 * nx - 0.35 * ny + 0.82 * nz).max(0.0);
        Some((albedo * (0.12 + 0.88 * light)).clamp(0.0, 1.0))
    }
}

impl Effect for MoonEffect {
    fn update(&mut self, _dt: f32) {
        self.poll_asset();
        self.rotation += ROTATION_STEP;
        if self.rotation > std::f32::consts::TAU {
            self.rotation -= std::f32::consts::TAU;
        }
    }

    fn render(&mut self, stdout: &mut BufWriter<Stdout>) -> std::io::Result<()> {
        self.output_buf.clear();
        self.output_buf.extend_from_slice(b"\x1b[H");

        let (width, height) = (self.width, self.height);
        let mut prev_top_color: (u8, u8, u8) = (255, 255, 255);
        let mut prev_bot_color: (u8, u8, u8) = (255, 255, 255);

        for y in (0..height).step_by(2) {
            for x in 0..width {
                let top = self.cell_color(x, y);
                let bot = if y + 1 < height { self.cell_color(x, y + 1) } else { top };

                if top != prev_top_color {
                    write!(self.output_buf, "\x1b[48;2;{};{};{}m", top.0, top.1, top.2)?;
                    prev_top_color = top;
                }
                if bot != prev_bot_color {
                    write!(self.output_buf, "\x1b[38;2;{};{};{}m", bot.0, bot.1, bot.2)?;
                    prev_bot_color = bot;
                }

                self.output_buf.extend_from_slice("▄".as_bytes());
            }
            self.output_buf.extend_from_slice(b"\x1b[0m");
            prev_top_color = (255, 255, 255);
            prev_bot_color = (255, 255, 255);
            if y + 2 < height {
                self.output_buf.extend_from_slice(b"\r\n");
            }
        }

        stdout.write_all(&self.output_buf)?;
        stdout.flush()?;
        Ok(())
    }

    fn resize(&mut self, width: usize, height: usize) {
        // Projection (disc center and radius) derives from the extent, so
        // storing the new extent is the whole recompute.
        self.width = width;
        self.height = height;
    }

    fn dispose(&mut self) {
        self.asset = None;
        self.loader = None;
        self.output_buf = Vec::new();
    }
}

impl MoonEffect {
    fn cell_color(&self, x: usize, y: usize) -> (u8, u8, u8) {
        let bg = background_at(x, y, self.width, self.height);
        match self.shade_at(x, y) {
            Some(shade) => blend_star(bg, shade),
            None => bg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn settle(effect: &mut MoonEffect) {
        // Drive updates until the loader thread resolves one way or the
        // other.
        for _ in 0..200 {
            effect.update(0.016);
            if effect.loader.is_none() {
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("loader never resolved");
    }

    #[test]
    fn rotation_advances_by_a_fixed_step() {
        let mut effect = MoonEffect::with_texture(40, 24, None);
        let before = effect.rotation;
        effect.update(0.016);
        effect.update(0.5); // dt is ignored; the step is nominal
        assert!((effect.rotation - before - 2.0 * ROTATION_STEP).abs() < 1e-6);
    }

    #[test]
    fn procedural_asset_eventually_arrives() {
        fastrand::seed(31);
        let mut effect = MoonEffect::with_texture(40, 24, None);
        settle(&mut effect);
        assert!(effect.asset.is_some());
        assert!(effect.shade_at(20, 12).is_some(), "disc center should be lit");
        assert!(effect.shade_at(0, 0).is_none(), "corner is off the disc");
    }

    #[test]
    fn failed_load_leaves_the_scene_empty() {
        let missing = PathBuf::from("/nonexistent/moon-texture.pgm");
        let mut effect = MoonEffect::with_texture(40, 24, Some(missing));
        settle(&mut effect);
        assert!(effect.asset.is_none());
        // Ticks keep running against the empty scene.
        effect.update(0.016);
        assert_eq!(effect.cell_color(20, 12), background_at(20, 12, 40, 24));
    }

    #[test]
    fn dispose_releases_the_asset() {
        fastrand::seed(32);
        let mut effect = MoonEffect::with_texture(40, 24, None);
        settle(&mut effect);
        effect.dispose();
        assert!(effect.asset.is_none());
        assert!(effect.loader.is_none());
    }

    #[test]
    fn pgm_parser_accepts_a_minimal_map() {
        let bytes = b"P5\n# comment\n4 2\n255\n\x10\x20\x30\x40\x50\x60\x70\x80";
        let asset = MoonAsset::from_pgm(bytes).unwrap();
        assert_eq!(asset.width, 4);
        assert_eq!(asset.height, 2);
        assert!((asset.sample(0.0, 0.0) - 16.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn pgm_parser_rejects_bad_input() {
        assert!(MoonAsset::from_pgm(b"P6\n4 2\n255\n").is_none());
        assert!(MoonAsset::from_pgm(b"P5\n4 2\n255\n\x00\x01").is_none()); // short raster
        assert!(MoonAsset::from_pgm(b"P5\n0 2\n255\n").is_none());
    }
}
