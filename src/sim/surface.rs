/// Single-channel alpha framebuffer, the drawing surface the renderer
/// targets. Stars are white; color only appears at presentation time, so one
/// f32 per cell is enough. Writes are max-composited so overlapping glows
/// keep the brightest contribution.
pub struct Surface {
    width: usize,
    height: usize,
    cells: Vec<f32>,
}

impl Surface {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0.0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.cells.fill(0.0);
    }

    /// Reallocates to the new extent. Contents are not preserved; the next
    /// tick redraws everything anyway.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.cells = vec![0.0; width * height];
    }

    pub fn alpha_at(&self, x: usize, y: usize) -> f32 {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            0.0
        }
    }

    #[inline]
    fn composite(&mut self, x: i32, y: i32, alpha: f32) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        if alpha > self.cells[idx] {
            self.cells[idx] = alpha;
        }
    }

    /// Solid disc with a one-cell soft edge. Sub-cell radii still light
    /// their cell at partial alpha instead of vanishing.
    pub fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, alpha: f32) {
        if alpha <= 0.0 || r <= 0.0 {
            return;
        }
        let reach = r + 1.0;
        let x0 = (cx - reach).floor() as i32;
        let x1 = (cx + reach).ceil() as i32;
        let y0 = (cy - reach).floor() as i32;
        let y1 = (cy + reach).ceil() as i32;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let dist = (dx * dx + dy * dy).sqrt();
                let coverage = (r + 0.5 - dist).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.composite(x, y, alpha * coverage);
                }
            }
        }
    }

    /// Radial gradient: `alpha` at the center, 0.3 * alpha at half radius,
    /// transparent at the rim. The bright-star bloom.
    pub fn glow_circle(&mut self, cx: f32, cy: f32, r: f32, alpha: f32) {
        if alpha <= 0.0 || r <= 0.0 {
            return;
        }
        let x0 = (cx - r).floor() as i32;
        let x1 = (cx + r).ceil() as i32;
        let y0 = (cy - r).floor() as i32;
        let y1 = (cy + r).ceil() as i32;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let t = (dx * dx + dy * dy).sqrt() / r;
                if t >= 1.0 {
                    continue;
                }
                let falloff = if t < 0.5 {
                    1.0 - (1.0 - 0.3) * (t / 0.5)
                } else {
                    0.3 * (1.0 - (t - 0.5) / 0.5)
                };
                self.composite(x, y, alpha * falloff);
            }
        }
    }

    /// Round-capped line segment of the given width, drawn by
    /// distance-to-segment over the bounding box.
    pub fn stroke_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, width: f32, alpha: f32) {
        if alpha <= 0.0 || width <= 0.0 {
            return;
        }
        let half = width * 0.5;
        let reach = half + 1.0;
        let bx0 = (x0.min(x1) - reach).floor() as i32;
        let bx1 = (x0.max(x1) + reach).ceil() as i32;
        let by0 = (y0.min(y1) - reach).floor() as i32;
        let by1 = (y0.max(y1) + reach).ceil() as i32;

        let seg_x = x1 - x0;
        let seg_y = y1 - y0;
        let len_sq = seg_x * seg_x + seg_y * seg_y;

        for y in by0..=by1 {
            for x in bx0..=bx1 {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;
                let t = if len_sq > 0.0 {
                    ((px - x0) * seg_x + (py - y0) * seg_y) / len_sq
                } else {
                    0.0
                }
                .clamp(0.0, 1.0);
                let dx = px - (x0 + seg_x * t);
                let dy = py - (y0 + seg_y * t);
                let dist = (dx * dx + dy * dy).sqrt();
                let coverage = (half + 0.5 - dist).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.composite(x, y, alpha * coverage);
                }
            }
        }
    }
}
