use super::{OFFSCREEN_MARGIN, SHOOTING_LIFE};

/// Closed set of star variants. Only `Shooting` carries per-frame state
/// beyond position; the tag is fixed at creation.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum StarKind {
    Normal,
    Bright,
    Distant,
    Shooting { remaining_life: i32 },
}

impl StarKind {
    pub fn is_shooting(self) -> bool {
        matches!(self, StarKind::Shooting { .. })
    }
}

/// One particle. Size, base opacity, twinkle rate and drift are sampled once
/// at creation and never resampled; position (and remaining life for
/// shooting stars) is the only per-frame state.
#[derive(Clone, Copy, Debug)]
pub struct Star {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub opacity: f32,
    pub twinkle_speed: f32,
    pub drift_x: f32,
    pub drift_y: f32,
    pub kind: StarKind,
}

/// Outcome of one update step. The caller owns removal; the model only
/// reports it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Fate {
    Alive,
    Expired,
}

impl Star {
    /// Advances the star by one frame. Ambient kinds drift and wrap
    /// toroidally so the coordinate always lands in [0, extent); shooting
    /// stars drift, burn one frame of life, and expire once spent or past
    /// the off-screen margin.
    pub fn update(&mut self, width: f32, height: f32) -> Fate {
        self.x += self.drift_x;
        self.y += self.drift_y;

        match self.kind {
            StarKind::Shooting { ref mut remaining_life } => {
                *remaining_life -= 1;
                let gone_x = self.x < -OFFSCREEN_MARGIN || self.x > width + OFFSCREEN_MARGIN;
                let gone_y = self.y < -OFFSCREEN_MARGIN || self.y > height + OFFSCREEN_MARGIN;
                if *remaining_life <= 0 || gone_x || gone_y {
                    Fate::Expired
                } else {
                    Fate::Alive
                }
            }
            _ => {
                if width > 0.0 {
                    self.x = self.x.rem_euclid(width);
                }
                if height > 0.0 {
                    self.y = self.y.rem_euclid(height);
                }
                Fate::Alive
            }
        }
    }

    /// Opacity for this frame: a bounded oscillation in
    /// [0.6 * base, 1.0 * base]. Shooting stars have twinkle_speed 0 and sit
    /// at 0.8 * base here; their render alpha comes from `fade` instead.
    pub fn twinkle_opacity(&self, time: f32) -> f32 {
        self.opacity * ((time * self.twinkle_speed).sin() * 0.2 + 0.8)
    }

    /// Linear fade for a shooting star, 1.0 at spawn down to 0.0 at expiry.
    /// 1.0 for ambient kinds.
    pub fn fade(&self) -> f32 {
        match self.kind {
            StarKind::Shooting { remaining_life } => {
                (remaining_life.max(0) as f32) / SHOOTING_LIFE as f32
            }
            _ => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ambient(x: f32, y: f32, drift_x: f32, drift_y: f32) -> Star {
        Star {
            x,
            y,
            size: 1.0,
            opacity: 0.5,
            twinkle_speed: 0.008,
            drift_x,
            drift_y,
            kind: StarKind::Normal,
        }
    }

    fn shooting(x: f32, y: f32, drift_x: f32, drift_y: f32) -> Star {
        Star {
            x,
            y,
            size: 1.5,
            opacity: 0.8,
            twinkle_speed: 0.0,
            drift_x,
            drift_y,
            kind: StarKind::Shooting { remaining_life: SHOOTING_LIFE },
        }
    }

    #[test]
    fn ambient_stars_stay_inside_bounds() {
        let mut star = ambient(79.9, 0.05, 0.25, -0.25);
        for _ in 0..2000 {
            assert_eq!(star.update(80.0, 48.0), Fate::Alive);
            assert!(star.x >= 0.0 && star.x < 80.0, "x = {}", star.x);
            assert!(star.y >= 0.0 && star.y < 48.0, "y = {}", star.y);
        }
    }

    #[test]
    fn wrap_handles_drift_larger_than_extent() {
        let mut star = ambient(1.0, 1.0, -7.5, 12.0);
        star.update(5.0, 4.0);
        assert!(star.x >= 0.0 && star.x < 5.0);
        assert!(star.y >= 0.0 && star.y < 4.0);
    }

    #[test]
    fn twinkle_opacity_stays_within_band() {
        let star = ambient(0.0, 0.0, 0.0, 0.0);
        let mut time = 0.0f32;
        for _ in 0..10_000 {
            let o = star.twinkle_opacity(time);
            assert!(o >= star.opacity * 0.6 - 1e-6);
            assert!(o <= star.opacity * 1.0 + 1e-6);
            time += 0.016;
        }
    }

    #[test]
    fn shooting_star_traverses_and_burns_life() {
        // Drift (5, 0) from x = 0: after 20 ticks, x = 100 and 80 life left.
        let mut star = shooting(0.0, 50.0, 5.0, 0.0);
        for _ in 0..20 {
            assert_eq!(star.update(800.0, 600.0), Fate::Alive);
        }
        assert_eq!(star.x, 100.0);
        assert_eq!(star.kind, StarKind::Shooting { remaining_life: 80 });
    }

    #[test]
    fn shooting_star_expires_when_life_runs_out() {
        let mut star = shooting(0.0, 50.0, 0.1, 0.0);
        let mut ticks = 0;
        while star.update(800.0, 600.0) == Fate::Alive {
            ticks += 1;
            assert!(ticks < SHOOTING_LIFE, "never expired");
        }
        assert_eq!(ticks, SHOOTING_LIFE - 1);
    }

    #[test]
    fn shooting_star_expires_past_margin() {
        let mut star = shooting(795.0, 50.0, 9.0, 0.0);
        let mut last = Fate::Alive;
        let mut ticks = 0;
        while last == Fate::Alive {
            last = star.update(800.0, 600.0);
            ticks += 1;
        }
        // 795 + 9 * 12 = 903 > 800 + 100.
        assert_eq!(ticks, 12);
        assert!(star.x > 900.0);
    }

    #[test]
    fn fade_is_linear_in_remaining_life() {
        let mut star = shooting(100.0, 100.0, 1.0, 0.0);
        assert_eq!(star.fade(), 1.0);
        for _ in 0..25 {
            star.update(800.0, 600.0);
        }
        assert!((star.fade() - 0.75).abs() < 1e-6);
        assert_eq!(ambient(0.0, 0.0, 0.0, 0.0).fade(), 1.0);
    }
}
