use super::star::{Star, StarKind};
use super::{Mode, SHOOTING_LIFE};

/// Population factory and shooting-star spawn policy. Pure: returns new
/// stars, never touches the live collection.
pub struct Emitter {
    mode: Mode,
}

impl Emitter {
    pub fn new(mode: Mode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Seeds the ambient population. Kinds fall out of independent draws
    /// (10% bright, then 30% distant, else normal), so counts only hold in
    /// expectation.
    pub fn seed(&self, width: f32, height: f32) -> Vec<Star> {
        (0..self.mode.ambient_count())
            .map(|_| self.ambient_star(width, height))
            .collect()
    }

    fn ambient_star(&self, width: f32, height: f32) -> Star {
        let kind = if fastrand::f32() < 0.1 {
            StarKind::Bright
        } else if fastrand::f32() < 0.3 {
            StarKind::Distant
        } else {
            StarKind::Normal
        };

        let (size, opacity) = match kind {
            StarKind::Bright => (1.0 + fastrand::f32() * 3.0, 0.6 + fastrand::f32() * 0.4),
            StarKind::Distant => (0.3 + fastrand::f32() * 1.0, 0.1 + fastrand::f32() * 0.3),
            _ => (0.5 + fastrand::f32() * 2.0, 0.3 + fastrand::f32() * 0.6),
        };
        let twinkle_speed = match kind {
            StarKind::Bright => 0.005 + fastrand::f32() * 0.01,
            _ => 0.002 + fastrand::f32() * 0.008,
        };

        let drift = self.mode.drift_half_range();
        Star {
            x: fastrand::f32() * width,
            y: fastrand::f32() * height,
            size,
            opacity,
            twinkle_speed,
            drift_x: (fastrand::f32() - 0.5) * 2.0 * drift,
            drift_y: (fastrand::f32() - 0.5) * 2.0 * drift,
            kind,
        }
    }

    /// Spawns one shooting star from a random edge, unless one is already
    /// alive. Ambient mode never spawns.
    pub fn try_spawn_shooting(&self, stars: &[Star], width: f32, height: f32) -> Option<Star> {
        if self.mode != Mode::Shooting {
            return None;
        }
        if stars.iter().any(|s| s.kind.is_shooting()) {
            return None;
        }

        // Dominant velocity points inward from the spawn edge; the
        // cross-axis wobble keeps trajectories from looking identical.
        let speed = 3.0 + fastrand::f32() * 8.0;
        let wobble = fastrand::f32() - 0.5;
        let (x, y, drift_x, drift_y) = match fastrand::u8(0..4) {
            0 => (fastrand::f32() * width, 0.0, wobble, speed), // top
            1 => (width, fastrand::f32() * height, -speed, wobble), // right
            2 => (fastrand::f32() * width, height, wobble, -speed), // bottom
            _ => (0.0, fastrand::f32() * height, speed, wobble), // left
        };

        Some(Star {
            x,
            y,
            size: 1.0 + fastrand::f32() * 2.0,
            opacity: 0.5 + fastrand::f32() * 0.5,
            twinkle_speed: 0.0,
            drift_x,
            drift_y,
            kind: StarKind::Shooting { remaining_life: SHOOTING_LIFE },
        })
    }
}
