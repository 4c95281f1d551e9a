pub mod emitter;
pub mod render;
pub mod simulation;
pub mod star;
pub mod surface;

/// Nominal per-tick time advance. The loop does not measure wall time;
/// twinkle phase accumulates by this constant every frame.
pub const FRAME_DT: f32 = 0.016;

/// Shooting stars expire once they pass this far outside the surface.
pub const OFFSCREEN_MARGIN: f32 = 100.0;

/// Initial life of a shooting star, in frames.
pub const SHOOTING_LIFE: i32 = 100;

/// Trail length of a shooting star, in drift-per-frame units.
pub const TRAIL_LENGTH: f32 = 50.0;

/// Seconds of simulated time between shooting-star spawn checks.
pub const SPAWN_CHECK_SECS: f32 = 10.0;

/// Visual mode. Shooting mode runs a slightly thinner ambient population so
/// the meteors read clearly, drifts faster, and arms the spawn timer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    Ambient,
    Shooting,
}

impl Mode {
    pub fn ambient_count(self) -> usize {
        match self {
            Mode::Ambient => 200,
            Mode::Shooting => 180,
        }
    }

    /// Half-range of the per-axis ambient drift, in cells per frame.
    pub fn drift_half_range(self) -> f32 {
        match self {
            Mode::Ambient => 0.05,
            Mode::Shooting => 0.25,
        }
    }
}
