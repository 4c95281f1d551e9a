use super::{Effect, background_at, blend_star};
use crate::sim::simulation::{Scheduler, Simulation};
use crate::sim::surface::Surface;
use crate::sim::Mode;
use std::io::{BufWriter, Stdout, Write};

/// Pending-flag scheduler: the simulation raises the flag after each tick,
/// the host frame loop consumes it. Cancelling a disposal-pending tick is
/// just dropping the flag.
#[derive(Default)]
struct FrameScheduler {
    pending: bool,
}

impl Scheduler for FrameScheduler {
    fn request_tick(&mut self) {
        self.pending = true;
    }
}

impl FrameScheduler {
    fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

/// Terminal bridge for the star simulation: drives ticks from the host
/// frame loop and presents the alpha surface as white stars over the night
/// sky.
pub struct StarFieldEffect {
    sim: Simulation,
    surface: Surface,
    scheduler: FrameScheduler,
    output_buf: Vec<u8>,
}

impl StarFieldEffect {
    pub fn new(width: usize, height: usize, mode: Mode) -> Self {
        let mut sim = Simulation::new(mode);
        let mut scheduler = FrameScheduler::default();
        sim.start(width, height, &mut scheduler);
        Self {
            sim,
            surface: Surface::new(width, height),
            scheduler,
            output_buf: Vec::with_capacity(width * height * 25),
        }
    }
}

impl Effect for StarFieldEffect {
    fn update(&mut self, _dt: f32) {
        // The simulation advances by its own nominal increment; dt from the
        // host only gates how often we get called.
        if self.scheduler.take() {
            self.sim.tick(&mut self.surface, &mut self.scheduler);
        }
    }

    fn render(&mut self, stdout: &mut BufWriter<Stdout>) -> std::io::Result<()> {
        self.output_buf.clear();
        self.output_buf.extend_from_slice(b"\x1b[H");

        let width = self.surface.width();
        let height = self.surface.height();
        let mut prev_top_color: (u8, u8, u8) = (255, 255, 255);
        let mut prev_bot_color: (u8, u8, u8) = (255, 255, 255);

        for y in (0..height).step_by(2) {
            for x in 0..width {
                let top = blend_star(background_at(x, y, width, height), self.surface.alpha_at(x, y));
                let bot = if y + 1 < height {
                    blend_star(background_at(x, y + 1, width, height), self.surface.alpha_at(x, y + 1))
                } else {
                    top
                };

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
        self.sim.resize(width, height);
        self.surface.resize(width, height);
    }

    fn dispose(&mut self) {
        self.scheduler.pending = false;
        self.sim.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::simulation::SimState;

    #[test]
    fn update_consumes_one_pending_tick() {
        fastrand::seed(21);
        let mut effect = StarFieldEffect::new(80, 48, Mode::Ambient);
        assert!(effect.scheduler.pending, "start should request the first tick");
        effect.update(0.016);
        assert!(effect.scheduler.pending, "tick should re-request");
        assert_eq!(effect.sim.state(), SimState::Running);
    }

    #[test]
    fn dispose_cancels_the_pending_tick() {
        fastrand::seed(22);
        let mut effect = StarFieldEffect::new(80, 48, Mode::Ambient);
        effect.dispose();
        assert!(!effect.scheduler.pending);
        effect.update(0.016);
        assert!(!effect.scheduler.pending, "no tick may fire after disposal");
        assert_eq!(effect.sim.state(), SimState::Disposed);
    }

    #[test]
    fn resize_reaches_both_surface_and_simulation() {
        fastrand::seed(23);
        let mut effect = StarFieldEffect::new(80, 48, Mode::Ambient);
        let count = effect.sim.stars().len();
        effect.resize(120, 60);
        assert_eq!(effect.surface.width(), 120);
        assert_eq!(effect.sim.stars().len(), count);
        effect.update(0.016);
        for star in effect.sim.stars() {
            assert!(star.x >= 0.0 && star.x < 120.0);
            assert!(star.y >= 0.0 && star.y < 60.0);
        }
    }
}
