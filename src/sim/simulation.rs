use super::emitter::Emitter;
use super::render;
use super::star::{Fate, Star};
use super::surface::Surface;
use super::{FRAME_DT, Mode, SPAWN_CHECK_SECS};

/// The "run again before next repaint" capability. The simulation requests
/// exactly one tick per completed tick while running; the host decides when
/// to honor it. Tests drive the loop by hand through a counting impl.
pub trait Scheduler {
    fn request_tick(&mut self);
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SimState {
    Idle,
    Running,
    Disposed,
}

/// The starfield simulation. Owns the particle collection exclusively;
/// emitter and star model are pulled from, never push. Constructed fresh per
/// mount and discarded on unmount; no state survives disposal.
pub struct Simulation {
    state: SimState,
    emitter: Emitter,
    stars: Vec<Star>,
    width: f32,
    height: f32,
    time: f32,
    spawn_timer: f32,
}

impl Simulation {
    pub fn new(mode: Mode) -> Self {
        Self {
            state: SimState::Idle,
            emitter: Emitter::new(mode),
            stars: Vec::new(),
            width: 0.0,
            height: 0.0,
            time: 0.0,
            spawn_timer: 0.0,
        }
    }

    pub fn state(&self) -> SimState {
        self.state
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    /// Idle -> Running. Seeds the population, performs the immediate
    /// shooting-star spawn in shooting mode, and requests the first tick.
    /// A zero-area surface means there is nothing to draw on; the simulation
    /// stays idle without error, and no tick is ever requested.
    pub fn start(&mut self, width: usize, height: usize, scheduler: &mut dyn Scheduler) {
        if self.state != SimState::Idle {
            return;
        }
        if width == 0 || height == 0 {
            return;
        }

        self.width = width as f32;
        self.height = height as f32;
        self.stars = self.emitter.seed(self.width, self.height);

        if self.emitter.mode() == Mode::Shooting {
            if let Some(meteor) = self.emitter.try_spawn_shooting(&self.stars, self.width, self.height) {
                self.stars.push(meteor);
            }
            self.spawn_timer = 0.0;
        }

        self.state = SimState::Running;
        scheduler.request_tick();
    }

    /// One frame: clear, advance simulated time by the nominal increment,
    /// maybe spawn, then update-then-render each star, removing expired
    /// shooting stars back to front. Re-requests a tick while running.
    pub fn tick(&mut self, surface: &mut Surface, scheduler: &mut dyn Scheduler) {
        if self.state != SimState::Running {
            return;
        }

        surface.clear();
        self.time += FRAME_DT;

        if self.emitter.mode() == Mode::Shooting {
            self.spawn_timer += FRAME_DT;
            if self.spawn_timer >= SPAWN_CHECK_SECS {
                self.spawn_timer = 0.0;
                if let Some(meteor) =
                    self.emitter.try_spawn_shooting(&self.stars, self.width, self.height)
                {
                    self.stars.push(meteor);
                }
            }
        }

        // Back to front so removal never skips a neighbor.
        for i in (0..self.stars.len()).rev() {
            match self.stars[i].update(self.width, self.height) {
                Fate::Expired => {
                    self.stars.remove(i);
                }
                Fate::Alive => render::draw_star(surface, &self.stars[i], self.time),
            }
        }

        scheduler.request_tick();
    }

    /// Running -> Running. New wrap bounds take effect on the next tick;
    /// existing stars keep their positions unscaled.
    pub fn resize(&mut self, width: usize, height: usize) {
        if self.state != SimState::Running {
            return;
        }
        self.width = width as f32;
        self.height = height as f32;
    }

    /// Any state -> Disposed. Idempotent; drops the collection and
    /// guarantees no further tick is requested.
    pub fn dispose(&mut self) {
        self.state = SimState::Disposed;
        self.stars.clear();
        self.stars.shrink_to_fit();
    }
}
