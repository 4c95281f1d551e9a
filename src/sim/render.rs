use super::TRAIL_LENGTH;
use super::star::{Star, StarKind};
use super::surface::Surface;

/// Per-frame chance of a bright star flashing its sparkle cross.
const SPARKLE_CHANCE: f32 = 0.005;

/// Draws one star. Stateless: star fields are read, never written; the only
/// side effect is pixel output.
pub fn draw_star(surface: &mut Surface, star: &Star, time: f32) {
    match star.kind {
        StarKind::Shooting { .. } => {
            let alpha = star.opacity * star.fade();
            let tail_x = star.x - star.drift_x * TRAIL_LENGTH;
            let tail_y = star.y - star.drift_y * TRAIL_LENGTH;
            surface.stroke_line(tail_x, tail_y, star.x, star.y, star.size, alpha);
        }
        StarKind::Bright => {
            let alpha = star.twinkle_opacity(time);
            surface.glow_circle(star.x, star.y, star.size * 2.0, alpha);
            if fastrand::f32() < SPARKLE_CHANCE {
                let arm = star.size * 2.0;
                let sparkle = alpha * 0.6;
                surface.stroke_line(star.x - arm, star.y, star.x + arm, star.y, 0.5, sparkle);
                surface.stroke_line(star.x, star.y - arm, star.x, star.y + arm, 0.5, sparkle);
            }
        }
        StarKind::Normal | StarKind::Distant => {
            surface.fill_circle(star.x, star.y, star.size, star.twinkle_opacity(time));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn star(kind: StarKind) -> Star {
        Star {
            x: 16.0,
            y: 16.0,
            size: 2.0,
            opacity: 0.8,
            twinkle_speed: 0.0,
            drift_x: 0.2,
            drift_y: 0.0,
            kind,
        }
    }

    #[test]
    fn normal_star_draws_a_dot() {
        let mut surface = Surface::new(32, 32);
        draw_star(&mut surface, &star(StarKind::Normal), 0.0);
        assert!(surface.alpha_at(16, 16) > 0.0);
    }

    #[test]
    fn bright_star_bloom_is_wider_than_a_dot() {
        let mut plain = Surface::new(32, 32);
        let mut bloom = Surface::new(32, 32);
        draw_star(&mut plain, &star(StarKind::Normal), 0.0);
        draw_star(&mut bloom, &star(StarKind::Bright), 0.0);
        // Radius doubles for the gradient, so cells outside the plain dot
        // still catch light.
        assert_eq!(plain.alpha_at(19, 16), 0.0);
        assert!(bloom.alpha_at(18, 16) > 0.0);
    }

    #[test]
    fn shooting_star_leaves_a_trail_behind_its_head() {
        let mut surface = Surface::new(64, 32);
        let mut meteor = star(StarKind::Shooting { remaining_life: 100 });
        meteor.x = 60.0;
        meteor.y = 16.0;
        meteor.drift_x = 1.0;
        meteor.drift_y = 0.0;
        draw_star(&mut surface, &meteor, 0.0);
        // Head at x = 60, tail stretches back 50 drift units to x = 10.
        assert!(surface.alpha_at(59, 16) > 0.0);
        assert!(surface.alpha_at(12, 16) > 0.0);
        assert_eq!(surface.alpha_at(2, 16), 0.0);
    }

    #[test]
    fn spent_shooting_star_is_invisible() {
        let mut surface = Surface::new(32, 32);
        let mut meteor = star(StarKind::Shooting { remaining_life: 0 });
        meteor.drift_x = 0.1;
        draw_star(&mut surface, &meteor, 0.0);
        assert_eq!(surface.alpha_at(16, 16), 0.0);
    }
}
