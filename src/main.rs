use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyCode},
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::env;
use std::io::{BufWriter, stdout};
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

mod effects;
mod sim;

use effects::Effect;
use effects::moon::MoonEffect;
use effects::starfield::StarFieldEffect;
use sim::Mode;

static BG_COLOR: OnceLock<(u8, u8, u8)> = OnceLock::new();
static MOON_TEXTURE: OnceLock<PathBuf> = OnceLock::new();

pub fn bg_color_override() -> Option<(u8, u8, u8)> {
    BG_COLOR.get().copied()
}

pub fn moon_texture_path() -> Option<PathBuf> {
    MOON_TEXTURE.get().cloned()
}

fn print_usage() {
    eprintln!("starfield - Terminal night-sky screensaver");
    eprintln!();
    eprintln!("Usage: starfield [EFFECT] [OPTIONS]");
    eprintln!();
    eprintln!("Effects:");
    eprintln!("  starfield Drifting, twinkling star field (default)");
    eprintln!("  shooting  Star field with an occasional shooting star");
    eprintln!("  moon      Rotating moon");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --bg-color RRGGBB    Solid background color as hex (e.g., --bg-color 1a1b26)");
    eprintln!("  --moon-texture PATH  Grayscale PGM albedo map for the moon");
    eprintln!();
    eprintln!("Press 'q', ESC, or Ctrl+C to exit");
}

fn run_effect(mut effect: Box<dyn Effect>) -> std::io::Result<()> {
    let stdout = stdout();
    let mut stdout = BufWriter::with_capacity(1024 * 64, stdout);

    terminal::enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All))?;

    let mut last_frame = Instant::now();
    let mut accumulator = 0.0f32;
    const FIXED_DT: f32 = 1.0 / 60.0;

    loop {
        if event::poll(Duration::from_millis(1))? {
            match event::read()? {
                Event::Key(key_event) => {
                    if key_event.code == KeyCode::Char('q')
                        || key_event.code == KeyCode::Esc
                        || (key_event.code == KeyCode::Char('c')
                            && key_event.modifiers.contains(event::KeyModifiers::CONTROL))
                    {
                        break;
                    }
                }
                Event::Resize(cols, rows) => {
                    effect.resize(cols as usize, rows as usize * 2);
                    execute!(stdout, Clear(ClearType::All))?;
                }
                _ => {}
            }
        }

        let now = Instant::now();
        let frame_time = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        accumulator += frame_time;
        if accumulator > FIXED_DT * 3.0 {
            accumulator = FIXED_DT * 3.0;
        }

        while accumulator >= FIXED_DT {
            effect.update(FIXED_DT);
            accumulator -= FIXED_DT;
        }

        effect.render(&mut stdout)?;
    }

    // Stop all pending work before the surface goes away.
    effect.dispose();

    execute!(stdout, Show, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    Ok(())
}

fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

fn main() -> std::io::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut effect_name = "starfield";
    let mut bg_color: Option<(u8, u8, u8)> = None;
    let mut moon_texture: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bg-color" => {
                if i + 1 < args.len() {
                    if let Some(color) = parse_hex_color(&args[i + 1]) {
                        bg_color = Some(color);
                        i += 2;
                    } else {
                        eprintln!("Invalid hex color: {}", args[i + 1]);
                        eprintln!("Expected format: RRGGBB (e.g., 1a1b26)");
                        std::process::exit(1);
                    }
                } else {
                    eprintln!("--bg-color requires a hex color value");
                    std::process::exit(1);
                }
            }
            "--moon-texture" => {
                if i + 1 < args.len() {
                    moon_texture = Some(PathBuf::from(&args[i + 1]));
                    i += 2;
                } else {
                    eprintln!("--moon-texture requires a file path");
                    std::process::exit(1);
                }
            }
            "help" | "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            arg => {
                if !arg.starts_with('-') {
                    effect_name = arg;
                    i += 1;
                } else {
                    eprintln!("Unknown option: {}", arg);
                    eprintln!();
                    print_usage();
                    std::process::exit(1);
                }
            }
        }
    }

    if let Some(color) = bg_color {
        let _ = BG_COLOR.set(color);
    }
    if let Some(path) = moon_texture {
        let _ = MOON_TEXTURE.set(path);
    }

    let (cols, rows) = terminal::size()?;
    let (width, height) = (cols as usize, rows as usize * 2);

    let effect: Box<dyn Effect> = match effect_name {
        "starfield" => Box::new(StarFieldEffect::new(width, height, Mode::Ambient)),
        "shooting" => Box::new(StarFieldEffect::new(width, height, Mode::Shooting)),
        "moon" => Box::new(MoonEffect::new(width, height)),
        _ => {
            eprintln!("Unknown effect: {}", effect_name);
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    run_effect(effect)
}

#[cfg(test)]
mod tests {
    use super::parse_hex_color;

    #[test]
    fn hex_colors_parse_with_or_without_hash() {
        assert_eq!(parse_hex_color("1a1b26"), Some((0x1a, 0x1b, 0x26)));
        assert_eq!(parse_hex_color("#ffffff"), Some((255, 255, 255)));
        assert_eq!(parse_hex_color("fff"), None);
        assert_eq!(parse_hex_color("zzzzzz"), None);
    }
}
