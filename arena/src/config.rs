use anyhow::{Context, Result, anyhow, bail};
use bevy::log::Level;
use clap::Parser;
use std::time::Duration;

use crate::constants::*;
use boss::{BossDefinition, bosses};

// ============================================================================
// CLI Argument Parsing
// ============================================================================

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Headless bullet-hell boss arena", long_about = None)]
pub struct Args {
    // Built-in boss name (star, trinity) or path to a JSON boss definition
    #[arg(short, long, default_value = "star")]
    pub boss: String,

    // Seed for every random choice the boss makes
    #[arg(long, default_value_t = 1)]
    pub seed: u64,

    // Simulation ticks per second
    #[arg(long, default_value_t = DEFAULT_TICK_HZ)]
    pub tick_hz: u64,

    // Encounter length in simulated seconds
    #[arg(long, default_value_t = DEFAULT_RUN_SECS)]
    pub seconds: f32,

    // Run as fast as possible instead of in real time
    #[arg(long, default_value_t = false)]
    pub fast: bool,

    // Damage dealt to the boss per simulated second
    #[arg(long, default_value_t = 0.0)]
    pub dps: f32,

    // Maximum number of live projectiles
    #[arg(long, default_value_t = DEFAULT_POOL_CAPACITY)]
    pub pool_capacity: usize,

    // Host pause window in seconds, e.g. 12..15
    #[arg(long, value_parser = parse_window)]
    pub pause: Option<Window>,

    // Window in which the arena is hidden (visibility loss), e.g. 30..31.5
    #[arg(long, value_parser = parse_window)]
    pub hide: Option<Window>,

    // Window in which a pause menu covers the arena
    #[arg(long, value_parser = parse_window)]
    pub overlay: Option<Window>,

    // Window in which the player is down and there is nothing to aim at
    #[arg(long, value_parser = parse_window)]
    pub target_down: Option<Window>,

    // Print the boss definition as JSON and exit
    #[cfg(feature = "json")]
    #[arg(long, default_value_t = false)]
    pub dump: bool,

    // Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", value_parser = parse_level)]
    pub log_level: Level,
}

impl Args {
    #[must_use]
    pub fn tick_duration(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / self.tick_hz.max(1))
    }

    // Number of ticks covering `seconds`
    #[must_use]
    pub fn frames(&self) -> u64 {
        (f64::from(self.seconds.max(0.0)) * self.tick_hz.max(1) as f64).ceil() as u64
    }
}

// ============================================================================
// Windows
// ============================================================================

// A span of simulated time, [start, end)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: Duration,
    pub end: Duration,
}

impl Window {
    #[must_use]
    pub fn contains(&self, t: Duration) -> bool {
        self.start <= t && t < self.end
    }
}

pub fn parse_window(text: &str) -> Result<Window> {
    let (start, end) = text
        .split_once("..")
        .ok_or_else(|| anyhow!("Expected a window like 12..15, got '{text}'"))?;
    let start: f64 = start.trim().parse().with_context(|| format!("Invalid window start '{start}'"))?;
    let end: f64 = end.trim().parse().with_context(|| format!("Invalid window end '{end}'"))?;
    if !(start.is_finite() && end.is_finite()) || start < 0.0 || end <= start {
        bail!("Window '{text}' must satisfy 0 <= start < end");
    }
    Ok(Window {
        start: Duration::from_secs_f64(start),
        end: Duration::from_secs_f64(end),
    })
}

fn parse_level(text: &str) -> Result<Level> {
    text.parse::<Level>().map_err(|_| anyhow!("Unknown log level '{text}'"))
}

// ============================================================================
// Boss Loading
// ============================================================================

// A built-in boss by name, otherwise a JSON definition on disk
pub fn load_definition(boss: &str) -> Result<BossDefinition> {
    if bosses::BUILTIN_BOSSES.contains(&boss) {
        return bosses::builtin(boss);
    }

    #[cfg(feature = "json")]
    {
        BossDefinition::load(boss)
    }
    #[cfg(not(feature = "json"))]
    {
        bail!(
            "Unknown boss '{}' (built-in bosses: {})",
            boss,
            bosses::BUILTIN_BOSSES.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_parse_fractional_seconds() {
        let parsed = parse_window("1.5..3");
        assert!(parsed.is_ok_and(|window| window.start == Duration::from_millis(1500)
            && window.end == Duration::from_secs(3)));
        assert!(parse_window("3..1").is_err());
        assert!(parse_window("oops").is_err());
        assert!(parse_window("-1..2").is_err());
    }

    #[test]
    fn window_is_half_open() {
        let Ok(window) = parse_window("1..2") else {
            panic!("valid window rejected");
        };
        assert!(!window.contains(Duration::from_millis(999)));
        assert!(window.contains(Duration::from_secs(1)));
        assert!(!window.contains(Duration::from_secs(2)));
    }

    #[test]
    fn args_parse_with_defaults() {
        let args = Args::try_parse_from(["arena", "--boss", "trinity", "--pause", "2..4", "--fast"]);
        let Ok(args) = args else {
            panic!("arguments rejected: {args:?}");
        };
        assert_eq!(args.boss, "trinity");
        assert!(args.fast);
        assert_eq!(args.tick_hz, DEFAULT_TICK_HZ);
        assert_eq!(args.log_level, Level::INFO);
        assert_eq!(args.pause.map(|window| window.start), Some(Duration::from_secs(2)));
    }

    #[test]
    fn frames_cover_the_run_length() {
        let Ok(args) = Args::try_parse_from(["arena", "--seconds", "2", "--tick-hz", "30"]) else {
            panic!("arguments rejected");
        };
        assert_eq!(args.frames(), 60);
        assert_eq!(args.tick_duration(), Duration::from_nanos(33_333_333));
    }

    #[test]
    fn unknown_boss_name_without_file_is_an_error() {
        assert!(load_definition("no-such-boss.json").is_err());
        assert!(load_definition("star").is_ok());
    }
}
