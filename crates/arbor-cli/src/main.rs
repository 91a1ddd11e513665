//! `arbor-cli` – runs a simulated guard and prints its behaviour tree.
//!
//! The binary:
//!
//! 1. Initialises `tracing` (see `arbor_runtime::telemetry`).
//! 2. Loads `~/.arbor/config.toml`, writing the defaults on first run.
//! 3. Spawns one guard and steps it, scripting an intruder that shows up part
//!    way through the run and later slips away.
//! 4. Prints the tree every `snapshot_every` steps as text or JSON.
//! 5. Stops early on **Ctrl-C**.

mod config;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use arbor_memory::BlackboardManager;
use arbor_sim::{DetectableTarget, GuardWorld};
use arbor_types::{ArborError, Vector3};
use colored::Colorize;
use serde::Serialize;
use tracing::{info, warn};

use config::{Config, SnapshotFormat};

/// Awareness reported while the intruder is in sight.
const INTRUDER_AWARENESS: f32 = 2.0;
/// Intruder walking speed, slower than the guard.
const INTRUDER_SPEED: f32 = 1.0;
/// Script length used when the run is unbounded.
const UNBOUNDED_SCRIPT_STEPS: u64 = 300;

fn main() {
    let _telemetry = arbor_runtime::init_tracing("arbor");

    print_banner();

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – stopping after this step …".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; the run can only end by step count");
    }

    let cfg = load_or_create_config();

    if let Err(e) = run(&cfg, &shutdown) {
        println!("{}: {}", "Run failed".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_or_create_config() -> Config {
    match config::load() {
        Ok(Some(cfg)) => {
            println!("  Config loaded from {}", config::config_path().display().to_string().bold());
            cfg
        }
        Ok(None) => {
            let mut cfg = Config::default();
            match config::save(&cfg) {
                Ok(()) => println!(
                    "  {} Default config written to {}",
                    "✓".green().bold(),
                    config::config_path().display().to_string().bold()
                ),
                Err(e) => println!("{}: {}", "Error saving config".red(), e),
            }
            config::apply_env_overrides(&mut cfg);
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            let mut cfg = Config::default();
            config::apply_env_overrides(&mut cfg);
            cfg
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Simulation loop
// ─────────────────────────────────────────────────────────────────────────────

/// When the scripted intruder is visible, in steps.
struct IntruderScript {
    appears_at: u64,
    leaves_at: u64,
    target: DetectableTarget,
}

impl IntruderScript {
    fn for_run(steps: u64) -> Self {
        let length = if steps == 0 { UNBOUNDED_SCRIPT_STEPS } else { steps };
        Self {
            appears_at: length / 3,
            leaves_at: length * 2 / 3,
            target: DetectableTarget::new(Vector3::new(6.0, 0.0, 6.0)),
        }
    }

    fn visible(&self, step: u64) -> bool {
        (self.appears_at..self.leaves_at).contains(&step)
    }

    /// The intruder strolls along +x while it is visible.
    fn advance(&mut self, delta_time: f32) {
        self.target.position = self
            .target
            .position
            .add(Vector3::new(INTRUDER_SPEED * delta_time, 0.0, 0.0));
    }
}

fn run(cfg: &Config, shutdown: &AtomicBool) -> Result<(), ArborError> {
    let delta_time = cfg.delta_time();
    let mut manager = BlackboardManager::new();
    let mut world = GuardWorld::new(&mut manager, Vector3::zero(), cfg.guard_settings())?;
    let mut intruder = IntruderScript::for_run(cfg.steps);

    println!(
        "  Running {} at {} Hz (seed {})\n",
        if cfg.steps == 0 {
            "until Ctrl-C".to_string()
        } else {
            format!("{} steps", cfg.steps)
        },
        cfg.tick_rate_hz,
        cfg.seed
    );

    let mut step: u64 = 0;
    while (cfg.steps == 0 || step < cfg.steps) && !shutdown.load(Ordering::SeqCst) {
        if intruder.visible(step) {
            if step == intruder.appears_at {
                info!(step, position = %intruder.target.position, "intruder appeared");
            }
            intruder.advance(delta_time);
            world.observe(intruder.target, INTRUDER_AWARENESS);
        } else if step == intruder.leaves_at {
            info!(step, "intruder slipped away");
        }

        world.step(delta_time)?;
        step += 1;

        if cfg.snapshot_every > 0 && step % cfg.snapshot_every == 0 {
            print_snapshot(&world, step, cfg.snapshot_format)?;
        }

        if cfg.realtime {
            std::thread::sleep(Duration::from_secs_f32(delta_time));
        }
    }

    println!("{}", format!("  ✓ Finished after {step} steps.").green());
    print_snapshot(&world, step, cfg.snapshot_format)
}

fn print_snapshot(world: &GuardWorld, step: u64, format: SnapshotFormat) -> Result<(), ArborError> {
    let agent = world.agent_state();
    println!(
        "{} {}  agent at {}",
        "──".dimmed(),
        format!("step {step}").bold().cyan(),
        agent.position
    );
    match format {
        SnapshotFormat::Text => println!("{}\n", world.tree().debug_snapshot()),
        SnapshotFormat::Json => {
            println!("{}", to_json(&world.tree().snapshot())?);
        }
    }
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ArborError> {
    serde_json::to_string(value).map_err(|e| ArborError::Serialization(format!("failed to encode snapshot: {e}")))
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   ___           __"#.bold().green());
    println!("{}", r#"  / _ | ________/ /  ___  ____"#.bold().green());
    println!("{}", r#" / __ |/ __/ _  / _ \/ _ \/ __/"#.bold().green());
    println!("{}", r#"/_/ |_/_/  \_,_/_.__/\___/_/"#.bold().green());
    println!();
    println!("  {} {}", "Arbor".bold(), format!("v{}", env!("CARGO_PKG_VERSION")).dimmed());
    println!("  Behaviour tree runner");
    println!();
}
