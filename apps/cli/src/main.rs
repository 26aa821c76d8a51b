//! # Rotor CLI
//!
//! 无硬件环境下的旋钮运行器：在 Mock 适配器上启动完整的控制循环，
//! 由模拟线程扮演转动旋钮、按压力垫的用户。
//!
//! ```bash
//! # 校验调参文件
//! rotor-cli check-config --profile knob.toml
//!
//! # 模拟运行，UDP 遥测绑定到默认端口，Ctrl-C 退出
//! rotor-cli run --profile knob.toml
//!
//! # 纯本地运行（不开遥测端口）
//! rotor-cli run --no-link
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rotor_core::KnobConfig;
use rotor_driver::mock::{MockAngleSensor, MockForcePad, MockMotor};
use rotor_driver::{LoopConfig, Rotor};
use rotor_link::LinkConfig;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::info;

/// Rotor CLI - 触觉旋钮模拟运行器
#[derive(Parser, Debug)]
#[command(name = "rotor-cli")]
#[command(about = "Simulated runner for the Rotor haptic knob", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 在 Mock 硬件上运行控制循环，直到 Ctrl-C
    Run {
        /// 调参文件（TOML，缺省用内置默认值）
        #[arg(short, long)]
        profile: Option<PathBuf>,

        /// 遥测链路绑定地址
        #[arg(short, long, default_value = "0.0.0.0:4444")]
        bind: String,

        /// 不开遥测端口
        #[arg(long)]
        no_link: bool,

        /// 控制周期（微秒）
        #[arg(long, default_value_t = 1000)]
        period_us: u64,
    },

    /// 校验调参文件并打印生效配置
    CheckConfig {
        /// 调参文件（TOML）
        #[arg(short, long)]
        profile: PathBuf,
    },
}

fn load_profile(path: Option<&Path>) -> Result<KnobConfig> {
    let Some(path) = path else {
        return Ok(KnobConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read profile {}", path.display()))?;
    let config: KnobConfig = toml::from_str(&text)
        .with_context(|| format!("failed to parse profile {}", path.display()))?;
    config.validate().context("invalid profile")?;
    Ok(config)
}

/// 模拟线程：来回扫过整个行程，每个往返在中点按压一次力垫
///
/// 扫动会越过两侧边界 0.3 rad，墙、档位、点击三种行为都能被演示到。
fn drive_simulation(
    sensor: MockAngleSensor,
    force_pad: MockForcePad,
    config: &KnobConfig,
    running: Arc<AtomicBool>,
) -> std::thread::JoinHandle<()> {
    let lower = config.lower_bound - 0.3;
    let upper = config.upper_bound + 0.3;
    let midpoint = (config.lower_bound + config.upper_bound) / 2.0;
    let press = config.force_threshold + 100;

    std::thread::spawn(move || {
        let step = 0.02_f32; // rad / 10ms，接近手拧速度
        let mut angle = midpoint;
        let mut direction = 1.0_f32;
        let mut pressed_this_pass = false;

        while running.load(Ordering::Relaxed) {
            angle += step * direction;
            if angle > upper {
                direction = -1.0;
                pressed_this_pass = false;
            } else if angle < lower {
                direction = 1.0;
                pressed_this_pass = false;
            }

            sensor.set_angle(angle);
            sensor.set_velocity(step * direction * 100.0);

            if !pressed_this_pass && (angle - midpoint).abs() < step {
                pressed_this_pass = true;
                force_pad.set_force(press);
                std::thread::sleep(Duration::from_millis(60));
                force_pad.set_force(0);
            }

            std::thread::sleep(Duration::from_millis(10));
        }
    })
}

fn run(profile: Option<&Path>, bind: &str, no_link: bool, period_us: u64) -> Result<()> {
    let config = load_profile(profile)?;

    let motor = MockMotor::new();
    let sensor = MockAngleSensor::new();
    let force_pad = MockForcePad::new();

    let mut builder = Rotor::builder()
        .knob_config(config.clone())
        .loop_config(LoopConfig {
            cycle_period_us: period_us,
        });
    builder = if no_link {
        builder.without_link()
    } else {
        builder.link_config(LinkConfig {
            bind_addr: bind.to_string(),
            ..LinkConfig::default()
        })
    };

    let rotor = builder
        .build(motor, sensor.clone(), force_pad.clone())
        .context("failed to start control loop")?;
    if let Some(addr) = rotor.link_addr() {
        info!(%addr, "telemetry listening");
    }

    let shutdown_tx = rotor.shutdown_sender();
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.send(());
    })
    .context("failed to install Ctrl-C handler")?;

    let sim_running = Arc::new(AtomicBool::new(true));
    let sim = drive_simulation(sensor, force_pad, &config, Arc::clone(&sim_running));

    while rotor.is_running() {
        std::thread::sleep(Duration::from_secs(1));
        let state = rotor.state();
        info!(
            angle = state.logical_angle,
            source = ?state.source,
            peer = state.peer_connected,
            cycles = state.cycles,
            "knob state"
        );
    }

    sim_running.store(false, Ordering::Relaxed);
    let _ = sim.join();
    rotor.shutdown().context("control loop exited with error")?;
    info!("stopped");
    Ok(())
}

fn check_config(profile: &Path) -> Result<()> {
    let config = load_profile(Some(profile))?;
    println!("profile OK: {}", profile.display());
    println!(
        "  bounds: [{:.3}, {:.3}] rad, step {:.4} rad",
        config.lower_bound, config.upper_bound, config.step_angle
    );
    println!(
        "  force: trigger > {}, re-arm < {}",
        config.force_threshold, config.force_reset_level
    );
    println!(
        "  haptic: {} ms @ {:.1} rad/s",
        config.haptic_duration_ms, config.haptic_velocity
    );
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rotor_cli=info".parse().unwrap())
                .add_directive("rotor_driver=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            profile,
            bind,
            no_link,
            period_us,
        } => run(profile.as_deref(), &bind, no_link, period_us),
        Commands::CheckConfig { profile } => check_config(&profile),
    }
}
