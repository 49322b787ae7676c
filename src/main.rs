use clap::{Parser, Subcommand};

use lane128::conformance::{ConformanceConfig, run_conformance};
use lane128::simd::{self, BUILD_CAPABILITY, SSE_CAPABILITY, detect_host_capability};
use lane128::{NativeEngine, ScalarEngine};

#[derive(Parser)]
#[command(name = "lane128")]
#[command(about = "lane128 - 128-bit integer SIMD abstraction with portable and SSE engines", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print build capability, native engine and host CPU features
    Info,

    /// Check the native engine against the portable engine on random inputs
    Check {
        /// Random input sets per vector shape
        #[arg(short = 'n', long, value_name = "INT", default_value = "10000")]
        iterations: usize,

        /// Seed for the input generator (decimal or 0x-prefixed hex)
        #[arg(short = 's', long, value_name = "INT", value_parser = parse_seed)]
        seed: Option<u64>,

        /// Verbose level: 1=error, 2=warning, 3=message, 4+=debugging
        #[arg(short = 'v', long, value_name = "INT", default_value = "3")]
        verbosity: i32,
    },
}

/// Parse a seed written in decimal or as `0x...` hex
fn parse_seed(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse::<u64>(),
    };
    parsed.map_err(|_| format!("Invalid seed: {}", s))
}

fn init_logger(level: log::LevelFilter) {
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None) // Don't show timestamps
        .format_target(false) // Don't show module names
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Info => {
            init_logger(log::LevelFilter::Info);

            let host = detect_host_capability();
            println!("native engine:    {}", simd::native_engine_name());
            println!("build capability: {:?} - {}", BUILD_CAPABILITY, BUILD_CAPABILITY.description());
            println!("sse capability:   {:?} - {}", SSE_CAPABILITY, SSE_CAPABILITY.description());
            println!("host capability:  {:?} - {}", host, host.description());
            println!("force-scalar:     {}", cfg!(feature = "force-scalar"));
            simd::log_capabilities();
        }
        Commands::Check {
            iterations,
            seed,
            verbosity,
        } => {
            // Map verbosity (1=error, 2=warning, 3=message, 4=debug, 5+=trace)
            let log_level = match verbosity {
                v if v <= 1 => log::LevelFilter::Error,
                2 => log::LevelFilter::Warn,
                3 => log::LevelFilter::Info,
                4 => log::LevelFilter::Debug,
                _ => log::LevelFilter::Trace, // 5+ = trace
            };
            init_logger(log_level);
            simd::log_capabilities();

            let defaults = ConformanceConfig::default();
            let config = ConformanceConfig {
                iterations,
                seed: seed.unwrap_or(defaults.seed),
            };

            let report = run_conformance::<ScalarEngine, NativeEngine>(&config).into_result()?;
            println!(
                "{} vs {}: {} checks, no mismatches",
                report.reference, report.candidate, report.checks
            );
        }
    }

    Ok(())
}
