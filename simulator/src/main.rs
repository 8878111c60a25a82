//! Command-line driver: synthetic or recorded runs, and an optional HTTP bridge.

use anyhow::Context;
use clap::Parser;
use generator::GeneratorConfig;
use http_bridge::{bridge_bind_address, HttpBridge};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::{Runner, WorkflowConfig};

mod generator;
mod http_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Offline and live driver for the Kalman tracking core")]
struct Args {
    /// Run one workflow over the measurement stream and emit a summary
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Read JSON-lines samples instead of generating them
    #[arg(long)]
    input: Option<PathBuf>,
    /// Write every estimate as a JSON line to this file
    #[arg(long)]
    output: Option<PathBuf>,
    #[arg(long, default_value_t = 100.0)]
    initial_variance: f64,
    #[arg(long, default_value_t = 1e-4)]
    process_noise: f64,
    #[arg(long, default_value_t = 1.0)]
    measurement_noise: f64,
    #[arg(long, default_value_t = 5.0)]
    true_value: f64,
    #[arg(long, default_value_t = 0.5)]
    noise: f64,
    #[arg(long, default_value_t = 200)]
    samples: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Append the offline summary to this report file
    #[arg(long, default_value = "tools/data/offline_tracking.log")]
    report: PathBuf,
    /// Keep an HTTP bridge alive for live observe/peek requests
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        let generator = GeneratorConfig {
            true_value: args.true_value,
            noise: args.noise,
            samples: args.samples,
            seed: args.seed,
            ..Default::default()
        };
        WorkflowConfig::from_args(
            args.initial_variance,
            args.process_noise,
            args.measurement_noise,
            generator,
        )
    };
    if args.input.is_some() {
        workflow_config.input = args.input;
    }

    let runner = Runner::new(workflow_config);

    if args.offline {
        let samples = runner.load_samples()?;
        let result = runner.execute(&samples)?;

        println!(
            "Offline run -> samples {}, final estimate {:.6}, variance {:.6}",
            result.records.len(),
            result.final_estimate,
            result.final_variance
        );
        if let (Some(raw), Some(filtered)) = (result.raw_rms_error, result.filtered_rms_error) {
            println!("rms error vs truth -> raw {:.4}, filtered {:.4}", raw, filtered);
        }

        if let Some(path) = args.output.as_ref() {
            let mut lines = String::new();
            for record in &result.records {
                lines.push_str(&serde_json::to_string(record).context("encoding estimate record")?);
                lines.push('\n');
            }
            fs::write(path, lines)
                .with_context(|| format!("writing estimates {}", path.display()))?;
        }

        let report = format!(
            "samples={} estimate={:.6} variance={:.6} rms_raw={:?} rms_filtered={:?} metrics={:?}\n",
            result.records.len(),
            result.final_estimate,
            result.final_variance,
            result.raw_rms_error,
            result.filtered_rms_error,
            result.metrics
        );
        if let Some(parent) = args.report.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&args.report)
            .with_context(|| format!("opening report {}", args.report.display()))?;
        file.write_all(report.as_bytes())?;
    }

    if args.serve {
        let bridge = HttpBridge::new(runner.new_session()?);
        bridge.spawn(bridge_bind_address())?;
        bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
