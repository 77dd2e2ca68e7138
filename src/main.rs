//! Flowcheck - Scripted UI-Verification Harness
//!
//! Main entry point for the CLI binary.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use flowcheck::{flows, Config, StepRunner, Viewport};

/// Flowcheck - Scripted UI-Verification Harness
#[derive(Parser, Debug)]
#[command(name = "flowcheck")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base location of the application under test (URL or local path)
    #[arg(long, short = 'b', default_value = "http://localhost:8080")]
    base: String,

    /// Built-in flow to run
    #[arg(long, short = 'f', default_value = "codenest", conflicts_with = "steps")]
    flow: String,

    /// JSON flow file to run instead of a built-in flow
    #[arg(long, short = 's')]
    steps: Option<PathBuf>,

    /// List built-in flows and exit
    #[arg(long)]
    list_flows: bool,

    /// Directory screenshots are written under
    #[arg(long)]
    screenshot_dir: Option<PathBuf>,

    /// Default wait-condition timeout in ms
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Whole-run deadline in seconds
    #[arg(long)]
    run_timeout_secs: Option<u64>,

    /// Run in headed browser mode (visible window)
    #[arg(long)]
    headed: bool,

    /// Viewport as WIDTHxHEIGHT, e.g. 375x812
    #[arg(long)]
    viewport: Option<String>,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new(if args.debug { "flowcheck=debug" } else { "flowcheck=warn" })
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    if args.list_flows {
        for name in flows::builtin_names() {
            println!("{}", name);
        }
        return Ok(());
    }

    // Build configuration
    let mut config = Config::load();

    // Resolve the step list before touching any browser
    let steps = match &args.steps {
        Some(path) => flows::load_steps(path)?,
        None => {
            let flow = flows::builtin(&args.flow).ok_or_else(|| {
                anyhow::anyhow!(
                    "unknown flow '{}'; known flows: {}",
                    args.flow,
                    flows::builtin_names().join(", ")
                )
            })?;
            // A built-in flow carries the session setup it was
            // authored against; explicit CLI values still win below.
            if config.browser.viewport.is_none() {
                config.browser.viewport = flow.viewport;
            }
            if config.browser.init_script.is_none() {
                config.browser.init_script = flow.init_script.clone();
            }
            flow.steps
        }
    };

    // Apply CLI overrides
    if let Some(dir) = args.screenshot_dir {
        config.runner.screenshot_dir = dir;
    }

    if let Some(ms) = args.timeout_ms {
        config.runner.default_timeout_ms = ms;
    }

    if let Some(secs) = args.run_timeout_secs {
        config.runner.run_timeout_secs = Some(secs);
    }

    if args.headed {
        config.browser.headless = false;
    }

    if let Some(ref viewport) = args.viewport {
        config.browser.viewport = Some(viewport.parse::<Viewport>()?);
    }

    if args.debug {
        config.runner.debug = true;
    }

    println!("Starting verification against {}", args.base);

    let runner = StepRunner::with_config(config);
    let report = runner.run(&args.base, &steps).await?;

    print!("{}", report.summary());
    std::process::exit(report.exit_code());
}
