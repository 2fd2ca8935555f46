//! batchrun CLI
//!
//! Entry point for the `batchrun` command-line tool.

use std::io;
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser};

use batchrun::client::{AwsBatch, AwsCli, AwsCliConfig, AwsLogs, AwsS3};
use batchrun::config::Overrides;
use batchrun::error::{EXIT_CODE_CONFIG, EXIT_CODE_OK, EXIT_CODE_RUNTIME};
use batchrun::signal::SignalHandler;
use batchrun::{logging, Clients, Driver, DriverConfig, JobRequest, ResourceOverrides, RunPlan, Settings};

#[derive(Parser)]
#[command(name = "batchrun")]
#[command(about = "Submit a batch job, tail its logs, and stage its artifacts", version)]
struct Cli {
    /// Registered job definition to run
    job_definition: String,

    /// Command run inside the container under /bin/bash -c
    #[arg(long)]
    command: Option<String>,

    /// Job name (default: "default")
    #[arg(long)]
    job_name: Option<String>,

    /// Job queue (default: "optimal")
    #[arg(long)]
    job_queue: Option<String>,

    /// Region for the aws tool (default: us-west-2)
    #[arg(long)]
    region: Option<String>,

    /// Named profile for the aws tool
    #[arg(long)]
    profile: Option<String>,

    /// Remote staging location, e.g. s3://bucket/prefix
    #[arg(long)]
    bucket: Option<String>,

    /// Files to upload before the job runs (comma-separated)
    #[arg(long, visible_alias = "inputs", value_delimiter = ',')]
    uploads: Vec<String>,

    /// Files to download after the job finishes (comma-separated)
    #[arg(long, visible_alias = "outputs", value_delimiter = ',')]
    downloads: Vec<String>,

    /// Leave the staging location in place
    #[arg(long)]
    dirty: bool,

    /// Path of the aws tool inside the container
    #[arg(long)]
    awscli: Option<String>,

    /// Working directory inside the container (default: tmp)
    #[arg(long)]
    workdir: Option<String>,

    /// vCPU override
    #[arg(long)]
    cpus: Option<u32>,

    /// Memory override in MiB
    #[arg(long)]
    memory: Option<u64>,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Errors only
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Append log output to this file instead of stdout
    #[arg(short, long)]
    log: Option<PathBuf>,

    /// Config file (default: ~/.config/batchrun/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long, hide = true)]
    poll_interval_ms: Option<u64>,
}

fn main() {
    let cli = Cli::parse();

    let verbosity = if cli.quiet { 0 } else { cli.verbose };
    if let Err(e) = logging::init(verbosity, cli.log.as_deref()) {
        eprintln!("Error: {}", e);
        process::exit(EXIT_CODE_RUNTIME);
    }

    let overrides = Overrides {
        job_queue: cli.job_queue,
        job_name: cli.job_name,
        region: cli.region,
        profile: cli.profile,
        awscli: cli.awscli,
        workdir: cli.workdir,
        teardown: cli.dirty.then_some(false),
        poll_interval_ms: cli.poll_interval_ms,
    };
    let settings = match Settings::load(cli.config.as_deref(), &overrides) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(EXIT_CODE_CONFIG);
        }
    };

    let request = JobRequest {
        definition: cli.job_definition,
        command: cli.command,
        bucket: cli.bucket,
        uploads: non_empty(cli.uploads),
        downloads: non_empty(cli.downloads),
        overrides: ResourceOverrides {
            cpus: cli.cpus,
            memory_mib: cli.memory,
        },
    };
    let plan = match RunPlan::new(request, &settings) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(EXIT_CODE_CONFIG);
        }
    };

    let handler = SignalHandler::new();
    if let Err(e) = handler.install() {
        eprintln!("Error: failed to install signal handler: {}", e);
        process::exit(EXIT_CODE_RUNTIME);
    }

    let aws = AwsCli::new(AwsCliConfig {
        program: settings.aws_program.clone(),
        region: settings.region.clone(),
        profile: settings.profile.clone(),
    });
    let batch = AwsBatch::new(aws.clone(), settings.endpoints.batch.clone());
    let logs = AwsLogs::new(aws.clone(), settings.endpoints.logs.clone());
    let s3 = AwsS3::new(aws, settings.endpoints.s3.clone());

    let clients = Clients {
        scheduler: &batch,
        logs: &logs,
        objects: &s3,
    };
    let driver = Driver::new(clients, DriverConfig::from_settings(&settings), handler.state());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match driver.run(&plan, &mut out) {
        Ok(_) => process::exit(EXIT_CODE_OK),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn non_empty(items: Vec<String>) -> Vec<String> {
    items.into_iter().filter(|s| !s.trim().is_empty()).collect()
}
