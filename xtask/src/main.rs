
use std::fs;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};
use zip::result::ZipResult;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const LAMBDA_BINARIES: [&str; 2] = ["workflow_trigger", "service_proxy"];

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the service chain workspace",
    long_about = "A unified CLI for serving the chain processor, driving it end to end,\n\
                  running CI checks, and packaging the Lambda artifacts."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the chain processor HTTP service locally
    Serve {
        /// Port to listen on
        #[arg(long, env = "PORT", default_value_t = 3000)]
        port: u16,
        /// Service name reported in records
        #[arg(long, env = "SERVICE_NAME", default_value = "service1")]
        service_name: String,
    },
    /// Drive a running chain processor as first, middle and last service
    ChainTest {
        /// Base URL of the running service
        #[arg(long, env = "SERVICE_URL", default_value = "http://localhost:3000")]
        url: String,
    },
    /// Run CI checks (fmt, clippy, tests)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
    /// Build and package Rust Lambda artifacts for deployment
    ServerlessPackage {
        /// Compilation target triple for Lambda binaries
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Build profile used for binaries
        #[arg(value_enum, long, default_value_t = BuildProfile::Release)]
        profile: BuildProfile,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting and clippy
    Check,
    /// Workspace tests
    Test,
    /// Run check + test
    All,
}

#[derive(Clone, Copy, ValueEnum)]
enum BuildProfile {
    Debug,
    Release,
}

impl BuildProfile {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    fn as_cargo_flag(self) -> Option<&'static str> {
        match self {
            Self::Debug => None,
            Self::Release => Some("--release"),
        }
    }
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn package_serverless_lambdas(
    target: &str,
    profile: BuildProfile,
) -> Result<Vec<PathBuf>, String> {
    check_target_installed(target)?;

    step("Build serverless lambda binaries");

    let mut cargo_args = vec!["build", "-p", "chain_lambda", "--target", target];
    for bin in LAMBDA_BINARIES {
        cargo_args.push("--bin");
        cargo_args.push(bin);
    }
    if let Some(flag) = profile.as_cargo_flag() {
        cargo_args.push(flag);
    }
    run_cargo(&cargo_args);

    step("Package lambda zip artifacts");
    let build_dir = Path::new("target").join(target).join(profile.dir_name());
    let dist_dir = Path::new("target/lambda/dist");
    fs::create_dir_all(dist_dir)
        .map_err(|error| format!("cannot create {}: {error}", dist_dir.display()))?;

    LAMBDA_BINARIES
        .iter()
        .map(|bin| {
            let binary_path = build_dir.join(bin);
            let binary = fs::read(&binary_path).map_err(|error| {
                format!("cannot read lambda binary {}: {error}", binary_path.display())
            })?;
            let zip_path = dist_dir.join(format!("{bin}.zip"));
            let file = fs::File::create(&zip_path)
                .map_err(|error| format!("cannot create {}: {error}", zip_path.display()))?;
            write_bootstrap_zip(&binary, file)
                .map_err(|error| format!("cannot write {}: {error}", zip_path.display()))?;
            Ok(zip_path)
        })
        .collect()
}

/// Skips the check when rustup is unavailable, e.g. on a system toolchain.
fn check_target_installed(target: &str) -> Result<(), String> {
    let Ok(output) = Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output()
    else {
        eprintln!("warning: rustup not found, skipping target check for {target}");
        return Ok(());
    };

    let installed = String::from_utf8_lossy(&output.stdout);
    if output.status.success() && installed.lines().any(|line| line.trim() == target) {
        Ok(())
    } else {
        Err(format!(
            "rust target `{target}` is not installed; run `rustup target add {target}`"
        ))
    }
}

/// Lambda's custom runtime expects a single executable named `bootstrap`.
fn write_bootstrap_zip<W: Write + Seek>(binary: &[u8], writer: W) -> ZipResult<W> {
    let mut zip = ZipWriter::new(writer);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file("bootstrap", options)?;
    zip.write_all(binary)?;
    zip.finish()
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);
}

fn ci_test() {
    step("Test chain_core");
    run_cargo(&["test", "-p", "chain_core"]);

    step("Test chain_service");
    run_cargo(&["test", "-p", "chain_service"]);

    step("Test chain_lambda");
    run_cargo(&["test", "-p", "chain_lambda"]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, service_name } => {
            eprintln!("+ cargo run -p chain_service (PORT={port} SERVICE_NAME={service_name})");
            let status = Command::new("cargo")
                .args(["run", "-p", "chain_service"])
                .env("PORT", port.to_string())
                .env("SERVICE_NAME", &service_name)
                .status()
                .expect("failed to execute cargo");
            if !status.success() {
                exit(status.code().unwrap_or(1));
            }
        }
        Commands::ChainTest { url } => {
            step(&format!("Chain test against {url}"));
            if !chain_test::run_chain_test(&url) {
                exit(1);
            }
        }
        Commands::Ci { job } => {
            match job {
                CiJob::Check => ci_check(),
                CiJob::Test => ci_test(),
                CiJob::All => {
                    ci_check();
                    ci_test();
                }
            }
            eprintln!("\nCI job passed.");
        }
        Commands::ServerlessPackage { target, profile } => {
            match package_serverless_lambdas(&target, profile) {
                Ok(artifacts) => {
                    eprintln!("\nPackaged artifacts:");
                    for path in artifacts {
                        eprintln!("- {}", path.display());
                    }
                }
                Err(message) => {
                    eprintln!("error: {message}");
                    exit(1);
                }
            }
        }
    }
}
