use anyhow::Result;
use clap::Parser;
use cronet_bootstrap::bootstrap::{self, Outcome};
use cronet_bootstrap::config::{Config, DEFAULT_MARKER, DEFAULT_REPO, FetchSettings};
use cronet_bootstrap::dispatch::{
    self, BuildInvocation, BuildSettings, DEFAULT_BUILD_TARGET, DEFAULT_BUILD_TOOL, DEFAULT_OUTPUT,
};
use cronet_bootstrap::github::GitHubRepo;
use cronet_bootstrap::release::DEFAULT_RELEASE_PREFIX;
use cronet_bootstrap::runtime::{RealRuntime, Runtime};
use log::{error, info};

/// cronet-bootstrap - fetch prebuilt Cronet, then build
///
/// Downloads the Cronet release asset for the target platform into the
/// working directory unless the marker file is already there, then runs the
/// build with every remaining argument passed through.
///
/// GOOS and GOARCH select the target platform. If GITHUB_TOKEN is set it is
/// used for authentication.
///
/// Examples:
///   cronet-bootstrap                      # fetch if needed, then go build
///   cronet-bootstrap -- -trimpath         # extra arguments for go build
///   cronet-bootstrap --skip-build         # fetch only
#[derive(Parser, Debug)]
#[command(author, version = env!("CRONET_BOOTSTRAP_VERSION"), about)]
struct Cli {
    /// Repository publishing the Cronet releases
    #[arg(long, env = "CRONET_BOOTSTRAP_REPO", value_name = "OWNER/REPO", default_value = DEFAULT_REPO)]
    repo: GitHubRepo,

    /// GitHub API URL (defaults to https://api.github.com)
    #[arg(long = "api-url", env = "CRONET_BOOTSTRAP_API_URL", value_name = "URL")]
    api_url: Option<String>,

    /// Prefix identifying the Cronet releases
    #[arg(long, env = "CRONET_BOOTSTRAP_RELEASE_PREFIX", default_value = DEFAULT_RELEASE_PREFIX)]
    release_prefix: String,

    /// File whose presence means the library is already unpacked
    #[arg(long, env = "CRONET_BOOTSTRAP_MARKER", value_name = "FILE", default_value = DEFAULT_MARKER)]
    marker: String,

    /// Build tool to hand off to
    #[arg(long, env = "CRONET_BOOTSTRAP_BUILD_TOOL", value_name = "PROGRAM", default_value = DEFAULT_BUILD_TOOL)]
    build_tool: String,

    /// Name of the build output
    #[arg(long, env = "CRONET_BOOTSTRAP_OUTPUT", value_name = "NAME", default_value = DEFAULT_OUTPUT)]
    output: String,

    /// Package to build
    #[arg(long, env = "CRONET_BOOTSTRAP_BUILD_TARGET", value_name = "PACKAGE", default_value = DEFAULT_BUILD_TARGET)]
    build_target: String,

    /// Fetch the library but do not run the build
    #[arg(long, env = "CRONET_BOOTSTRAP_SKIP_BUILD")]
    skip_build: bool,

    /// Extra arguments for the build tool
    #[arg(
        value_name = "BUILD_ARGS",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    build_args: Vec<String>,
}

impl Cli {
    fn fetch_settings<R: Runtime>(&self, runtime: &R) -> Result<FetchSettings> {
        Ok(FetchSettings {
            repo: self.repo.clone(),
            api_url: self.api_url.clone(),
            release_prefix: self.release_prefix.clone(),
            marker: self.marker.clone(),
            destination: runtime.current_dir()?,
        })
    }

    fn build_settings(&self) -> BuildSettings {
        BuildSettings {
            tool: self.build_tool.clone(),
            output: self.output.clone(),
            target: self.build_target.clone(),
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    let runtime = RealRuntime;
    let settings = cli.fetch_settings(&runtime)?;
    let config = Config::new(&runtime, settings.api_url.clone())?;

    match bootstrap::ensure_artifacts(&runtime, &config.github, &config.http, &settings).await? {
        Outcome::AlreadyPresent => {}
        Outcome::Fetched {
            release,
            asset,
            files,
        } => info!(
            "Unpacked {} files from {} ({})",
            files.len(),
            asset,
            release
        ),
    }

    if cli.skip_build {
        return Ok(0);
    }

    let invocation =
        BuildInvocation::new(&cli.build_settings(), &cli.build_args, dispatch::default_jobs());
    dispatch::dispatch(&invocation)
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            error!("{:#}", err);
            std::process::exit(1);
        }
    }
}
