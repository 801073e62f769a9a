//! Command-line entry point: prints the effective permissions of an IAM
//! user or role as key-sorted JSON on stdout.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use iam_effective_permissions_engine::{
    EffectivePermissionsService, Entity, FilePolicyStore, PermissionsError, PolicyStore,
};
use log::debug;

/// Exit code for failures retrieving policies or writing output
const EXIT_FAILURE: u8 = 1;
/// Exit code for policies that cannot be interpreted
const EXIT_MALFORMED_INPUT: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "iam-effective-permissions",
    version,
    about = "Summarize the effective allow permissions of an IAM user or role"
)]
struct Cli {
    /// Name of the IAM user (or role, with --role) to evaluate
    entity: String,

    /// Evaluate a role instead of a user
    #[arg(long)]
    role: bool,

    /// AWS region used for the IAM client
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,

    /// Named profile from the shared AWS config files
    #[arg(long, env = "AWS_PROFILE")]
    profile: Option<String>,

    /// Read policy documents from a local JSON file instead of calling IAM (repeatable)
    #[arg(long = "policy-file", value_name = "PATH")]
    policy_files: Vec<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn entity(&self) -> Entity {
        if self.role {
            Entity::role(self.entity.clone())
        } else {
            Entity::user(self.entity.clone())
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

async fn evaluate<S: PolicyStore>(
    service: EffectivePermissionsService<S>,
    entity: &Entity,
) -> Result<String> {
    let report = service
        .evaluate(entity)
        .await
        .with_context(|| format!("Failed to evaluate {} '{}'", entity.entity_type, entity.name))?;
    report
        .to_pretty_json()
        .context("Failed to serialize permission summary")
}

async fn run(cli: &Cli) -> Result<String> {
    let entity = cli.entity();
    if cli.policy_files.is_empty() {
        debug!("Reading policies for {} {} from IAM", entity.entity_type, entity.name);
        let service =
            EffectivePermissionsService::from_aws(cli.region.clone(), cli.profile.clone())
                .await
                .context("Failed to initialize IAM client")?;
        evaluate(service, &entity).await
    } else {
        debug!("Reading policies from {} local file(s)", cli.policy_files.len());
        let store = FilePolicyStore::new(cli.policy_files.clone());
        evaluate(EffectivePermissionsService::new(store), &entity).await
    }
}

fn exit_code_for(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<PermissionsError>() {
        Some(e) if e.is_malformed_input() => EXIT_MALFORMED_INPUT,
        _ => EXIT_FAILURE,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli).await {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}
