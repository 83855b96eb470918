use anyhow::Result;
use clap::{Parser, Subcommand};
use shdw_drive::cli::{self, commands};
use shdw_drive::config;
use shdw_drive::core::{Core, Overrides};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shdw-drive")]
#[command(version, about = "Signed uploads and deletes for shdwDrive storage", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(long, global = true)]
    config: Option<String>,

    /// Profile to use from config
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Drive API endpoint (overrides the profile)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Keypair file (overrides the profile)
    #[arg(long, global = true)]
    keypair: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Disable SSL certificate verification
    #[arg(long, global = true)]
    insecure: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file
    Upload {
        /// Local file path
        file: PathBuf,

        /// Bucket (storage account)
        #[arg(long)]
        bucket: Option<String>,

        /// Target directory inside the bucket
        #[arg(long)]
        directory: Option<String>,

        /// Content type (guessed from the extension when omitted)
        #[arg(long)]
        content_type: Option<String>,
    },

    /// Delete an object by key or URL
    Rm {
        /// Object key or URL
        target: String,

        /// Bucket (storage account)
        #[arg(long)]
        bucket: Option<String>,
    },

    /// List objects
    Ls {
        /// Bucket (storage account)
        #[arg(long)]
        bucket: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    cli::init_logging(&cli.log_level)?;

    // One request in flight at a time: current_thread is enough
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    let config = config::load_config(cli.config.as_deref(), cli.profile.as_deref())?;

    let overrides = Overrides {
        endpoint: cli.endpoint,
        keypair: cli.keypair,
        insecure_tls: cli.insecure,
    };
    let core = Core::new(config, overrides)?;

    match cli.command {
        Commands::Upload {
            file,
            bucket,
            directory,
            content_type,
        } => {
            commands::cmd_upload(
                &core,
                &file,
                bucket.as_deref(),
                directory.as_deref(),
                content_type.as_deref(),
            )
            .await?;
        }
        Commands::Rm { target, bucket } => {
            commands::cmd_rm(&core, &target, bucket.as_deref()).await?;
        }
        Commands::Ls { bucket } => {
            commands::cmd_ls(&core, bucket.as_deref()).await?;
        }
    }

    Ok(())
}
