use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use appcache_packer::cli::Cli;
use appcache_packer::delivery::write_artifact;
use appcache_packer::{HttpFetcher, OfflinePacker};

#[tokio::main]
async fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let request = match cli.request() {
    Ok(request) => request,
    Err(err) => {
      eprintln!("User, repo and branch are mandatory!");
      tracing::debug!(error = %err, "Rejected request");
      return ExitCode::from(2);
    }
  };

  let run = async {
    let working_dir = std::env::current_dir()?;
    let config = cli.resolve_config(&working_dir)?;
    let output_dir = config.output_dir.clone();
    let packer = OfflinePacker::new(config, HttpFetcher::new());
    let packed = packer.pack(&request).await?;
    write_artifact(&output_dir, &packed).await
  };

  match run.await {
    Ok(path) => {
      println!("{}", path.display());
      ExitCode::SUCCESS
    }
    Err(err) => {
      eprintln!("Something went wrong!");
      tracing::error!(error = ?err, "Packing failed");
      ExitCode::FAILURE
    }
  }
}
