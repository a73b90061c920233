use clap::Parser;
use omf_ingress_client::{
    sample, AppSettings, ConnectionManager, Device, HttpClient, SampleContext,
};
use simple_logger::SimpleLogger;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Create an OMF connection, send a few readings and clean up
#[derive(Parser, Debug)]
#[command(name = "omf-ingress-sample", version)]
struct Args {
    /// Settings file (.json, .yaml or .yml)
    #[arg(short, long, default_value = "appsettings.json")]
    config: PathBuf,

    /// Log level: off, error, warn, info, debug or trace
    #[arg(long, default_value = "info")]
    log_level: log::LevelFilter,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = SimpleLogger::new().with_level(args.log_level).init() {
        eprintln!("failed to initialise logging: {}", e);
        return ExitCode::FAILURE;
    }

    let ctx = match build_context(&args) {
        Ok(ctx) => ctx,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, cleaning up");
            on_signal.cancel();
        }
    });

    match sample::run(&ctx, &cancel).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            log::error!("{}", failure);
            ExitCode::FAILURE
        }
    }
}

fn build_context(args: &Args) -> Result<SampleContext, omf_ingress_client::ApiClientError> {
    let settings = AppSettings::load(&args.config)?;
    let admin = Arc::new(HttpClient::new(settings.admin_settings())?);
    let device = Arc::new(HttpClient::new(settings.device_settings())?);

    Ok(SampleContext {
        connections: ConnectionManager::new(admin, settings.poll_settings()),
        device: Device::new(device),
        settings,
    })
}
