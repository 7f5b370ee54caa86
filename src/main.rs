use std::path::Path;
use std::sync::Arc;

use tengine::load_suite;
use tengine::utils::file_io;
use tengine::ClusterRegistry;
use tengine::EngineConfig;
use tengine::Error;
use tengine::ExecModule;
use tengine::ModuleRegistry;
use tengine::Result;
use tengine::SshDispatcher;
use tengine::StepExecutor;
use tengine::SuiteRunner;
use tengine::EXEC_MODULE;
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let suite_path = args.next().ok_or_else(usage)?;
    let inventory_path = args.next().ok_or_else(usage)?;
    let override_config = args.next();

    let mut settings = EngineConfig::new()?;
    if let Some(path) = &override_config {
        info!("with_override_config from: {}", path);
        settings = settings.with_override_config(path)?;
    }
    settings.validate()?;

    // Initializing Logs
    let _guard = init_observability(&settings)?;

    // Initializing Shutdown Signal
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if let Err(e) = graceful_shutdown(cancel).await {
                error!("Failed to shutdown: {:?}", e);
            }
        }
    });

    // Register clusters from the inventory file
    let registry = Arc::new(ClusterRegistry::new());
    let count = registry.load_inventory(Path::new(&inventory_path))?;
    info!("loaded {} cluster(s) from {}", count, inventory_path);

    // Built-in capabilities; harness-specific modules are registered by
    // embedding this crate as a library
    let modules = Arc::new(ModuleRegistry::new());
    let dispatcher = Arc::new(SshDispatcher::new(settings.ssh.clone()));
    modules.register(EXEC_MODULE, Arc::new(ExecModule::new(dispatcher)));

    let suite = load_suite(Path::new(&suite_path))?;
    let executor = StepExecutor::new(registry.clone(), modules, settings.execution.clone())
        .with_cancel(cancel.clone());
    let runner = SuiteRunner::new(executor, registry, settings.execution.default_cluster.clone())
        .with_cancel(cancel);

    let report = runner.run(&suite).await?;
    println!("{report}");

    if !report.passed() {
        std::process::exit(1);
    }
    Ok(())
}

fn usage() -> Error {
    Error::Fatal("usage: t-engine <suite.yaml> <inventory.yaml> [override-config.toml]".to_string())
}

async fn graceful_shutdown(cancel: CancellationToken) -> Result<()> {
    let mut sigint = signal(SignalKind::interrupt()).map_err(tengine::SystemError::Io)?;
    let mut sigterm = signal(SignalKind::terminate()).map_err(tengine::SystemError::Io)?;
    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT detected.");
        },
        _ = sigterm.recv() => {
            info!("SIGTERM detected.");
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl+C detected.");
        },
    }

    info!("Shutdown requested, skipping steps that have not started");
    cancel.cancel();
    Ok(())
}

pub fn init_observability(settings: &EngineConfig) -> Result<WorkerGuard> {
    let log_file = file_io::open_file_for_append(settings.logging.log_file_path())?;

    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);
    let base_subscriber = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::from_default_env());
    tracing_subscriber::registry().with(base_subscriber).init();

    Ok(guard)
}
