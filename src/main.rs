use anyhow::{anyhow, Context};
use mbx_bridge::bridge::framer::StreamFramer;
use mbx_bridge::config::BridgeConfig;
use mbx_bridge::telemetry::exporter::{self, ExporterState};
use mbx_bridge::telemetry::metrics::DESCRIPTORS;
use mbx_bridge::transport::{serial, WriteBack};
use mbx_bridge::{Bridge, MetricsRegistry};
use std::sync::Arc;
use std::thread;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = BridgeConfig::from_env()?;
    info!(serial_port = %config.serial.path, "Using SERIAL_PORT");

    // Composition root: the registry is shared by the bridge thread and the HTTP server.
    let registry = Arc::new(MetricsRegistry::with_descriptors(DESCRIPTORS)?);

    let (reader, writer) = serial::open(&config.serial)
        .with_context(|| format!("could not open serial port {:?}", config.serial.path))?;

    let mut framer = StreamFramer::new(config.framing);
    if let Some(limit) = config.max_pending {
        framer = framer.with_max_pending(limit);
    }
    let bridge = Bridge::new(reader, framer, registry.clone()).with_policy(config.read_policy());

    let shutdown = CancellationToken::new();
    let (done_tx, done_rx) = oneshot::channel();
    let bridge_shutdown = shutdown.clone();
    thread::Builder::new()
        .name("bridge".to_string())
        .spawn(move || {
            let err = bridge.run();
            let _ = done_tx.send(err);
            bridge_shutdown.cancel();
        })
        .context("failed to spawn bridge thread")?;

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("could not bind {}", config.listen_addr))?;
    let state = ExporterState {
        registry,
        write_back: WriteBack::new(writer),
    };
    let server = tokio::spawn(exporter::serve(listener, state, shutdown.clone()));

    let outcome = tokio::select! {
        ended = done_rx => match ended {
            Ok(err) => Err(anyhow!(err).context("bridge loop terminated")),
            Err(_) => Err(anyhow!("bridge thread exited without reporting")),
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown requested");
            Ok(())
        }
    };

    shutdown.cancel();
    match server.await {
        Ok(Err(e)) => error!(error = %e, "Metrics server error"),
        Err(e) => error!(error = %e, "Metrics server task failed"),
        Ok(Ok(())) => {}
    }

    outcome
}
