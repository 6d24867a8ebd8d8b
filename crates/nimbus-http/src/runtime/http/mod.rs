//! # HTTP Runtime
//!
//! Shared state for the diagnosis API and the server entry point. The
//! [`DiagnosisService`] is built once before the listener binds and is only
//! read afterwards, so handlers share it through an `Arc` without locking.

mod config;

pub use config::HttpRuntimeConfig;

use crate::runtime::metrics::RuntimeMetrics;
use nimbus_core::{DiagnosisService, ModelBundle};
use std::{future, path::Path, sync::Arc};
use tokio::{net::TcpListener, signal};

/// HTTP server state: the diagnosis service and its metrics
#[derive(Debug, Clone)]
pub struct DiagnosisRuntime {
    pub service: Arc<DiagnosisService>,
    /// `None` when the metrics registry could not be created
    pub metrics: Option<Arc<RuntimeMetrics>>,
}

impl DiagnosisRuntime {
    pub fn new(service: DiagnosisService) -> Self {
        let metrics = match RuntimeMetrics::new() {
            Ok(metrics) => Some(Arc::new(metrics)),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to initialize metrics registry");
                None
            }
        };

        tracing::info!(
            model_loaded = service.is_model_loaded(),
            symptoms = service.symptom_table().len(),
            "Diagnosis runtime initialized"
        );

        Self {
            service: Arc::new(service),
            metrics,
        }
    }

    /// Bind the configured address and serve until SIGINT or SIGTERM.
    pub async fn serve(self, config: HttpRuntimeConfig) -> std::io::Result<()> {
        let address = config.bind_address();
        let listener = TcpListener::bind(&address).await?;
        tracing::info!(
            address = %listener.local_addr()?,
            cors = config.enable_cors,
            openapi = config.enable_openapi,
            metrics = config.enable_metrics,
            "NimbusVita diagnosis API listening"
        );

        axum::serve(listener, self.router_with_config(config))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

/// Resolves on the first SIGINT or SIGTERM.
///
/// A signal that cannot be listened for is logged and never fires, so the
/// other one still stops the server.
pub async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Cannot listen for SIGINT");
            future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Cannot listen for SIGTERM");
                future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = future::pending::<()>();

    tokio::select! {
        _ = interrupt => tracing::info!("SIGINT received, draining in-flight requests"),
        _ = terminate => tracing::info!("SIGTERM received, draining in-flight requests"),
    }
}

/// Load the model artifact, tolerating its absence.
///
/// A missing file is logged as a warning and an unreadable or invalid one as
/// an error; either way the service starts without a model and predictions
/// answer 503.
pub fn load_model(path: impl AsRef<Path>) -> Option<ModelBundle> {
    let path = path.as_ref();
    match ModelBundle::load(path) {
        Ok(bundle) => {
            let summary = bundle.summary();
            tracing::info!(
                path = %path.display(),
                kind = summary.kind,
                shape = ?summary.shape,
                features = summary.feature_names.len(),
                classes = ?summary.classes,
                "Model loaded"
            );
            Some(bundle)
        }
        Err(e) if e.is_not_found() => {
            tracing::warn!(path = %path.display(), "Model not found, starting without a model");
            None
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to load model");
            None
        }
    }
}
