//! Demo entry point.

use app::Config;

#[tokio::main]
async fn main() {
    // 1. Load configuration and initialize tracing
    let config = Config::from_env();
    app::init_tracing(&config);
    tracing::debug!(?config, "configuration loaded");

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Run the payment lifecycle
    match app::demo::run(&config).await {
        Ok(report) => tracing::info!(
            payment_ref = %report.payment_ref,
            order_ref = %report.order_ref,
            final_state = %report.final_state,
            projected_state = %report.projected_state,
            events_published = report.events_published,
            rejected_transitions = report.rejected_transitions,
            "demo complete"
        ),
        Err(e) => {
            tracing::error!(error = %e, "demo failed");
            std::process::exit(1);
        }
    }

    // 4. Dump collected metrics
    tracing::info!(metrics = %metrics_handle.render(), "metrics snapshot");
}
