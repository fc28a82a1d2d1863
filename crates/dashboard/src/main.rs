use dashboard::{config::DashboardConfig, run};
use tracker::render::LogRenderer;

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = DashboardConfig::from_env();
    log::info!(
        "Tracking via {:?} with config from '{}'.",
        config.transport,
        config.config_url
    );

    tokio::select! {
        result = run(&config, LogRenderer::default()) => {
            if let Err(why) = result {
                log::error!("{}", why);
                std::process::exit(1);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            log::info!("Ctrl+C detected. Shutting down.");
        }
    }
}
