use std::{net::TcpListener, sync::Arc, time::Duration};

use amplify::{
    configuration::get_configuration,
    services::{
        DescriptionGenerator, JobStore, Orchestrator, PageFetcher, PagespeedClient, ResultCache,
    },
    startup::run,
};
use env_logger::Env;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().expect("Failed to read configuration.");

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(address)?;

    let cache = Arc::new(ResultCache::new(Duration::from_secs(
        configuration.cache.ttl_seconds,
    )));
    let jobs = Arc::new(JobStore::new());
    let fetcher = PageFetcher::new(Duration::from_secs(
        configuration.analysis.fetch_timeout_seconds,
    ));
    let pagespeed = PagespeedClient::new(&configuration.pagespeed);
    let generator =
        DescriptionGenerator::new(configuration.openai.api_key, configuration.openai.model);

    let orchestrator = Orchestrator::new(jobs.clone(), cache.clone(), fetcher, pagespeed, generator);

    // Spawn background sweep: expired cache entries and finished jobs past
    // their retention window.
    let sweep_interval = Duration::from_secs(configuration.cache.cleanup_interval_seconds);
    let retention = chrono::Duration::seconds(configuration.analysis.job_retention_seconds as i64);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_interval);
        loop {
            interval.tick().await;
            let expired = cache.sweep_expired().await;
            let collected = jobs.sweep_terminal(retention).await;
            if expired > 0 || collected > 0 {
                log::info!(
                    "Swept {} expired cache entries and {} finished jobs",
                    expired,
                    collected
                );
            }
        }
    });

    run(listener, orchestrator)?.await
}
