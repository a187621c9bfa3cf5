use subscription_aggregator::config::get_configuration;
use subscription_aggregator::startup::Application;
use subscription_aggregator::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let subscriber = get_subscriber(
        String::from("subscription_aggregator"),
        String::from("info"),
        std::io::stdout,
    );

    init_subscriber(subscriber);

    let config = get_configuration().map_err(|err| {
        tracing::error!("Failed to read configuration: {:?}", err);
        std::io::Error::new(std::io::ErrorKind::InvalidData, err)
    })?;
    let application = Application::build(config).await?;

    application.run_until_stop().await
}
