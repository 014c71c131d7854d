use chirpy::configuration::get_configuration;
use chirpy::startup::run;
use chirpy::store::Store;
use chirpy::telemetry::init_telemetry;
use std::net::TcpListener;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!(?config, "Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    let store = Store::open(&configuration.store.path).await.map_err(|e| {
        tracing::error!(path = %configuration.store.path, "Failed to open store: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, "Store error")
    })?;

    let address = configuration.application.address();
    let listener = TcpListener::bind(&address)?;
    tracing::info!(
        %address,
        static_dir = %configuration.application.static_dir,
        "Server listening"
    );

    let server = run(listener, store, configuration)?;
    server.await
}
