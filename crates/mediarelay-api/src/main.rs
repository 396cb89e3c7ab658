use mediarelay_core::Config;

// Use mimalloc as the global allocator; staging and multipart parsing allocate heavily.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (backend, services, routes)
    let (_state, router) = mediarelay_api::setup::initialize_app(config.clone()).await?;

    // Start the server
    mediarelay_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
