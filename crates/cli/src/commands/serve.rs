//! `factquest serve`: Start the browser chat gateway.

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let (mut config, secrets) = super::load_settings()?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("FactQuest Gateway");
    println!("   Listening: http://{}:{}/", config.gateway.host, config.gateway.port);
    println!("   Model:     {}", config.model.model);

    factquest_gateway::start(config, secrets).await?;

    Ok(())
}
