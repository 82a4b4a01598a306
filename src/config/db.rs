use mongodb::Client;
use tracing::{error, info};

use crate::{
    config::settings::Settings, error::AppError, repositories::poll_repository::PollRepository,
};

pub async fn init_database(settings: &Settings) -> Result<Client, AppError> {
    let client = Client::with_uri_str(&settings.mongo_uri).await.map_err(|e| {
        error!("Failed to connect to MongoDB: {}", e);
        AppError::from(e)
    })?;
    info!("Connected to MongoDB database {}", settings.database_name);
    Ok(client)
}

/// Connects and prepares the poll collections.
pub async fn init_poll_repository(settings: &Settings) -> Result<PollRepository, AppError> {
    let client = init_database(settings).await?;
    let repository = PollRepository::new(client, &settings.database_name);
    repository.ensure_indexes().await?;
    Ok(repository)
}
