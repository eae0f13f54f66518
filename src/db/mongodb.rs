use anyhow::{Context, Result};
use mongodb::{Client, Database, bson::doc};

/// Connect to MongoDB and check the server answers before serving requests.
pub async fn get_database(uri: &str, database_name: &str) -> Result<Database> {
    let client = Client::with_uri_str(uri)
        .await
        .context("Failed to create MongoDB client")?;
    let db = client.database(database_name);

    db.run_command(doc! { "ping": 1 })
        .await
        .context("MongoDB did not answer ping")?;

    log::info!("Connected to MongoDB database '{}'", database_name);
    Ok(db)
}
