//! MongoDB Index Initialization
//!
//! Creates the `accounts` indexes on application startup. The unique email
//! index is load-bearing: it is the only thing preventing two accounts with
//! the same email under concurrent signups.

use mongodb::{bson::doc, options::IndexOptions, Database, IndexModel};
use tracing::info;

/// Initialize all MongoDB indexes
pub async fn initialize_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    info!("Initializing MongoDB indexes...");

    create_account_indexes(db).await?;

    info!("MongoDB indexes initialized successfully");
    Ok(())
}

async fn create_account_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let collection = db.collection::<mongodb::bson::Document>("accounts");

    // Email lookup and the uniqueness guarantee
    collection
        .create_index(
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(IndexOptions::builder().unique(true).background(true).build())
                .build(),
        )
        .await?;

    // Provider filtering for operational queries
    collection
        .create_index(
            IndexModel::builder()
                .keys(doc! { "provider": 1 })
                .options(IndexOptions::builder().background(true).build())
                .build(),
        )
        .await?;

    info!("Created indexes on accounts");
    Ok(())
}
