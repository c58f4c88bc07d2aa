use aws_config::{timeout::TimeoutConfig, BehaviorVersion};
use aws_sdk_dynamodb::client::Waiters;
use aws_sdk_dynamodb::error::{BuildError, DisplayErrorContext};
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType,
};
use aws_sdk_dynamodb::Client as DynamoClient;
use imagedb_atoms::media::{DynamoImageStore, ImageStore, StoreError, ID_ATTRIBUTE};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::{Config, ConfigError};

/// How long startup waits for a freshly created table to become active
const TABLE_READY_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid table definition: {0}")]
    TableDefinition(#[from] BuildError),
}

/// Process-wide state, built once before the first request and handed to
/// every invocation.
pub struct AppState {
    pub images: Arc<dyn ImageStore>,
}

impl AppState {
    pub fn new(images: Arc<dyn ImageStore>) -> Self {
        Self { images }
    }

    /// Connect to DynamoDB, make sure the table exists and check the store
    /// answers. Any error here must stop the process before it serves.
    pub async fn connect(config: &Config) -> Result<Self, StartupError> {
        let client = dynamo_client(config).await;

        ensure_table(&client, &config.table_name).await?;
        check_liveness(&client).await?;
        tracing::info!("DynamoDB connection was successful (table {})", config.table_name);

        Ok(Self::new(Arc::new(DynamoImageStore::new(
            client,
            config.table_name.clone(),
        ))))
    }
}

async fn dynamo_client(config: &Config) -> DynamoClient {
    let timeouts = TimeoutConfig::builder()
        .operation_timeout(config.store_timeout)
        .build();

    let mut loader = aws_config::defaults(BehaviorVersion::latest()).timeout_config(timeouts);
    if let Some(endpoint) = &config.endpoint_url {
        tracing::info!("Using DynamoDB endpoint {}", endpoint);
        loader = loader.endpoint_url(endpoint);
    }

    DynamoClient::new(&loader.load().await)
}

/// Create the image table unless it is already there
pub async fn ensure_table(client: &DynamoClient, table_name: &str) -> Result<(), StartupError> {
    match client.describe_table().table_name(table_name).send().await {
        Ok(_) => {
            tracing::info!("Table {} already exists", table_name);
            Ok(())
        }
        Err(e)
            if e
                .as_service_error()
                .is_some_and(|se| se.is_resource_not_found_exception()) =>
        {
            create_table(client, table_name).await
        }
        Err(e) => Err(StoreError::connectivity_fault("describe_table", DisplayErrorContext(&e)).into()),
    }
}

async fn create_table(client: &DynamoClient, table_name: &str) -> Result<(), StartupError> {
    tracing::info!("Creating table: {}", table_name);

    let key = KeySchemaElement::builder()
        .attribute_name(ID_ATTRIBUTE)
        .key_type(KeyType::Hash)
        .build()?;
    let attribute = AttributeDefinition::builder()
        .attribute_name(ID_ATTRIBUTE)
        .attribute_type(ScalarAttributeType::S)
        .build()?;

    let created = client
        .create_table()
        .table_name(table_name)
        .key_schema(key)
        .attribute_definitions(attribute)
        .billing_mode(BillingMode::PayPerRequest)
        .send()
        .await;

    match created {
        Ok(_) => {}
        // Another instance won the race
        Err(e)
            if e
                .as_service_error()
                .is_some_and(|se| se.is_resource_in_use_exception()) =>
        {
            tracing::info!("Table {} already exists", table_name);
        }
        Err(e) => {
            return Err(StoreError::connectivity_fault("create_table", DisplayErrorContext(&e)).into())
        }
    }

    client
        .wait_until_table_exists()
        .table_name(table_name)
        .wait(TABLE_READY_TIMEOUT)
        .await
        .map_err(|e| StoreError::connectivity_fault("table wait", DisplayErrorContext(&e)))?;

    Ok(())
}

/// Cheapest round-trip the store offers
pub async fn check_liveness(client: &DynamoClient) -> Result<(), StoreError> {
    client
        .list_tables()
        .limit(1)
        .send()
        .await
        .map_err(|e| StoreError::connectivity_fault("list_tables", DisplayErrorContext(&e)))?;
    Ok(())
}
