use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use std::collections::HashMap;

use super::error::StoreError;
use super::model::{Image, Timestamp};
use super::store::{new_image_id, ImageStore};

/// Hash key of the image table.
pub const ID_ATTRIBUTE: &str = "id";

/// Convert a raw DynamoDB item into an `Image`.
///
/// `created_at` is optional; `id` and `url` are not.
pub fn image_from_item(item: &HashMap<String, AttributeValue>) -> Result<Image, StoreError> {
    let id = item
        .get(ID_ATTRIBUTE)
        .and_then(|v| v.as_s().ok())
        .ok_or_else(|| StoreError::Malformed("item has no id".to_string()))?;
    let url = item
        .get("url")
        .and_then(|v| v.as_s().ok())
        .ok_or_else(|| StoreError::Malformed(format!("item {} has no url", id)))?;
    let created_at = match item.get("created_at").and_then(|v| v.as_s().ok()) {
        Some(raw) => Some(
            raw.parse::<Timestamp>()
                .map_err(|e| StoreError::Malformed(format!("item {} created_at: {}", id, e)))?,
        ),
        None => None,
    };

    Ok(Image {
        id: id.to_string(),
        url: url.to_string(),
        created_at,
    })
}

/// Scan the whole table, following every page
pub async fn list_images(client: &DynamoClient, table_name: &str) -> Result<Vec<Image>, StoreError> {
    let items: Result<Vec<_>, _> = client
        .scan()
        .table_name(table_name)
        .into_paginator()
        .items()
        .send()
        .collect()
        .await;
    let items = items.map_err(|e| StoreError::connectivity_fault("scan", DisplayErrorContext(&e)))?;

    items.iter().map(image_from_item).collect()
}

/// Insert a new image under a freshly generated id
pub async fn create_image(
    client: &DynamoClient,
    table_name: &str,
    url: String,
    created_at: Option<Timestamp>,
) -> Result<Image, StoreError> {
    let id = new_image_id();

    let mut builder = client
        .put_item()
        .table_name(table_name)
        .item(ID_ATTRIBUTE, AttributeValue::S(id.clone()))
        .item("url", AttributeValue::S(url.clone()))
        .condition_expression("attribute_not_exists(#id)")
        .expression_attribute_names("#id", ID_ATTRIBUTE);

    // Absent timestamps are left off the item entirely
    if let Some(ts) = &created_at {
        builder = builder.item("created_at", AttributeValue::S(ts.to_string()));
    }

    builder.send().await.map_err(|e| {
        if e
            .as_service_error()
            .is_some_and(|se| se.is_conditional_check_failed_exception())
        {
            StoreError::Conflict(id.clone())
        } else {
            StoreError::connectivity_fault("put_item", DisplayErrorContext(&e))
        }
    })?;

    Ok(Image { id, url, created_at })
}

/// Delete an image; a missing id fails the condition and nothing is touched
pub async fn delete_image(
    client: &DynamoClient,
    table_name: &str,
    image_id: &str,
) -> Result<(), StoreError> {
    client
        .delete_item()
        .table_name(table_name)
        .key(ID_ATTRIBUTE, AttributeValue::S(image_id.to_string()))
        .condition_expression("attribute_exists(#id)")
        .expression_attribute_names("#id", ID_ATTRIBUTE)
        .send()
        .await
        .map_err(|e| {
            if e
                .as_service_error()
                .is_some_and(|se| se.is_conditional_check_failed_exception())
            {
                StoreError::NotFound(image_id.to_string())
            } else {
                StoreError::connectivity_fault("delete_item", DisplayErrorContext(&e))
            }
        })?;

    Ok(())
}

/// [`ImageStore`] backed by one DynamoDB table.
///
/// The client is a cheap handle over a shared connection pool, so the
/// store can be cloned freely.
#[derive(Clone, Debug)]
pub struct DynamoImageStore {
    client: DynamoClient,
    table_name: String,
}

impl DynamoImageStore {
    pub fn new(client: DynamoClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

#[async_trait]
impl ImageStore for DynamoImageStore {
    async fn list(&self) -> Result<Vec<Image>, StoreError> {
        list_images(&self.client, &self.table_name).await
    }

    async fn insert(
        &self,
        url: String,
        created_at: Option<Timestamp>,
    ) -> Result<Image, StoreError> {
        create_image(&self.client, &self.table_name, url, created_at).await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        delete_image(&self.client, &self.table_name, id).await
    }
}
