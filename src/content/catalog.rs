//! Typed collections: products, blog posts, client logos, projects.

use std::marker::PhantomData;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ApiError, ApiResult};
use crate::http::ApiClient;

/// An entity stored in a backend collection.
pub trait CatalogItem: Serialize + DeserializeOwned + Send + Sync {
    /// Collection path, e.g. `/api/products`.
    const PATH: &'static str;

    fn id(&self) -> Option<&str>;
}

/// Product in the building-materials catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Specification table (grade, dimensions, standard, ...).
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub specifications: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CatalogItem for Product {
    const PATH: &'static str = "/api/products";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CatalogItem for BlogPost {
    const PATH: &'static str = "/api/blogs";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientLogo {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CatalogItem for ClientLogo {
    const PATH: &'static str = "/api/clients";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CatalogItem for Project {
    const PATH: &'static str = "/api/projects";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// CRUD over one collection.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    client: ApiClient,
    _item: PhantomData<fn() -> T>,
}

impl<T: CatalogItem> Collection<T> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            _item: PhantomData,
        }
    }

    fn item_path(id: &str) -> String {
        format!("{}/{}", T::PATH, utf8_percent_encode(id, NON_ALPHANUMERIC))
    }

    /// All items. Accepts a bare array or an object wrapping one.
    pub async fn list(&self) -> ApiResult<Vec<T>> {
        let value: Value = self.client.get_json(T::PATH).await?;
        decode_listing(value)
    }

    pub async fn get(&self, id: &str) -> ApiResult<T> {
        let value: Value = self.client.get_json(&Self::item_path(id)).await?;
        decode_item(value)
    }

    /// Create an item and return what the backend stored.
    pub async fn create(&self, item: &T) -> ApiResult<T> {
        let response = self.client.post_json(T::PATH, item).await?;
        tracing::info!(collection = T::PATH, "Item created");
        decode_item(response.json()?)
    }

    pub async fn update(&self, id: &str, item: &T) -> ApiResult<T> {
        let response = self.client.put_json(&Self::item_path(id), item).await?;
        tracing::info!(collection = T::PATH, id, "Item updated");
        decode_item(response.json()?)
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.client.delete(&Self::item_path(id)).await?;
        tracing::info!(collection = T::PATH, id, "Item deleted");
        Ok(())
    }
}

fn decode_listing<T: DeserializeOwned>(value: Value) -> ApiResult<Vec<T>> {
    match value {
        Value::Array(_) => Ok(serde_json::from_value(value)?),
        Value::Object(mut map) => {
            let key = ["data", "items"]
                .iter()
                .map(|k| k.to_string())
                .find(|k| map.get(k).map_or(false, Value::is_array))
                .or_else(|| map.iter().find(|(_, v)| v.is_array()).map(|(k, _)| k.clone()));
            match key.and_then(|k| map.remove(&k)) {
                Some(items) => Ok(serde_json::from_value(items)?),
                None => Err(ApiError::InvalidRequest("listing response contains no array".into())),
            }
        }
        _ => Err(ApiError::InvalidRequest("listing response is not an array or object".into())),
    }
}

/// Unwrap `{ "data": {...} }` style envelopes around a single item.
fn decode_item<T: DeserializeOwned>(value: Value) -> ApiResult<T> {
    if let Value::Object(map) = &value {
        if map.len() == 1 {
            if let Some(inner @ Value::Object(_)) = map.get("data") {
                return Ok(serde_json::from_value(inner.clone())?);
            }
        }
    }
    Ok(serde_json::from_value(value)?)
}
