//! Wire types shared across the portal REST surfaces.
//!
//! Field names follow the platform's camelCase JSON. `ChangeDescriptor` is
//! the record delivered by a feature-service webhook; `ProjectDefinition`
//! is the exact document submitted to the item-creation collaborator.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// Image service whose scenes back every focus image layer.
pub const LANDSAT_IMAGE_SERVICE_URL: &str =
    "https://landsat2.arcgis.com/arcgis/rest/services/Landsat/MS/ImageServer";

/// Base web map every provisioned project is built on.
pub const BASE_WEBMAP_ID: &str = "b3acf0e05f79481b8300445cdbb121f8";

/// Feature layer attached as the observation layer on webhook-provisioned
/// projects.
pub const OBSERVATION_LAYER_ITEM_ID: &str = "d7ee4715bb9847d9a32b290429cfabb4";

/// Decoded webhook payload: one descriptor per changed service.
pub type ChangeNotification = Vec<ChangeDescriptor>;

/// One change record from an upstream feature-service webhook.
///
/// Example payload element:
/// ```json
/// {
///   "name": "workforce",
///   "layerId": 0,
///   "orgId": "LG9Yn2oFqZi5PnO5",
///   "serviceName": "VIIRS_Alerts",
///   "lastUpdatedTime": 1604592345156,
///   "changesUrl": "https%3a%2f%2f...%2fextractChanges%3f...",
///   "events": ["FeaturesCreated"]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub layer_id: Option<u64>,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub service_name: Option<String>,
    #[serde(default)]
    pub last_updated_time: Option<u64>,
    /// Percent-encoded URL of the extract-changes operation.
    pub changes_url: String,
    #[serde(default)]
    pub events: Vec<String>,
}

/// Web Mercator point (wkid 102100 / latestWkid 3857).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// One feature change extracted from a completed job's result payload.
/// Only the geometry is consumed downstream.
#[derive(Debug, Clone, Deserialize)]
pub struct EditedFeature {
    pub geometry: Point,
    #[serde(default)]
    pub attributes: HashMap<String, JsonValue>,
}

/// Project document submitted to the item-creation collaborator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDefinition {
    pub title: String,
    pub summary: String,
    pub description: String,
    pub instructions: String,
    pub focus_image_layer: FocusImageLayer,
    pub webmap_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation_layers: Option<Vec<ObservationLayer>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusImageLayer {
    pub service_type: String,
    pub service_url: String,
    pub raster_ids: Vec<i64>,
    pub layer_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObservationLayer {
    #[serde(rename = "type")]
    pub layer_type: String,
    #[serde(rename = "itemId")]
    pub item_id: String,
}
