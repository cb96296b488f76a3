//! Spatial query against the raster catalog.
//!
//! A single point-intersection query, filtered to category 1 scenes inside
//! a fixed acquisition-date window. Responses are bounded, so there is no
//! pagination handling.

use crate::error::{PortalError, Result};
use serde::Deserialize;
use url::Url;

/// Production catalog query endpoint.
pub const LANDSAT_QUERY_URL: &str =
    "https://landsat2.arcgis.com/arcgis/rest/services/Landsat/MS/ImageServer/query";

const ACQUISITION_WINDOW_WHERE: &str = "(1=1) AND category = 1 AND acquisitiondate >= \
     timestamp '2020-09-13 00:00:00' AND acquisitiondate <= timestamp '2020-10-31 23:59:59'";

/// Client for the raster catalog's point-intersection query.
#[derive(Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    query_url: Url,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    features: Vec<QueryFeature>,
}

#[derive(Deserialize)]
struct QueryFeature {
    attributes: QueryAttributes,
}

#[derive(Deserialize)]
struct QueryAttributes {
    #[serde(rename = "OBJECTID")]
    object_id: i64,
}

impl CatalogClient {
    pub fn new(http: reqwest::Client, query_url: Url) -> Self {
        Self { http, query_url }
    }

    /// Object ids of every raster whose footprint intersects the point.
    ///
    /// Coordinates are Web Mercator (wkid 102100 / latestWkid 3857). Absent
    /// coordinates are rejected before any network call; an empty result set
    /// is valid and left to the caller to interpret.
    pub async fn query_raster_ids(&self, x: Option<f64>, y: Option<f64>) -> Result<Vec<i64>> {
        let (Some(x), Some(y)) = (x, y) else {
            return Err(PortalError::MissingCoordinate);
        };
        if !x.is_finite() || !y.is_finite() {
            return Err(PortalError::InvalidCoordinate);
        }

        let geometry = serde_json::json!({
            "spatialReference": {"latestWkid": 3857, "wkid": 102100},
            "x": x,
            "y": y,
        });

        let response = self
            .http
            .get(self.query_url.clone())
            .query(&[
                ("where", ACQUISITION_WINDOW_WHERE),
                ("outFields", "OBJECTID"),
                ("f", "json"),
                ("returnGeometry", "false"),
                ("geometryType", "esriGeometryPoint"),
                ("spatialRel", "esriSpatialRelIntersects"),
                ("geometry", &geometry.to_string()),
            ])
            .send()
            .await?;

        let payload: QueryResponse = response.json().await?;
        Ok(payload
            .features
            .into_iter()
            .map(|feature| feature.attributes.object_id)
            .collect())
    }
}
