//! Project provisioning.
//!
//! Builds the project definition document and submits it through the
//! item-creation collaborator. The outcome is a tagged type; the legacy
//! `{message, success}` payload is only produced at the handler edge.

use crate::metrics_defs::PROJECTS_CREATED;
use chrono::Local;
use portal::items::ItemCreator;
use portal::types::{
    BASE_WEBMAP_ID, FocusImageLayer, LANDSAT_IMAGE_SERVICE_URL, OBSERVATION_LAYER_ITEM_ID,
    ObservationLayer, ProjectDefinition,
};
use shared::counter;
use std::sync::Arc;
use url::Url;

const PROJECT_SUMMARY: &str = "A simple project with just a focus image layer";
const PROJECT_INSTRUCTIONS: &str = "Please Review the area for potential fires";

/// Outcome of one provisioning attempt. The platform creates a fresh item
/// per submission, so equal inputs still produce distinct ids.
#[derive(Debug)]
pub enum ProjectOutcome {
    Success {
        item_id: String,
        item_link: String,
        project_link: String,
    },
    Failure {
        message: String,
    },
}

pub struct Provisioner {
    creator: Arc<dyn ItemCreator>,
    org_url: Url,
    username: String,
    password: String,
    share_with_org: bool,
}

impl Provisioner {
    pub fn new(
        creator: Arc<dyn ItemCreator>,
        org_url: Url,
        username: String,
        password: String,
        share_with_org: bool,
    ) -> Self {
        Self {
            creator,
            org_url,
            username,
            password,
            share_with_org,
        }
    }

    /// Timestamp label used in derived project titles.
    pub fn timestamp_label() -> String {
        Local::now().format("%m_%d_%Y_%H_%M_%S").to_string()
    }

    pub async fn provision(
        &self,
        raster_ids: Vec<i64>,
        title_seed: Option<&str>,
        with_observation_layer: bool,
    ) -> ProjectOutcome {
        if self.username.is_empty() {
            return ProjectOutcome::Failure {
                message: "unable to get user username from configuration".into(),
            };
        }
        if self.password.is_empty() {
            return ProjectOutcome::Failure {
                message: "unable to get user password from configuration".into(),
            };
        }

        let title = match title_seed {
            Some(seed) => seed.to_string(),
            None => format!("Excalibur Project {}", Self::timestamp_label()),
        };

        let definition = ProjectDefinition {
            title,
            summary: PROJECT_SUMMARY.into(),
            description: String::new(),
            instructions: PROJECT_INSTRUCTIONS.into(),
            focus_image_layer: FocusImageLayer {
                service_type: "arcgis".into(),
                service_url: LANDSAT_IMAGE_SERVICE_URL.into(),
                raster_ids,
                layer_names: vec![],
            },
            webmap_id: BASE_WEBMAP_ID.into(),
            observation_layers: with_observation_layer.then(|| {
                vec![ObservationLayer {
                    layer_type: "Feature Layer".into(),
                    item_id: OBSERVATION_LAYER_ITEM_ID.into(),
                }]
            }),
        };

        tracing::info!(
            title = %definition.title,
            share_with_org = self.share_with_org,
            "creating project"
        );

        match self.creator.create_item(&definition, self.share_with_org).await {
            Ok(item_id) => {
                counter!(PROJECTS_CREATED).increment(1);
                let org = self.org_url.as_str().trim_end_matches('/');
                ProjectOutcome::Success {
                    item_link: format!("{org}/home/item.html?id={item_id}"),
                    project_link: format!(
                        "{org}/apps/excalibur/app.html#/canvas/project?id={item_id}"
                    ),
                    item_id,
                }
            }
            Err(e) => ProjectOutcome::Failure {
                message: format!("Error creating project: {e}"),
            },
        }
    }
}
