use shared::metrics_defs::{MetricDef, MetricType};

pub const REQUESTS: MetricDef = MetricDef {
    name: "request.count",
    metric_type: MetricType::Counter,
    description: "API requests received, all endpoints",
};

pub const PIPELINE_ABORTS: MetricDef = MetricDef {
    name: "webhook.pipeline_aborts",
    metric_type: MetricType::Counter,
    description: "Webhook pipelines that aborted before Done",
};

pub const PROJECTS_CREATED: MetricDef = MetricDef {
    name: "projects.created",
    metric_type: MetricType::Counter,
    description: "Projects successfully provisioned on the platform",
};

pub const ALL_METRICS: &[MetricDef] = &[REQUESTS, PIPELINE_ABORTS, PROJECTS_CREATED];
