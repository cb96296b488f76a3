use shared::metrics_defs::{MetricDef, MetricType};

pub const JOB_POLLS: MetricDef = MetricDef {
    name: "changes.job_polls",
    metric_type: MetricType::Counter,
    description: "Status checks issued against extract-changes jobs",
};

pub const JOB_TIMEOUTS: MetricDef = MetricDef {
    name: "changes.job_timeouts",
    metric_type: MetricType::Counter,
    description: "Extract-changes jobs abandoned after exhausting the poll budget",
};

pub const ALL_METRICS: &[MetricDef] = &[JOB_POLLS, JOB_TIMEOUTS];
