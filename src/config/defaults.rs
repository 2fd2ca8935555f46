//! Built-in defaults (layer 1)

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use batchrun_protocol::DEFAULT_LOG_GROUP;

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Job queue (default: "optimal")
    pub job_queue: String,

    /// Job name (default: "default")
    pub job_name: String,

    /// Region passed to the `aws` tool (default: "us-west-2")
    pub region: String,

    /// Path of the `aws` tool inside the job container
    pub awscli: String,

    /// Working directory inside the job container (default: "tmp")
    pub workdir: String,

    /// Delete the staging prefix after the run (default: true)
    pub teardown: bool,

    /// Status poll interval in milliseconds (default: 1000)
    pub poll_interval_ms: u64,

    /// Log group holding job output
    pub log_group: String,

    /// Host-side `aws` program (default: "aws" on PATH)
    pub aws_program: String,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            job_queue: "optimal".to_string(),
            job_name: "default".to_string(),
            region: "us-west-2".to_string(),
            awscli: "/home/ec2-user/miniconda/bin/aws".to_string(),
            workdir: "tmp".to_string(),
            teardown: true,
            poll_interval_ms: 1000,
            log_group: DEFAULT_LOG_GROUP.to_string(),
            aws_program: "aws".to_string(),
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> Value {
        json!({
            "job_queue": self.job_queue,
            "job_name": self.job_name,
            "region": self.region,
            "awscli": self.awscli,
            "workdir": self.workdir,
            "teardown": self.teardown,
            "poll_interval_ms": self.poll_interval_ms,
            "log_group": self.log_group,
            "aws_program": self.aws_program,
            "endpoints": {}
        })
    }
}
