//! `aws` command-line runner
//!
//! Every remote call is a blocking subprocess: global options are appended
//! to the service arguments, stdout is returned on success, and a non-zero
//! exit becomes `ClientError::Exit` carrying stderr.

use std::process::{Command, Stdio};

use serde::de::DeserializeOwned;
use tracing::debug;

use super::{ClientError, ClientResult};

/// Options shared by every `aws` invocation
#[derive(Debug, Clone)]
pub struct AwsCliConfig {
    /// Program to execute (default: `aws` on PATH)
    pub program: String,
    /// `--region`
    pub region: Option<String>,
    /// `--profile`
    pub profile: Option<String>,
}

impl Default for AwsCliConfig {
    fn default() -> Self {
        Self {
            program: "aws".to_string(),
            region: None,
            profile: None,
        }
    }
}

/// Runner for `aws` subcommands
#[derive(Debug, Clone)]
pub struct AwsCli {
    config: AwsCliConfig,
}

impl AwsCli {
    pub fn new(config: AwsCliConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AwsCliConfig {
        &self.config
    }

    /// Build the full argument list for a service call.
    pub(crate) fn build_args(&self, mut args: Vec<String>, endpoint: Option<&str>, json: bool) -> Vec<String> {
        if let Some(ref region) = self.config.region {
            args.push("--region".to_string());
            args.push(region.clone());
        }
        if let Some(ref profile) = self.config.profile {
            args.push("--profile".to_string());
            args.push(profile.clone());
        }
        if let Some(endpoint) = endpoint {
            args.push("--endpoint-url".to_string());
            args.push(endpoint.to_string());
        }
        if json {
            args.push("--output".to_string());
            args.push("json".to_string());
        }
        args
    }

    /// Run a command and return its trimmed stdout.
    pub fn run(&self, args: Vec<String>, endpoint: Option<&str>) -> ClientResult<String> {
        self.execute(self.build_args(args, endpoint, false))
    }

    /// Run a command with `--output json` and decode stdout.
    pub fn run_json<T: DeserializeOwned>(&self, args: Vec<String>, endpoint: Option<&str>) -> ClientResult<T> {
        let stdout = self.execute(self.build_args(args, endpoint, true))?;
        Ok(serde_json::from_str(&stdout)?)
    }

    fn execute(&self, args: Vec<String>) -> ClientResult<String> {
        let command_line = format!("{} {}", self.config.program, args.join(" "));
        debug!("{}", command_line);

        let output = Command::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| ClientError::Spawn {
                program: self.config.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ClientError::Exit {
                command: command_line,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
