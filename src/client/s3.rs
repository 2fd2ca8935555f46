//! Object storage over `aws s3`.

use super::{AwsCli, ClientResult, Location, ObjectStore};

/// `ObjectStore` backed by `aws s3 cp` and `aws s3 rm --recursive`
#[derive(Debug, Clone)]
pub struct AwsS3 {
    cli: AwsCli,
    endpoint: Option<String>,
}

impl AwsS3 {
    pub fn new(cli: AwsCli, endpoint: Option<String>) -> Self {
        Self { cli, endpoint }
    }
}

pub(crate) fn copy_args(from: &Location, to: &Location) -> Vec<String> {
    vec!["s3".to_string(), "cp".to_string(), from.to_string(), to.to_string()]
}

pub(crate) fn remove_args(uri: &str) -> Vec<String> {
    vec![
        "s3".to_string(),
        "rm".to_string(),
        "--recursive".to_string(),
        uri.to_string(),
    ]
}

impl ObjectStore for AwsS3 {
    fn copy(&self, from: &Location, to: &Location) -> ClientResult<String> {
        self.cli.run(copy_args(from, to), self.endpoint.as_deref())
    }

    fn remove_recursive(&self, uri: &str) -> ClientResult<String> {
        self.cli.run(remove_args(uri), self.endpoint.as_deref())
    }
}
