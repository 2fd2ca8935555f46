//! Log store over `aws logs`.

use batchrun_protocol::GetLogEventsResponse;

use super::{AwsCli, ClientResult, LogEventsRequest, LogStore};

/// `LogStore` backed by `aws logs get-log-events`
#[derive(Debug, Clone)]
pub struct AwsLogs {
    cli: AwsCli,
    endpoint: Option<String>,
}

impl AwsLogs {
    pub fn new(cli: AwsCli, endpoint: Option<String>) -> Self {
        Self { cli, endpoint }
    }
}

pub(crate) fn get_log_events_args(request: &LogEventsRequest) -> Vec<String> {
    let mut args = vec![
        "logs".to_string(),
        "get-log-events".to_string(),
        "--log-group-name".to_string(),
        request.log_group.clone(),
        "--log-stream-name".to_string(),
        request.log_stream.clone(),
        "--start-time".to_string(),
        request.start_time.to_string(),
    ];
    if request.start_from_head {
        args.push("--start-from-head".to_string());
    }
    if let Some(ref token) = request.next_token {
        args.push("--next-token".to_string());
        args.push(token.clone());
    }
    args
}

impl LogStore for AwsLogs {
    fn get_log_events(&self, request: &LogEventsRequest) -> ClientResult<GetLogEventsResponse> {
        self.cli
            .run_json(get_log_events_args(request), self.endpoint.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(next_token: Option<&str>) -> LogEventsRequest {
        LogEventsRequest {
            log_group: "/aws/batch/job".to_string(),
            log_stream: "train/default/abc".to_string(),
            start_time: 1_500_000_000_001,
            next_token: next_token.map(str::to_string),
            start_from_head: true,
        }
    }

    #[test]
    fn test_first_page_args() {
        let args = get_log_events_args(&request(None));
        assert_eq!(args, vec![
            "logs", "get-log-events",
            "--log-group-name", "/aws/batch/job",
            "--log-stream-name", "train/default/abc",
            "--start-time", "1500000000001",
            "--start-from-head",
        ]);
    }

    #[test]
    fn test_follow_up_page_passes_token() {
        let args = get_log_events_args(&request(Some("f/42")));
        assert_eq!(&args[args.len() - 2..], &["--next-token", "f/42"]);
    }
}
