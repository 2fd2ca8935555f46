//! Container command composition
//!
//! Builds the single `/bin/bash -c` string the job container runs:
//!
//! 1. `mkdir -p` the working directory and every artifact parent directory
//! 2. copy each input from the staging prefix, then `chmod 755` it
//! 3. `cd` into the working directory
//! 4. the user command
//! 5. copy each output back to the staging prefix
//!
//! Segments are joined with `; ` so an output copy still runs after a failing
//! user command. Composition does no I/O; paths were validated when the
//! `StagingSpec` was built.

use crate::staging::{remote_uri, shell_quote, StagingSpec};

/// Permission mode applied to every staged input inside the container.
pub const INPUT_MODE: &str = "755";

/// Compose the container command.
///
/// `cli` is the path of the copy tool inside the container image.
pub fn compose(cli: &str, staging: &StagingSpec, command: &str) -> String {
    segments(cli, staging, command).join("; ")
}

/// The individual `; `-separated segments, in execution order.
pub fn segments(cli: &str, staging: &StagingSpec, command: &str) -> Vec<String> {
    let workdir = staging.workdir();
    let mut segments = vec![format!("mkdir -p {}", shell_quote(workdir.as_str()))];

    let mut seen: Vec<&str> = Vec::new();
    for artifact in staging.uploads().iter().chain(staging.downloads()) {
        if let Some(parent) = artifact.parent() {
            if !seen.contains(&parent) {
                seen.push(parent);
                segments.push(format!(
                    "mkdir -p {}",
                    shell_quote(&format!("{}/{}", workdir, parent))
                ));
            }
        }
    }

    if let Some(prefix) = staging.remote_prefix() {
        for input in staging.uploads() {
            let container_path = shell_quote(&workdir.join(input));
            segments.push(format!(
                "{} s3 cp {} {}",
                cli,
                shell_quote(&remote_uri(&prefix, input)),
                container_path
            ));
            segments.push(format!("chmod {} {}", INPUT_MODE, container_path));
        }
    }

    segments.push(format!("cd {}", shell_quote(workdir.as_str())));
    segments.push(command.to_string());

    if let Some(prefix) = staging.remote_prefix() {
        for output in staging.downloads() {
            segments.push(format!(
                "{} s3 cp {} {}",
                cli,
                shell_quote(output.as_str()),
                shell_quote(&remote_uri(&prefix, output))
            ));
        }
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLI: &str = "/home/ec2-user/miniconda/bin/aws";

    fn indices(segs: &[String], pred: impl Fn(&str) -> bool) -> Vec<usize> {
        segs.iter()
            .enumerate()
            .filter(|(_, s)| pred(s.as_str()))
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn test_unstaged_command_has_three_segments() {
        let staging = StagingSpec::unstaged("tmp").unwrap();
        assert_eq!(compose(CLI, &staging, "echo hi"), "mkdir -p tmp; cd tmp; echo hi");
    }

    #[test]
    fn test_staged_command() {
        let staging =
            StagingSpec::new(Some("s3://bkt"), "tmp", &["data.csv"], &["out.json"], true).unwrap();
        let expected = [
            "mkdir -p tmp",
            "/home/ec2-user/miniconda/bin/aws s3 cp s3://bkt/tmp/data.csv tmp/data.csv",
            "chmod 755 tmp/data.csv",
            "cd tmp",
            "python train.py",
            "/home/ec2-user/miniconda/bin/aws s3 cp out.json s3://bkt/tmp/out.json",
        ]
        .join("; ");
        assert_eq!(compose(CLI, &staging, "python train.py"), expected);
    }

    #[test]
    fn test_nested_directories_created_once() {
        let staging = StagingSpec::new(
            Some("s3://bkt"),
            "work",
            &["in/a.csv", "in/b.csv"],
            &["out/model.bin", "in/a.csv"],
            true,
        )
        .unwrap();
        let segs = segments("aws", &staging, "run");
        let mkdirs: Vec<_> = segs.iter().filter(|s| s.starts_with("mkdir")).collect();
        assert_eq!(mkdirs, vec!["mkdir -p work", "mkdir -p work/in", "mkdir -p work/out"]);
    }

    #[test]
    fn test_segment_order() {
        let staging = StagingSpec::new(
            Some("s3://bkt"),
            "tmp",
            &["x/1.csv", "2.csv"],
            &["y/3.json", "4.json"],
            true,
        )
        .unwrap();
        let segs = segments("aws", &staging, "USER");

        let mkdirs = indices(&segs, |s| s.starts_with("mkdir"));
        let inputs = indices(&segs, |s| s.starts_with("aws s3 cp s3://"));
        let user = indices(&segs, |s| s == "USER");
        let outputs = indices(&segs, |s| s.starts_with("aws s3 cp") && !s.starts_with("aws s3 cp s3://"));

        assert_eq!(inputs.len(), 2);
        assert_eq!(outputs.len(), 2);
        assert!(mkdirs.iter().max() < inputs.iter().min());
        assert!(inputs.iter().max() < user.iter().min());
        assert!(user.iter().max() < outputs.iter().min());
    }

    #[test]
    fn test_unsafe_names_quoted() {
        let staging =
            StagingSpec::new(Some("s3://bkt"), "tmp", &["my data.csv"], &[], false).unwrap();
        let segs = segments("aws", &staging, "ls");
        assert!(segs.contains(&"aws s3 cp 's3://bkt/tmp/my data.csv' 'tmp/my data.csv'".to_string()));
        assert!(segs.contains(&"chmod 755 'tmp/my data.csv'".to_string()));
    }
}
