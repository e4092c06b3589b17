//! End-to-end tests for PipelineService

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use sigtree::application::services::{PipelineRequest, Progress};
use sigtree::application::{ApplicationError, Stage};
use sigtree::config::{Settings, ValidatorConfig};
use sigtree::domain::DomainError;
use sigtree::infrastructure::di::ServiceContainer;
use sigtree::infrastructure::traits::{RealCommandRunner, RealFileSystem};
use sigtree::util::path::derive_result_path;
use sigtree::util::testing::init_test_setup;

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write file");
    path
}

fn container(program: &Path) -> ServiceContainer {
    init_test_setup();
    let settings = Settings {
        validator: ValidatorConfig {
            program: program.to_path_buf(),
            timeout_secs: 30,
        },
        ..Settings::default()
    };
    ServiceContainer::with_deps(
        settings,
        Arc::new(RealFileSystem),
        Arc::new(RealCommandRunner::default()),
    )
}

fn request(dir: &Path, partitions: Vec<PathBuf>) -> PipelineRequest {
    let agg_file = dir.join("agg.txt");
    PipelineRequest {
        partitions,
        result_file: derive_result_path(&agg_file, "_output"),
        agg_file,
        tree_file: dir.join("final.tree"),
        run_validator: false,
        aggregate_only: false,
    }
}

#[test]
fn given_existing_result_when_skipping_validator_then_writes_aggregate_and_tree() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let dir = temp.path();
    let core = write_file(dir, "core.tree", "# v1\n1:2:3 0.5 NodeA 7\n1:1 0.5 NodeB 2\n");
    let aux = write_file(dir, "aux.tree", "4:5 0.3 NodeA 7\n4:1 0.7 NodeB 2\n");
    write_file(dir, "agg_output.txt", "0:1; 7\n0:2 2\n");
    let request = request(dir, vec![core, aux]);

    let mut events = Vec::new();

    // Act
    let report = container(Path::new("unused"))
        .pipeline()
        .run(&request, |p| events.push(format!("{p:?}")))
        .unwrap();

    // Assert
    assert_eq!(std::fs::read_to_string(dir.join("agg.txt")).unwrap(), "2 1 4\n7 1:2 4\n");
    assert_eq!(
        std::fs::read_to_string(dir.join("final.tree")).unwrap(),
        "# v1\n0:1;3; 0.5 NodeA 7\n0:2:1 0.5 NodeB 2\n"
    );
    assert_eq!(report.nodes, 2);
    assert_eq!(report.partitions, 2);
    assert_eq!(report.insignificant, 1);
    assert_eq!(report.tree_file, Some(dir.join("final.tree")));
    assert!(!events.iter().any(|e| e.starts_with("InvokingValidator")));
}

#[test]
fn given_aggregate_only_when_running_then_stops_before_validator() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let dir = temp.path();
    let core = write_file(dir, "core.tree", "1:2:3 0.5 NodeA 7\n");
    let mut request = request(dir, vec![core]);
    request.run_validator = true;
    request.aggregate_only = true;

    // Act
    let report = container(&dir.join("no-such-validator"))
        .pipeline()
        .run(&request, |_| {})
        .unwrap();

    // Assert
    assert_eq!(report.tree_file, None);
    assert!(dir.join("agg.txt").exists());
    assert!(!dir.join("final.tree").exists());
}

#[test]
fn given_inconsistent_auxiliary_when_running_then_fails_before_writing() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let dir = temp.path();
    let core = write_file(dir, "core.tree", "1:2:3 0.5 NodeA 7\n1:1 0.5 NodeB 2\n");
    let aux = write_file(dir, "aux.tree", "4:1 0.7 NodeB 2\n");
    let request = request(dir, vec![core, aux]);

    // Act
    let err = container(Path::new("unused"))
        .pipeline()
        .run(&request, |_| {})
        .unwrap_err();

    // Assert
    assert_eq!(err.stage(), Some(Stage::Aggregating));
    assert!(matches!(
        err.root(),
        ApplicationError::Domain(DomainError::MissingNode { node_id: 7, .. })
    ));
    assert!(!dir.join("agg.txt").exists());
}

#[cfg(unix)]
#[test]
fn given_validator_script_when_running_then_full_pipeline_succeeds() {
    use std::os::unix::fs::PermissionsExt;

    // Arrange
    let temp = TempDir::new().unwrap();
    let dir = temp.path();
    let core = write_file(dir, "core.tree", "# v1\n# two nodes\n1:2:3 0.5 NodeA 7\n1:1 0.5 NodeB 2\n");
    let aux = write_file(dir, "aux.tree", "4:5 0.3 NodeA 7\n4:1 0.7 NodeB 2\n");
    // Marks every first-level module insignificant, in aggregate order.
    let validator = write_file(
        dir,
        "validator.sh",
        "#!/bin/sh\nwhile read id rest; do echo \"0:1; $id\"; done < \"$1\" > \"$2\"\n",
    );
    let mut perms = std::fs::metadata(&validator).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&validator, perms).unwrap();

    let mut request = request(dir, vec![core, aux]);
    request.run_validator = true;
    let mut invoked = false;

    // Act
    let report = container(&validator)
        .pipeline()
        .run(&request, |p| {
            if let Progress::InvokingValidator { result_file, .. } = p {
                assert_eq!(result_file, dir.join("agg_output.txt"));
                invoked = true;
            }
        })
        .unwrap();

    // Assert
    assert!(invoked);
    assert_eq!(report.insignificant, 2);
    assert_eq!(
        std::fs::read_to_string(dir.join("final.tree")).unwrap(),
        "# v1\n# two nodes\n0:1;1; 0.5 NodeB 2\n0:1;3; 0.5 NodeA 7\n"
    );
}

#[cfg(unix)]
#[test]
fn given_failing_validator_when_running_then_invoking_stage_error_and_no_tree() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let dir = temp.path();
    let core = write_file(dir, "core.tree", "1:2:3 0.5 NodeA 7\n");
    let validator = write_file(dir, "validator.sh", "#!/bin/sh\nexit 2\n");
    let mut perms = std::fs::metadata(&validator).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&validator, perms).unwrap();
    let mut request = request(dir, vec![core]);
    request.run_validator = true;

    let err = container(&validator)
        .pipeline()
        .run(&request, |_| {})
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Invoking));
    assert!(err.to_string().starts_with("invoking: validator failed"));
    assert!(!dir.join("final.tree").exists());
}
