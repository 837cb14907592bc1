//! Services wired from a configuration file

use std::fs;
use std::sync::Arc;

use taskflow_application::{CreateMilestoneCommand, TaskflowServices};
use taskflow_config::ConfigManager;
use taskflow_domain::{ActivityAction, Actor, ActorId, ErrorKind, Role, TaskRef};
use taskflow_persistence::{InMemoryApprovalTaskRepository, InMemoryMilestoneRepository};
use tempfile::TempDir;

fn milestone_command(title: &str) -> CreateMilestoneCommand {
    CreateMilestoneCommand {
        title: title.to_string(),
        description: String::new(),
        assigned_to: "assignee".to_string(),
        due_date: None,
    }
}

#[tokio::test]
async fn test_config_file_drives_attribution_and_throttling() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
achievement_attribution = "system"
system_actor_id = "release-bot"

[rate_limit]
capacity = 2
refill_per_minute = 1
"#,
    )
    .unwrap();

    let config = ConfigManager::with_path(path)
        .with_env_prefix("TASKFLOW_ITEST_WIRING")
        .load_validated()
        .unwrap();
    let services = TaskflowServices::from_config(
        &config,
        Arc::new(InMemoryApprovalTaskRepository::new()),
        Arc::new(InMemoryMilestoneRepository::new()),
    );
    let pm = Actor::new("pm", Role::Manager);

    let m = services
        .milestones
        .create_milestone(milestone_command("One"), &pm)
        .await
        .unwrap();
    let m = services
        .milestones
        .link(&m.id(), TaskRef::new("t", "T").with_completion(100), &pm)
        .await
        .unwrap();
    let achieved = m.activity().entries_by_action(ActivityAction::Achieved);
    assert_eq!(achieved[0].actor, ActorId::new("release-bot"));

    services
        .milestones
        .create_milestone(milestone_command("Two"), &pm)
        .await
        .unwrap();
    let err = services
        .milestones
        .create_milestone(milestone_command("Three"), &pm)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RateLimited);

    // Linking is not throttled
    services
        .milestones
        .link(&m.id(), TaskRef::new("t2", "T2"), &pm)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_default_config_attributes_to_assignee() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let config = ConfigManager::with_path(dir.path().join("missing.toml"))
        .with_env_prefix("TASKFLOW_ITEST_DEFAULTS")
        .load_validated()
        .unwrap();
    let services = TaskflowServices::from_config(
        &config,
        Arc::new(InMemoryApprovalTaskRepository::new()),
        Arc::new(InMemoryMilestoneRepository::new()),
    );
    let pm = Actor::new("pm", Role::Manager);

    let m = services
        .milestones
        .create_milestone(milestone_command("Solo"), &pm)
        .await
        .unwrap();
    let m = services
        .milestones
        .link(&m.id(), TaskRef::new("t", "T").with_completion(100), &pm)
        .await
        .unwrap();
    assert_eq!(m.activity().latest().unwrap().actor, ActorId::new("assignee"));
}
