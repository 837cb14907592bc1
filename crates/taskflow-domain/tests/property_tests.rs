//! Property-based tests for the approval and milestone engines
//!
//! These tests verify that derived state stays consistent with the child
//! records it is computed from, across arbitrary decision and progress histories.

use chrono::Utc;
use proptest::prelude::*;
use taskflow_domain::*;

// ============================================================================
// Strategies
// ============================================================================

fn decision_status_strategy() -> impl Strategy<Value = DecisionStatus> {
    prop_oneof![
        Just(DecisionStatus::Pending),
        Just(DecisionStatus::Approved),
        Just(DecisionStatus::Rejected),
    ]
}

fn approvers_strategy() -> impl Strategy<Value = Vec<Approver>> {
    prop::collection::vec(decision_status_strategy(), 0..8).prop_map(|statuses| {
        statuses
            .into_iter()
            .enumerate()
            .map(|(i, status)| {
                let mut approver =
                    Approver::new(format!("u{}", i), format!("User {}", i), Role::Member);
                approver.decision_status = status;
                approver
            })
            .collect()
    })
}

fn sequential_task(n: usize, approved_prefix: usize) -> ApprovalTask {
    let approvers = (0..n)
        .map(|i| {
            let mut approver = Approver::new(format!("u{}", i), format!("User {}", i), Role::Lead);
            if i < approved_prefix {
                approver.decision_status = DecisionStatus::Approved;
            }
            approver
        })
        .collect();

    ApprovalTask::reconstitute(
        ApprovalTaskId::new(),
        "Sequential".into(),
        String::new(),
        ApprovalMode::Sequential,
        approvers,
        Priority::Medium,
        None,
        ActorId::new("owner"),
        Utc::now(),
        Utc::now(),
        ActivityFeed::new(),
        1,
    )
}

fn fresh_milestone() -> Milestone {
    Milestone::create(
        "Property milestone".into(),
        String::new(),
        ActorId::new("pm"),
        ActorId::new("dev"),
        None,
        Utc::now(),
    )
    .unwrap()
}

// ============================================================================
// Approval properties
// ============================================================================

proptest! {
    /// mode=all: approved exactly when every approver approved
    #[test]
    fn prop_all_mode_requires_every_approval(approvers in approvers_strategy()) {
        let status = ApprovalEngine::derive_status(&approvers, ApprovalMode::All);
        let every = !approvers.is_empty() && approvers.iter().all(Approver::is_approved);
        prop_assert_eq!(status == OverallStatus::Approved, every);
    }

    /// mode=any: approved exactly when someone approved, whatever the rejections
    #[test]
    fn prop_any_mode_needs_one_approval(approvers in approvers_strategy()) {
        let status = ApprovalEngine::derive_status(&approvers, ApprovalMode::Any);
        let some = approvers.iter().any(Approver::is_approved);
        prop_assert_eq!(status == OverallStatus::Approved, some);
    }

    /// Any rejection rejects all and sequential tasks
    #[test]
    fn prop_rejection_is_final_for_all_and_sequential(approvers in approvers_strategy()) {
        if approvers.iter().any(Approver::is_rejected) {
            prop_assert_eq!(
                ApprovalEngine::derive_status(&approvers, ApprovalMode::All),
                OverallStatus::Rejected
            );
            prop_assert_eq!(
                ApprovalEngine::derive_status(&approvers, ApprovalMode::Sequential),
                OverallStatus::Rejected
            );
        }
    }

    /// mode=sequential: approver i may act exactly when all before it approved
    #[test]
    fn prop_sequential_turn_order((n, k) in (1usize..8).prop_flat_map(|n| (Just(n), 0..n))) {
        let task = sequential_task(n, k);
        for i in 0..n {
            let id = ActorId::new(format!("u{}", i));
            prop_assert_eq!(ApprovalEngine::can_act(&task, &id), i == k);
        }

        for i in (k + 1)..n {
            let mut attempt = task.clone();
            let err = ApprovalEngine::record_decision(
                &mut attempt,
                &ActorId::new(format!("u{}", i)),
                Decision::Approved,
                None,
                Utc::now(),
            )
            .unwrap_err();
            prop_assert_eq!(err.kind(), ErrorKind::Permission);
            prop_assert_eq!(&attempt, &task);
        }
    }

    /// The stored overall status always matches a fresh derivation
    #[test]
    fn prop_overall_status_tracks_decisions(
        mode in prop_oneof![
            Just(ApprovalMode::Any),
            Just(ApprovalMode::All),
            Just(ApprovalMode::Sequential),
        ],
        decisions in prop::collection::vec((0usize..5, any::<bool>()), 0..10),
    ) {
        let approvers = (0..5)
            .map(|i| Approver::new(format!("u{}", i), format!("User {}", i), Role::Member))
            .collect();
        let mut task = ApprovalTask::create(
            "Derived".into(),
            String::new(),
            mode,
            approvers,
            Priority::Low,
            None,
            ActorId::new("owner"),
            Utc::now(),
        )
        .unwrap();

        for (idx, approve) in decisions {
            let decision = if approve { Decision::Approved } else { Decision::Rejected };
            let _ = ApprovalEngine::record_decision(
                &mut task,
                &ActorId::new(format!("u{}", idx)),
                decision,
                None,
                Utc::now(),
            );
            prop_assert_eq!(
                task.overall_status(),
                ApprovalEngine::derive_status(task.approvers(), task.mode())
            );
        }
    }
}

// ============================================================================
// Milestone properties
// ============================================================================

proptest! {
    /// Progress is the rounded mean, stays in range and recomputes to the same value
    #[test]
    fn prop_progress_is_rounded_mean(pcts in prop::collection::vec(0i32..=100, 0..12)) {
        let engine = MilestoneEngine::default();
        let mut milestone = fresh_milestone();
        for (i, pct) in pcts.iter().enumerate() {
            engine
                .link_task(
                    &mut milestone,
                    TaskRef::new(format!("t{}", i), format!("Task {}", i)).with_completion(*pct),
                    &ActorId::new("pm"),
                    Utc::now(),
                )
                .unwrap();
        }

        let expected = if pcts.is_empty() {
            0
        } else {
            let mean = pcts.iter().map(|p| f64::from(*p)).sum::<f64>() / pcts.len() as f64;
            (mean + 0.5).floor() as u8
        };

        prop_assert!(milestone.progress_percentage() <= 100);
        prop_assert_eq!(milestone.progress_percentage(), expected);
        prop_assert_eq!(
            MilestoneEngine::recompute_progress(milestone.linked_tasks()),
            MilestoneEngine::recompute_progress(milestone.linked_tasks())
        );

        let before = milestone.clone();
        prop_assert!(!MilestoneEngine::apply_progress(&mut milestone));
        prop_assert_eq!(milestone, before);
    }

    /// The automatic "achieved" entry is appended at most once
    #[test]
    fn prop_auto_achievement_fires_once(
        updates in prop::collection::vec((0usize..3, 0i32..=100), 1..20),
    ) {
        let engine = MilestoneEngine::default();
        let actor = ActorId::new("pm");
        let mut milestone = fresh_milestone();
        for i in 0..3 {
            engine
                .link_task(&mut milestone, TaskRef::new(format!("t{}", i), "T"), &actor, Utc::now())
                .unwrap();
        }

        let mut reached_full = false;
        for (idx, pct) in updates {
            engine
                .update_linked_task_progress(
                    &mut milestone,
                    &LinkedTaskId::new(format!("t{}", idx)),
                    pct,
                    LinkedTaskStatus::InProgress,
                    &actor,
                    Utc::now(),
                )
                .unwrap();
            reached_full |= milestone.progress_percentage() == 100;
            engine.evaluate_auto_achievement(&mut milestone, Utc::now());
        }

        let achieved = milestone.activity().count_of(ActivityAction::Achieved);
        prop_assert_eq!(achieved, usize::from(reached_full));
        prop_assert_eq!(milestone.status() == MilestoneStatus::Achieved, reached_full);
        prop_assert_eq!(milestone.achieved_at().is_some(), reached_full);
    }

    /// Unlink then relink keeps the completion supplied at relink time
    #[test]
    fn prop_relink_uses_new_completion(first in 0i32..=99, second in 0i32..=99) {
        let engine = MilestoneEngine::default();
        let actor = ActorId::new("pm");
        let id = LinkedTaskId::new("t");
        let mut milestone = fresh_milestone();

        engine
            .link_task(
                &mut milestone,
                TaskRef::new("t", "T").with_completion(first),
                &actor,
                Utc::now(),
            )
            .unwrap();
        engine.unlink_task(&mut milestone, &id, &actor, Utc::now()).unwrap();
        prop_assert_eq!(milestone.progress_percentage(), 0);

        engine
            .link_task(
                &mut milestone,
                TaskRef::new("t", "T").with_completion(second),
                &actor,
                Utc::now(),
            )
            .unwrap();
        prop_assert_eq!(milestone.linked_task(&id).unwrap().completion_percentage as i32, second);
        prop_assert_eq!(i32::from(milestone.progress_percentage()), second);
    }
}
