use super::test_util::prepare_db_and_test;
use crate::domain::analytics::driving_ports::AnalyticsPort;
use crate::domain::analytics::{AnalyticsService, CategoryCount, PriorityCount, StatusCount};
use crate::domain::category::driven_ports::CategoryWriter;
use crate::domain::category::test_util::category_content_default;
use crate::domain::clock::SystemClock;
use crate::domain::digest::DigestService;
use crate::domain::digest::driving_ports::DigestPort;
use crate::domain::digest::test_util::RecordingDigestSink;
use crate::domain::task::driven_ports::TaskWriter;
use crate::domain::task::test_util::task_content_default;
use crate::domain::task::{Priority, Status, TaskContent};
use crate::domain::user::User;
use crate::domain::user::driven_ports::UserWriter;
use crate::persistence::ExternalConnectivity;
use crate::persistence::db_analytics_driven_ports::{DbDigestReader, DbTaskStatsReader};
use crate::persistence::db_category_driven_ports::DbCategoryWriter;
use crate::persistence::db_task_driven_ports::DbTaskWriter;
use crate::persistence::db_user_driven_ports::{DbUserReader, DbUserWriter};
use chrono::{DateTime, TimeZone, Utc};
use speculoos::prelude::*;
use uuid::Uuid;

fn owner() -> Uuid {
    Uuid::from_u128(0x57A7)
}

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 3, day, hour, 0, 0)
        .single()
        .expect("test instant should be valid")
}

async fn insert(ext_cxn: &mut ExternalConnectivity, title: &str, content: TaskContent) -> i32 {
    DbTaskWriter {}
        .create_task(
            owner(),
            &TaskContent {
                title: title.to_owned(),
                ..content
            },
            ext_cxn,
        )
        .await
        .expect("task should insert")
        .id
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn stats_group_by_status_priority_and_category() {
    prepare_db_and_test(|mut ext_cxn| async move {
        let category = DbCategoryWriter {}
            .create_category(owner(), &category_content_default(), &mut ext_cxn)
            .await
            .expect("category should insert");
        insert(
            &mut ext_cxn,
            "a",
            TaskContent {
                priority: Priority::High,
                category_id: Some(category.id),
                ..task_content_default()
            },
        )
        .await;
        insert(
            &mut ext_cxn,
            "b",
            TaskContent {
                priority: Priority::High,
                status: Status::Completed,
                ..task_content_default()
            },
        )
        .await;
        insert(&mut ext_cxn, "c", task_content_default()).await;
        DbTaskWriter {}
            .create_task(Uuid::from_u128(0xD06), &task_content_default(), &mut ext_cxn)
            .await
            .expect("task should insert");

        let stats = AnalyticsService { clock: SystemClock }
            .task_stats(owner(), &mut ext_cxn, &DbTaskStatsReader {})
            .await
            .expect("stats should compute");
        assert_eq!(3, stats.total_tasks);
        assert_eq!(
            vec![
                StatusCount {
                    status: Status::Pending,
                    count: 2
                },
                StatusCount {
                    status: Status::Completed,
                    count: 1
                },
            ],
            stats.status_stats
        );
        assert_eq!(
            vec![
                PriorityCount {
                    priority: Priority::Low,
                    count: 1
                },
                PriorityCount {
                    priority: Priority::High,
                    count: 2
                },
            ],
            stats.priority_stats
        );
        assert_eq!(
            vec![
                CategoryCount {
                    category_id: Some(category.id),
                    count: 1
                },
                CategoryCount {
                    category_id: None,
                    count: 2
                },
            ],
            stats.category_stats
        );
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn trends_include_recent_creations_and_completions() {
    prepare_db_and_test(|mut ext_cxn| async move {
        insert(&mut ext_cxn, "open", task_content_default()).await;
        let done = insert(&mut ext_cxn, "done", task_content_default()).await;
        DbTaskWriter {}
            .update_task_status(owner(), done, Status::Completed, &mut ext_cxn)
            .await
            .expect("status update should run");

        let trends = AnalyticsService { clock: SystemClock }
            .task_trends(owner(), &mut ext_cxn, &DbTaskStatsReader {})
            .await
            .expect("trends should compute");
        assert_that!(trends.creation_trends).has_length(2);
        assert_that!(trends.completion_trends).has_length(1);
        assert!(trends.creation_trends[0] <= trends.creation_trends[1]);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn digest_collects_overdue_and_due_today_tasks() {
    prepare_db_and_test(|mut ext_cxn| async move {
        DbUserWriter {}
            .mirror_user(
                &User {
                    id: owner(),
                    email: "owner@example.com".to_owned(),
                },
                &mut ext_cxn,
            )
            .await
            .expect("user should mirror");

        let overdue = insert(
            &mut ext_cxn,
            "overdue",
            TaskContent {
                due_date: at(8, 10),
                ..task_content_default()
            },
        )
        .await;
        let due_this_morning = insert(
            &mut ext_cxn,
            "this morning",
            TaskContent {
                due_date: at(10, 9),
                status: Status::InProgress,
                ..task_content_default()
            },
        )
        .await;
        let due_tonight = insert(
            &mut ext_cxn,
            "tonight",
            TaskContent {
                due_date: at(10, 20),
                ..task_content_default()
            },
        )
        .await;
        insert(
            &mut ext_cxn,
            "finished late",
            TaskContent {
                due_date: at(1, 10),
                status: Status::Completed,
                ..task_content_default()
            },
        )
        .await;
        insert(
            &mut ext_cxn,
            "next week",
            TaskContent {
                due_date: at(17, 10),
                ..task_content_default()
            },
        )
        .await;

        let sink = RecordingDigestSink::new();
        let summary = DigestService {}
            .run_digest(
                &at(10, 12),
                &mut ext_cxn,
                &DbUserReader {},
                &DbDigestReader {},
                &DbTaskStatsReader {},
                &sink,
            )
            .await
            .expect("digest run should finish");
        assert_eq!(1, summary.delivered);
        assert_that!(summary.failed_users).is_empty();

        let delivered = sink.delivered();
        assert_that!(delivered).has_length(1);
        let digest = &delivered[0];
        assert_eq!("owner@example.com", digest.email);

        let overdue_ids: Vec<i32> = digest.overdue_tasks.iter().map(|task| task.id).collect();
        assert_eq!(vec![overdue, due_this_morning], overdue_ids);
        let due_today_ids: Vec<i32> = digest.due_today.iter().map(|task| task.id).collect();
        assert_eq!(vec![due_this_morning, due_tonight], due_today_ids);

        assert_eq!(5, digest.total_tasks);
        assert_eq!(1, digest.completed_tasks);
        assert_eq!(20.0, digest.completion_rate);
    });
}
