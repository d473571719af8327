use super::test_util::prepare_db_and_test;
use crate::domain::category::driven_ports::CategoryWriter;
use crate::domain::category::test_util::category_content_default;
use crate::domain::task::driven_ports::{TaskReader, TaskWriter};
use crate::domain::task::test_util::task_content_default;
use crate::domain::task::{Priority, Status, TaskContent};
use crate::persistence::db_category_driven_ports::DbCategoryWriter;
use crate::persistence::db_task_driven_ports::{DbTaskReader, DbTaskWriter};
use speculoos::prelude::*;
use uuid::Uuid;

fn owner() -> Uuid {
    Uuid::from_u128(0xA11CE)
}

fn stranger() -> Uuid {
    Uuid::from_u128(0xB0B)
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn created_task_can_be_read_back() {
    prepare_db_and_test(|mut ext_cxn| async move {
        let content = TaskContent {
            description: Some("with details".to_owned()),
            priority: Priority::High,
            ..task_content_default()
        };

        let created = DbTaskWriter {}
            .create_task(owner(), &content, &mut ext_cxn)
            .await
            .expect("task should insert");
        assert_eq!(owner(), created.owner_id);
        assert_eq!(content.title, created.title);
        assert_eq!(content.description, created.description);
        assert_eq!(content.due_date, created.due_date);
        assert_eq!(Priority::High, created.priority);
        assert_eq!(Status::Pending, created.status);
        assert_eq!(created.created_at, created.updated_at);

        let fetched = DbTaskReader {}
            .owner_task_by_id(owner(), created.id, &mut ext_cxn)
            .await
            .expect("task lookup should succeed");
        assert_eq!(Some(created), fetched);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn tasks_are_invisible_to_other_owners() {
    prepare_db_and_test(|mut ext_cxn| async move {
        let created = DbTaskWriter {}
            .create_task(owner(), &task_content_default(), &mut ext_cxn)
            .await
            .expect("task should insert");

        let fetched = DbTaskReader {}
            .owner_task_by_id(stranger(), created.id, &mut ext_cxn)
            .await
            .expect("task lookup should succeed");
        assert_that!(fetched).is_none();

        let listed = DbTaskReader {}
            .tasks_for_owner(stranger(), &mut ext_cxn)
            .await
            .expect("task listing should succeed");
        assert_that!(listed).is_empty();

        let updated = DbTaskWriter {}
            .update_task_status(stranger(), created.id, Status::Completed, &mut ext_cxn)
            .await
            .expect("status update should run");
        assert_that!(updated).is_none();

        let deleted = DbTaskWriter {}
            .delete_task(stranger(), created.id, &mut ext_cxn)
            .await
            .expect("delete should run");
        assert!(!deleted);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn tasks_list_newest_first() {
    prepare_db_and_test(|mut ext_cxn| async move {
        let mut created_ids = Vec::new();
        for title in ["first", "second", "third"] {
            let task = DbTaskWriter {}
                .create_task(
                    owner(),
                    &TaskContent {
                        title: title.to_owned(),
                        ..task_content_default()
                    },
                    &mut ext_cxn,
                )
                .await
                .expect("task should insert");
            created_ids.push(task.id);
        }

        let listed: Vec<i32> = DbTaskReader {}
            .tasks_for_owner(owner(), &mut ext_cxn)
            .await
            .expect("task listing should succeed")
            .into_iter()
            .map(|task| task.id)
            .collect();
        created_ids.reverse();
        assert_eq!(created_ids, listed);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn updates_replace_content_and_bump_timestamp() {
    prepare_db_and_test(|mut ext_cxn| async move {
        let created = DbTaskWriter {}
            .create_task(owner(), &task_content_default(), &mut ext_cxn)
            .await
            .expect("task should insert");
        let replacement = TaskContent {
            title: "Renamed".to_owned(),
            status: Status::InProgress,
            priority: Priority::Medium,
            ..task_content_default()
        };

        let updated = DbTaskWriter {}
            .update_task(owner(), created.id, &replacement, &mut ext_cxn)
            .await
            .expect("update should run")
            .expect("task should have been found");
        assert_eq!("Renamed", updated.title);
        assert_eq!(Status::InProgress, updated.status);
        assert_eq!(Priority::Medium, updated.priority);
        assert_eq!(created.created_at, updated.created_at);
        assert!(updated.updated_at >= created.updated_at);

        let completed = DbTaskWriter {}
            .update_task_status(owner(), created.id, Status::Completed, &mut ext_cxn)
            .await
            .expect("status update should run")
            .expect("task should have been found");
        assert_eq!(Status::Completed, completed.status);
        assert_eq!("Renamed", completed.title);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn delete_removes_the_task() {
    prepare_db_and_test(|mut ext_cxn| async move {
        let created = DbTaskWriter {}
            .create_task(owner(), &task_content_default(), &mut ext_cxn)
            .await
            .expect("task should insert");

        let deleted = DbTaskWriter {}
            .delete_task(owner(), created.id, &mut ext_cxn)
            .await
            .expect("delete should run");
        assert!(deleted);

        let deleted_again = DbTaskWriter {}
            .delete_task(owner(), created.id, &mut ext_cxn)
            .await
            .expect("delete should run");
        assert!(!deleted_again);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn category_membership_can_be_listed_and_cleared() {
    prepare_db_and_test(|mut ext_cxn| async move {
        let category = DbCategoryWriter {}
            .create_category(owner(), &category_content_default(), &mut ext_cxn)
            .await
            .expect("category should insert");
        let categorized = DbTaskWriter {}
            .create_task(
                owner(),
                &TaskContent {
                    category_id: Some(category.id),
                    ..task_content_default()
                },
                &mut ext_cxn,
            )
            .await
            .expect("task should insert");
        DbTaskWriter {}
            .create_task(owner(), &task_content_default(), &mut ext_cxn)
            .await
            .expect("task should insert");

        let in_category = DbTaskReader {}
            .tasks_in_category(owner(), category.id, &mut ext_cxn)
            .await
            .expect("category listing should succeed");
        assert_that!(in_category).has_length(1);
        assert_eq!(categorized.id, in_category[0].id);

        let cleared = DbTaskWriter {}
            .clear_category(owner(), category.id, &mut ext_cxn)
            .await
            .expect("clearing should run");
        assert_eq!(1, cleared);

        let refetched = DbTaskReader {}
            .owner_task_by_id(owner(), categorized.id, &mut ext_cxn)
            .await
            .expect("task lookup should succeed")
            .expect("task should still exist");
        assert_that!(refetched.category_id).is_none();
    });
}
