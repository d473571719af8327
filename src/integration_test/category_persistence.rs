use super::test_util::prepare_db_and_test;
use crate::domain::category::driven_ports::{CategoryReader, CategoryWriter};
use crate::domain::category::driving_ports::{CategoryError, CategoryPort};
use crate::domain::category::test_util::category_content_default;
use crate::domain::category::{CategoryContent, CategoryService};
use crate::domain::task::TaskContent;
use crate::domain::task::driven_ports::{TaskReader, TaskWriter};
use crate::domain::task::test_util::task_content_default;
use crate::persistence::db_category_driven_ports::{DbCategoryReader, DbCategoryWriter};
use crate::persistence::db_task_driven_ports::{DbTaskReader, DbTaskWriter};
use speculoos::prelude::*;
use uuid::Uuid;

fn owner() -> Uuid {
    Uuid::from_u128(0xCA7)
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn categories_round_trip_and_list_newest_first() {
    prepare_db_and_test(|mut ext_cxn| async move {
        let older = DbCategoryWriter {}
            .create_category(owner(), &category_content_default(), &mut ext_cxn)
            .await
            .expect("category should insert");
        let newer = DbCategoryWriter {}
            .create_category(
                owner(),
                &CategoryContent {
                    name: "Errands".to_owned(),
                    description: Some("Out of the house".to_owned()),
                    color: Some("#00FF00".to_owned()),
                },
                &mut ext_cxn,
            )
            .await
            .expect("category should insert");
        assert_eq!(Some("#00FF00".to_owned()), newer.color);

        let listed: Vec<i32> = DbCategoryReader {}
            .categories_for_owner(owner(), &mut ext_cxn)
            .await
            .expect("category listing should succeed")
            .into_iter()
            .map(|category| category.id)
            .collect();
        assert_eq!(vec![newer.id, older.id], listed);

        let other_owner = DbCategoryReader {}
            .owner_category_by_id(Uuid::from_u128(0xD06), older.id, &mut ext_cxn)
            .await
            .expect("category lookup should succeed");
        assert_that!(other_owner).is_none();
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn update_replaces_every_field() {
    prepare_db_and_test(|mut ext_cxn| async move {
        let created = DbCategoryWriter {}
            .create_category(
                owner(),
                &CategoryContent {
                    description: Some("to be cleared".to_owned()),
                    ..category_content_default()
                },
                &mut ext_cxn,
            )
            .await
            .expect("category should insert");

        let updated = DbCategoryWriter {}
            .update_category(
                owner(),
                created.id,
                &CategoryContent {
                    name: "Housework".to_owned(),
                    description: None,
                    color: Some("#123456".to_owned()),
                },
                &mut ext_cxn,
            )
            .await
            .expect("update should run")
            .expect("category should have been found");
        assert_eq!("Housework", updated.name);
        assert_that!(updated.description).is_none();
        assert_eq!(Some("#123456".to_owned()), updated.color);
        assert_eq!(created.created_at, updated.created_at);

        let missing = DbCategoryWriter {}
            .update_category(owner(), created.id + 100, &category_content_default(), &mut ext_cxn)
            .await
            .expect("update should run");
        assert_that!(missing).is_none();
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn deleting_a_category_keeps_its_tasks() {
    prepare_db_and_test(|mut ext_cxn| async move {
        let category = DbCategoryWriter {}
            .create_category(owner(), &category_content_default(), &mut ext_cxn)
            .await
            .expect("category should insert");
        let task = DbTaskWriter {}
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

        CategoryService {}
            .delete_category(
                owner(),
                category.id,
                &mut ext_cxn,
                &DbCategoryReader {},
                &DbCategoryWriter {},
                &DbTaskWriter {},
            )
            .await
            .expect("category delete should succeed");

        let gone = DbCategoryReader {}
            .owner_category_by_id(owner(), category.id, &mut ext_cxn)
            .await
            .expect("category lookup should succeed");
        assert_that!(gone).is_none();

        let kept = DbTaskReader {}
            .owner_task_by_id(owner(), task.id, &mut ext_cxn)
            .await
            .expect("task lookup should succeed")
            .expect("task should survive its category");
        assert_that!(kept.category_id).is_none();
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn deleting_a_missing_category_changes_nothing() {
    prepare_db_and_test(|mut ext_cxn| async move {
        let category = DbCategoryWriter {}
            .create_category(owner(), &category_content_default(), &mut ext_cxn)
            .await
            .expect("category should insert");
        let task = DbTaskWriter {}
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

        let result = CategoryService {}
            .delete_category(
                Uuid::from_u128(0xD06),
                category.id,
                &mut ext_cxn,
                &DbCategoryReader {},
                &DbCategoryWriter {},
                &DbTaskWriter {},
            )
            .await;
        let Err(CategoryError::NotFound) = result else {
            panic!("Expected NotFound, got {result:?}");
        };

        let untouched = DbTaskReader {}
            .owner_task_by_id(owner(), task.id, &mut ext_cxn)
            .await
            .expect("task lookup should succeed")
            .expect("task should still exist");
        assert_eq!(Some(category.id), untouched.category_id);
    });
}
