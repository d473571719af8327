use super::test_util::prepare_db_and_test;
use crate::domain::user::User;
use crate::domain::user::driven_ports::{UserReader, UserWriter};
use crate::persistence::db_user_driven_ports::{DbUserReader, DbUserWriter};
use uuid::Uuid;

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn mirroring_is_idempotent() {
    prepare_db_and_test(|mut ext_cxn| async move {
        let user = User {
            id: Uuid::from_u128(0x1),
            email: "first@example.com".to_owned(),
        };

        let written = DbUserWriter {}
            .mirror_user(&user, &mut ext_cxn)
            .await
            .expect("user should mirror");
        assert!(written);

        let written_again = DbUserWriter {}
            .mirror_user(
                &User {
                    email: "changed@example.com".to_owned(),
                    ..user.clone()
                },
                &mut ext_cxn,
            )
            .await
            .expect("repeat mirror should run");
        assert!(!written_again);

        let users = DbUserReader {}
            .all_users(&mut ext_cxn)
            .await
            .expect("user listing should succeed");
        assert_eq!(vec![user], users);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn every_mirrored_user_is_listed() {
    prepare_db_and_test(|mut ext_cxn| async move {
        for id in 1..=3u128 {
            DbUserWriter {}
                .mirror_user(
                    &User {
                        id: Uuid::from_u128(id),
                        email: format!("user{id}@example.com"),
                    },
                    &mut ext_cxn,
                )
                .await
                .expect("user should mirror");
        }

        let users = DbUserReader {}
            .all_users(&mut ext_cxn)
            .await
            .expect("user listing should succeed");
        assert_eq!(3, users.len());
    });
}
