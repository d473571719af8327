use crate::app_env::test::TEST_DB_URL;
use crate::db;
use crate::persistence::ExternalConnectivity;
use dotenv::dotenv;
use lazy_static::lazy_static;
use rand::{Rng, thread_rng};
use sqlx::{Connection, PgConnection};
use std::env;
use std::future::Future;
use std::panic;
use tokio::runtime::Runtime;

lazy_static! {
    static ref TOKIO_RT: Runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Tokio runtime failed to initialize");
}

struct TestDatabase {
    base_url: String,
    db_name: String,
}

impl TestDatabase {
    async fn create(base_url: &str) -> Result<Self, sqlx::Error> {
        let db_id: u32 = thread_rng().gen_range(10_000..99_999);
        let db_name = format!("test_db_{db_id}");

        let mut conn = PgConnection::connect(base_url).await?;
        let result = sqlx::query(format!("CREATE DATABASE {db_name}").as_str())
            .execute(&mut conn)
            .await;
        let _ = conn.close().await;
        result?;

        Ok(Self {
            base_url: base_url.to_owned(),
            db_name,
        })
    }

    fn url(&self) -> String {
        format!("{}/{}", self.base_url, self.db_name)
    }

    async fn drop_database(self) {
        let conn = PgConnection::connect(&self.base_url).await;
        let mut conn = match conn {
            Ok(cxn) => cxn,
            Err(error) => {
                println!(
                    "Could not reconnect to drop test database {}, please remove it manually. Error: {error}",
                    self.db_name
                );
                return;
            }
        };

        let result = sqlx::query(format!("DROP DATABASE {} WITH (FORCE)", self.db_name).as_str())
            .execute(&mut conn)
            .await;
        if let Err(error) = result {
            println!(
                "Failed to drop test database {}, please remove it manually. Error: {error}",
                self.db_name
            );
        }
        let _ = conn.close().await;
    }
}

/// Creates a fresh, fully migrated database for a single test and drops it once the test
/// finishes, whether or not it passed.
///
/// Expects the TEST_DB_URL environment variable to hold a Postgres connection string with no
/// database name in the path
pub fn prepare_db_and_test<F, R>(test_fn: F)
where
    R: Future<Output = ()> + Send + 'static,
    F: FnOnce(ExternalConnectivity) -> R,
{
    if dotenv().is_err() {
        println!("Test is running without .env file.");
    }

    TOKIO_RT.block_on(async move {
        let base_url = env::var(TEST_DB_URL).unwrap_or_else(|_| {
            panic!("You must provide the {TEST_DB_URL} environment variable as the base postgres connection string")
        });
        let test_db = match TestDatabase::create(&base_url).await {
            Ok(tdb) => tdb,
            Err(db_err) => panic!("Failed to create test database: {db_err}"),
        };

        let pool = db::connect_sqlx(&test_db.url(), 5)
            .await
            .expect("Could not connect to the test database");
        db::run_migrations(&pool)
            .await
            .expect("Could not migrate the test database");
        let ext_cxn =
            ExternalConnectivity::new(pool.clone()).expect("Could not build connectivity");

        let outcome = tokio::spawn(test_fn(ext_cxn)).await;
        pool.close().await;
        test_db.drop_database().await;

        if let Err(join_err) = outcome {
            if join_err.is_panic() {
                panic::resume_unwind(join_err.into_panic());
            }
            panic!("Test task did not finish: {join_err}");
        }
    });
}
