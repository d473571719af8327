use sqlx::PgConnection;

/// A handle on a live database connection. Driven adapters borrow the connection for the
/// duration of a single query.
pub trait ConnectionHandle {
    fn borrow_connection(&mut self) -> &mut PgConnection;
}

/// Hands out clients for the external systems this service talks to: the relational
/// database and the HTTP client used for the hosted auth provider. Domain logic only ever
/// sees this trait so tests can swap in a fake.
pub trait ExternalConnectivity {
    type DbHandle<'cxn_borrow>: ConnectionHandle + Send
    where
        Self: 'cxn_borrow;

    async fn database_cxn(&mut self) -> Result<Self::DbHandle<'_>, anyhow::Error>;

    fn http_client(&self) -> &reqwest_middleware::ClientWithMiddleware;
}

/// Connectivity which can open a database transaction. Every database call made through
/// the returned handle participates in that transaction until it is committed; dropping the
/// handle without committing rolls the work back.
pub trait Transactable: ExternalConnectivity {
    type Handle: TransactionHandle;

    async fn start_transaction(&self) -> Result<Self::Handle, anyhow::Error>;
}

pub trait TransactionHandle: ExternalConnectivity {
    async fn commit(self) -> Result<(), anyhow::Error>;
}
