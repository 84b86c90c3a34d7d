//! Shared fixtures for database-backed tests.
//!
//! Tests are skipped unless `DATABASE_URL` is set. Each test gets its own
//! schema, so tests can run in parallel against one database.

#![allow(dead_code)]

use tokio_postgres::{Client, NoTls};

const SCHEMA_DDL: &str = r#"
CREATE TABLE companies (
    handle VARCHAR(25) PRIMARY KEY CHECK (handle = lower(handle)),
    name TEXT UNIQUE NOT NULL,
    num_employees INTEGER CHECK (num_employees >= 0),
    description TEXT NOT NULL,
    logo_url TEXT
);

CREATE TABLE jobs (
    id SERIAL PRIMARY KEY,
    title TEXT NOT NULL,
    salary INTEGER CHECK (salary >= 0),
    equity NUMERIC CHECK (equity <= 1.0),
    company_handle VARCHAR(25) NOT NULL
        REFERENCES companies ON DELETE CASCADE
);
"#;

const SEED: &str = r#"
INSERT INTO companies (handle, name, num_employees, description, logo_url) VALUES
    ('c1', 'C1', 1, 'Desc1', 'http://c1.img'),
    ('c2', 'C2', 2, 'Desc2', 'http://c2.img'),
    ('c3', 'C3', 3, 'Desc3', 'http://c3.img');

INSERT INTO jobs (title, salary, equity, company_handle) VALUES
    ('Job1', 100, '0.1', 'c1'),
    ('Job2', 200, '0.2', 'c1'),
    ('Job3', 300, '0', 'c1'),
    ('Job4', NULL, NULL, 'c1');
"#;

pub struct TestDb {
    pub client: Client,
    schema: String,
}

impl TestDb {
    /// Connect, create a private schema and load the fixture rows.
    pub async fn seeded() -> Option<Self> {
        let database_url = std::env::var("DATABASE_URL").ok()?;
        let (client, connection) = tokio_postgres::connect(&database_url, NoTls)
            .await
            .expect("Failed to connect to DATABASE_URL with NoTls");
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                eprintln!("tokio-postgres connection error: {e}");
            }
        });

        let schema = format!("jobly_test_{}", uuid::Uuid::new_v4().simple());
        client
            .batch_execute(&format!(
                "CREATE SCHEMA {schema}; SET search_path TO {schema};\n{SCHEMA_DDL}\n{SEED}"
            ))
            .await
            .expect("failed to create test schema");

        Some(Self { client, schema })
    }

    pub async fn job_id(&self, title: &str) -> i32 {
        self.client
            .query_one("SELECT id FROM jobs WHERE title = $1", &[&title])
            .await
            .expect("fixture job missing")
            .get(0)
    }

    pub async fn cleanup(self) {
        self.client
            .batch_execute(&format!("DROP SCHEMA {} CASCADE", self.schema))
            .await
            .expect("failed to drop test schema");
    }
}

/// Skip the calling test when no database is configured.
macro_rules! seeded_db {
    () => {
        match common::TestDb::seeded().await {
            Some(db) => db,
            None => {
                eprintln!("DATABASE_URL not set; skipping");
                return;
            }
        }
    };
}
