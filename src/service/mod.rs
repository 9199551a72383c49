pub mod attendance;
pub mod student;

#[cfg(test)]
pub(crate) mod test_support {
    use sqlx::MySqlPool;

    /// Connect to the MySQL instance named by TEST_DATABASE_URL and make
    /// sure the schema exists. Returns None when the variable is unset so
    /// DB-backed tests skip on machines without a database.
    pub async fn test_pool() -> Option<MySqlPool> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        let pool = MySqlPool::connect(&url).await.ok()?;
        for statement in include_str!("../../schema.sql").split(';') {
            let statement = statement.trim();
            if !statement.is_empty() {
                sqlx::query(statement).execute(&pool).await.ok()?;
            }
        }
        Some(pool)
    }

    /// Pool that parses the URL but never connects; enough for exercising
    /// the validation paths that fail before any query is issued.
    pub fn offline_pool() -> MySqlPool {
        MySqlPool::connect_lazy("mysql://offline@localhost:1/attendance_test")
            .expect("valid test url")
    }

    pub fn unique_number(prefix: &str) -> String {
        format!("{}-{}", prefix, chrono::Utc::now().timestamp_micros())
    }
}
