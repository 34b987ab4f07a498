use anyhow::Result;
use mongodb::Client;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::PathBuf;
use tokio::fs;

/// Create a SeaORM connection for the relational store.
pub async fn create_orm_conn(database_url: &str) -> Result<DatabaseConnection> {
    let conn = Database::connect(database_url).await?;
    Ok(conn)
}

/// Create a MongoDB client for the product catalog.
pub async fn create_mongo_client(mongodb_url: &str) -> Result<Client> {
    let client = Client::with_uri_str(mongodb_url).await?;
    Ok(client)
}

/// Minimal migration runner that executes SQL files in `migrations/` in filename order.
pub async fn run_migrations(conn: &DatabaseConnection) -> Result<()> {
    let mut entries = fs::read_dir("migrations").await?;
    let mut files: Vec<PathBuf> = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    let backend = conn.get_database_backend();
    for file in files {
        let sql = fs::read_to_string(&file).await?;
        for statement in split_statements(&sql) {
            conn.execute(Statement::from_string(backend, statement))
                .await?;
        }
    }

    Ok(())
}

// Postgres prepared statements cannot contain multiple commands, so split
// the migration file and run each statement individually. Comment lines are
// dropped first: a `;` inside a comment must not shear the file.
fn split_statements(sql: &str) -> Vec<String> {
    let without_comments: Vec<&str> = sql
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect();

    without_comments
        .join("\n")
        .split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty())
        .map(|stmt| format!("{stmt};"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::split_statements;

    #[test]
    fn semicolon_inside_a_comment_does_not_shear_the_file() {
        let sql = "-- opaque reference; may dangle after deletion\n\
                   CREATE TABLE t (id INT);\n\
                   CREATE INDEX idx_t ON t (id);\n";
        let statements = split_statements(sql);
        assert_eq!(
            statements,
            vec!["CREATE TABLE t (id INT);", "CREATE INDEX idx_t ON t (id);"]
        );
    }

    #[test]
    fn migration_files_split_into_executable_statements() {
        let mut checked = 0;
        for entry in std::fs::read_dir("migrations").unwrap() {
            let path = entry.unwrap().path();
            let sql = std::fs::read_to_string(&path).unwrap();
            for statement in split_statements(&sql) {
                let keyword = statement.split_whitespace().next().unwrap_or_default();
                assert!(
                    matches!(keyword, "CREATE" | "ALTER" | "INSERT" | "DROP"),
                    "{}: statement does not start with a SQL keyword: {statement:?}",
                    path.display()
                );
                checked += 1;
            }
        }
        assert!(checked > 0, "no migration statements found");
    }
}
