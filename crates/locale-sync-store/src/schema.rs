use rusqlite_migration::{M, Migrations};

pub fn migrations() -> Migrations<'static> {
    Migrations::new(vec![M::up(
        "CREATE TABLE update_runs (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            completed_at  INTEGER NOT NULL
        );

        CREATE INDEX idx_update_runs_completed_at ON update_runs(completed_at);",
    )])
}
