//! SQL dialect adapter.
//!
//! [`Dialect`] is the single decision point for engine differences. It is
//! chosen once from configuration and passed by value to the pool builder,
//! the migrator and every repository. Query text is authored once with `?`
//! placeholders and run through [`Dialect::sql`] before execution.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use sqlx::migrate::Migrator;

static POSTGRES_MIGRATOR: Migrator = sqlx::migrate!("./migrations/postgres");
static MYSQL_MIGRATOR: Migrator = sqlx::migrate!("./migrations/mysql");
static SQLITE_MIGRATOR: Migrator = sqlx::migrate!("./migrations/sqlite");

const SQLITE_PRAGMAS: &[&str] = &[
    "PRAGMA busy_timeout = 5000",
    "PRAGMA foreign_keys = ON",
    "PRAGMA journal_mode = WAL",
];

/// A supported SQL engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Postgres,
    MySql,
    Sqlite,
}

#[derive(Debug, thiserror::Error)]
#[error("unsupported database dialect '{0}' (expected postgres, mysql or sqlite)")]
pub struct UnsupportedDialect(pub String);

impl Dialect {
    /// Infers the dialect from a connection URL scheme.
    pub fn from_url(url: &str) -> Result<Self, UnsupportedDialect> {
        let scheme = url.split_once(':').map_or(url, |(scheme, _)| scheme);
        scheme.parse()
    }

    pub fn name(self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::MySql => "mysql",
            Dialect::Sqlite => "sqlite",
        }
    }

    /// Rewrites `?` placeholders into the engine's native form.
    ///
    /// Postgres gets `$1..$n`. Placeholders inside single-quoted literals
    /// and double-quoted identifiers are left alone.
    pub fn sql<'a>(self, stmt: &'a str) -> Cow<'a, str> {
        if self != Dialect::Postgres || !stmt.contains('?') {
            return Cow::Borrowed(stmt);
        }

        let mut out = String::with_capacity(stmt.len() + 8);
        let mut n = 0;
        let mut quote: Option<char> = None;

        for c in stmt.chars() {
            match (quote, c) {
                (None, '?') => {
                    n += 1;
                    out.push('$');
                    out.push_str(&n.to_string());
                    continue;
                }
                (None, '\'' | '"') => quote = Some(c),
                (Some(q), c) if c == q => quote = None,
                _ => {}
            }
            out.push(c);
        }

        Cow::Owned(out)
    }

    /// Builds an atomic insert-if-absent statement.
    ///
    /// `conflict_columns` must match a unique index or primary key.
    pub fn insert_ignore(self, table: &str, columns: &[&str], conflict_columns: &[&str]) -> String {
        let cols = columns.join(", ");
        let values = vec!["?"; columns.len()].join(", ");

        match self {
            Dialect::MySql => format!("INSERT IGNORE INTO {table} ({cols}) VALUES ({values})"),
            Dialect::Postgres | Dialect::Sqlite => format!(
                "INSERT INTO {table} ({cols}) VALUES ({values}) ON CONFLICT ({}) DO NOTHING",
                conflict_columns.join(", ")
            ),
        }
    }

    /// String concatenation expression.
    pub fn concat(self, parts: &[&str]) -> String {
        match self {
            Dialect::MySql => format!("CONCAT({})", parts.join(", ")),
            Dialect::Postgres | Dialect::Sqlite => parts.join(" || "),
        }
    }

    /// Case-insensitive equality against one bound parameter, written to
    /// hit the engine's case-insensitive unique index on `column`.
    pub fn eq_ignore_case(self, column: &str) -> String {
        match self {
            Dialect::Postgres => format!("LOWER({column}) = LOWER(?)"),
            Dialect::MySql => format!("{column} = ?"),
            Dialect::Sqlite => format!("{column} = ? COLLATE NOCASE"),
        }
    }

    /// Statements run on every new pooled connection.
    ///
    /// SQLite ignores foreign keys unless enabled per connection, which
    /// would turn every cascade into a silent no-op.
    pub fn connection_pragmas(self) -> &'static [&'static str] {
        match self {
            Dialect::Sqlite => SQLITE_PRAGMAS,
            Dialect::Postgres | Dialect::MySql => &[],
        }
    }

    /// Statement opening a transaction that is going to write.
    ///
    /// SQLite takes the write lock up front, where `busy_timeout` applies.
    /// A deferred transaction that reads first fails with `SQLITE_BUSY` on
    /// the lock upgrade instead of waiting.
    pub fn begin_write(self) -> Option<&'static str> {
        match self {
            Dialect::Sqlite => Some("BEGIN IMMEDIATE"),
            Dialect::Postgres | Dialect::MySql => None,
        }
    }

    /// Suffix for a `SELECT` that must see rows committed after the
    /// transaction's snapshot was taken.
    ///
    /// MySQL's REPEATABLE READ serves plain reads from the first snapshot;
    /// a locking read returns the latest committed version. The other
    /// engines already see it.
    pub fn latest_committed(self) -> &'static str {
        match self {
            Dialect::MySql => " LOCK IN SHARE MODE",
            Dialect::Postgres | Dialect::Sqlite => "",
        }
    }

    /// Forward-only migrations embedded for this engine.
    pub fn migrator(self) -> &'static Migrator {
        match self {
            Dialect::Postgres => &POSTGRES_MIGRATOR,
            Dialect::MySql => &MYSQL_MIGRATOR,
            Dialect::Sqlite => &SQLITE_MIGRATOR,
        }
    }
}

impl FromStr for Dialect {
    type Err = UnsupportedDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            other => Err(UnsupportedDialect(other.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
