//! Import of the legacy plain-text user file
//!
//! One account per line: `username,password_hash[,role]`. The hash is
//! copied verbatim; nothing here knows how it was produced.

use crate::db::Database;
use crate::error::Result;
use crate::types::NewUser;
use std::path::Path;

/// File name of the legacy user list inside the data directory
pub const USERS_FILE: &str = "users.txt";

/// Insert every user from `path` whose username is not taken yet.
///
/// Returns the number of users inserted. A missing file yields 0.
pub fn migrate_users_from_file(db: &Database, path: &Path) -> Result<usize> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "No legacy user file, skipping migration");
        return Ok(0);
    }

    let content = std::fs::read_to_string(path)?;
    let mut migrated = 0;

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some(user) = parse_user_line(line) else {
            tracing::warn!(line = line_no + 1, "Malformed user line, skipping");
            continue;
        };

        if db.find_user_by_username(&user.username)?.is_some() {
            tracing::debug!(username = %user.username, "User already exists");
            continue;
        }

        db.insert_user(&user)?;
        migrated += 1;
    }

    tracing::info!(migrated, path = %path.display(), "Migrated users from file");
    Ok(migrated)
}

fn parse_user_line(line: &str) -> Option<NewUser> {
    let mut fields = line.splitn(3, ',').map(str::trim);
    let username = fields.next().filter(|s| !s.is_empty())?;
    let password_hash = fields.next().filter(|s| !s.is_empty())?;

    let user = NewUser::new(username, password_hash);
    Some(match fields.next().filter(|s| !s.is_empty()) {
        Some(role) => user.with_role(role),
        None => user,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    #[test]
    fn test_parse_user_line() {
        let user = parse_user_line("alice, $2b$hash ,analyst").unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.password_hash, "$2b$hash");
        assert_eq!(user.role, "analyst");

        assert_eq!(parse_user_line("bob,h").unwrap().role, "user");
        assert!(parse_user_line("carol").is_none());
        assert!(parse_user_line(",hash").is_none());
    }

    #[test]
    fn test_missing_file_migrates_nothing() {
        let db = test_db();
        let dir = tempfile::tempdir().unwrap();

        let n = migrate_users_from_file(&db, &dir.path().join(USERS_FILE)).unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn test_migration_skips_existing_and_malformed() {
        let db = test_db();
        db.insert_user(&NewUser::new("alice", "original")).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(USERS_FILE);
        std::fs::write(&path, "alice,replaced\n\nbob,hash-b\nbroken\ncarol,hash-c,admin\n").unwrap();

        assert_eq!(migrate_users_from_file(&db, &path).unwrap(), 2);
        assert_eq!(migrate_users_from_file(&db, &path).unwrap(), 0);

        assert_eq!(
            db.find_user_by_username("alice").unwrap().unwrap().password_hash,
            "original"
        );
        assert_eq!(
            db.find_user_by_username("carol").unwrap().unwrap().role.as_deref(),
            Some("admin")
        );
        assert_eq!(db.count_users().unwrap(), 3);
    }
}
