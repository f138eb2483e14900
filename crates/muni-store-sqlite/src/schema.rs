//! SQL schema for the municipal entity directory.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS roles (
    id    INTEGER PRIMARY KEY,
    code  TEXT NOT NULL UNIQUE,
    name  TEXT
);

-- Location columns are nullable; NULL means the user has no placement on
-- that dimension.
CREATE TABLE IF NOT EXISTS users (
    id             INTEGER PRIMARY KEY,
    name           TEXT,
    is_active      INTEGER NOT NULL DEFAULT 1,
    role_id        INTEGER NOT NULL REFERENCES roles(id),
    department_id  INTEGER,
    division_id    INTEGER,
    district_id    INTEGER,
    town_id        INTEGER,
    subtown_id     INTEGER
);

-- A user may be attached to several zones at once.
CREATE TABLE IF NOT EXISTS user_zones (
    user_id  INTEGER NOT NULL REFERENCES users(id),
    zone_id  INTEGER NOT NULL,
    PRIMARY KEY (user_id, zone_id)
);

CREATE TABLE IF NOT EXISTS role_groups (
    id          INTEGER PRIMARY KEY,
    name        TEXT,
    is_active   INTEGER NOT NULL DEFAULT 1,
    role_codes  TEXT NOT NULL DEFAULT '[]'   -- JSON array, possibly double-encoded
);

-- A team is identified by its manager.
CREATE TABLE IF NOT EXISTS team_members (
    manager_id  INTEGER NOT NULL,
    member_id   INTEGER NOT NULL,
    is_active   INTEGER NOT NULL DEFAULT 1,
    PRIMARY KEY (manager_id, member_id)
);

-- Location-tagged catalog; all-NULL tags mean visible to everyone.
CREATE TABLE IF NOT EXISTS file_types (
    id           INTEGER PRIMARY KEY,
    name         TEXT NOT NULL,
    zone_id      INTEGER,
    division_id  INTEGER,
    district_id  INTEGER,
    town_id      INTEGER
);

CREATE INDEX IF NOT EXISTS users_role_idx       ON users(role_id);
CREATE INDEX IF NOT EXISTS users_department_idx ON users(department_id);
CREATE INDEX IF NOT EXISTS team_manager_idx     ON team_members(manager_id);

PRAGMA user_version = 1;
";
