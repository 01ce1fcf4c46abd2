//! SQL schema for the member database.
//!
//! Executed once at connection startup. The version is recorded in
//! `PRAGMA user_version`; future migrations will be gated on it.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS` and `INSERT OR IGNORE`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS people (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    fullname    TEXT NOT NULL,
    email       TEXT NOT NULL,
    member      TEXT NOT NULL DEFAULT 'YES' CHECK (member IN ('YES', 'NO')),
    keyholder   TEXT NOT NULL DEFAULT 'NO'  CHECK (keyholder IN ('YES', 'NO')),
    access      TEXT NOT NULL DEFAULT 'NO'  CHECK (access IN ('NO', 'DOWNSTAIRS', 'BOTH')),
    paymentref  TEXT NOT NULL DEFAULT ''
);

-- A NULL pin is a card issued without a PIN; it never opens a door.
CREATE TABLE IF NOT EXISTS rfid_tags (
    card_id  TEXT PRIMARY KEY,
    pin      TEXT,
    user_id  INTEGER NOT NULL REFERENCES people(id)
);

CREATE TABLE IF NOT EXISTS systems (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    mac          TEXT NOT NULL UNIQUE,
    description  TEXT NOT NULL,
    source       TEXT NOT NULL CHECK (source IN ('r', 'e')),   -- rfid gateway | entered
    hidden       INTEGER NOT NULL DEFAULT 0 CHECK (hidden IN (0, 1, 2)),
    owner        INTEGER NOT NULL REFERENCES people(id)
);

CREATE TABLE IF NOT EXISTS prefs (
    name   TEXT PRIMARY KEY,
    value  INTEGER NOT NULL
);

-- 0 = open, 2 = closed.
INSERT OR IGNORE INTO prefs (name, value) VALUES ('space-state', 2);

CREATE TABLE IF NOT EXISTS open_days (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    opens_at   TEXT NOT NULL,   -- local time, '%Y-%m-%d %H:%M:%S'
    closes_at  TEXT NOT NULL,
    CHECK (opens_at < closes_at)
);

CREATE TABLE IF NOT EXISTS environmental (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    recorded_at  TEXT NOT NULL,
    temperature  INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS presence_deadline (
    system   INTEGER PRIMARY KEY REFERENCES systems(id),
    expires  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS rfid_tags_user_idx   ON rfid_tags(user_id);
CREATE INDEX IF NOT EXISTS systems_owner_idx    ON systems(owner);
CREATE INDEX IF NOT EXISTS open_days_range_idx  ON open_days(opens_at, closes_at);

PRAGMA user_version = 1;
";
