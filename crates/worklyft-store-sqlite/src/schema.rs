//! SQL schema for the WorkLyft SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One JSON document per meeting. The scalar columns duplicate the fields
-- that lookups filter or sort on and are rewritten on every save.
CREATE TABLE IF NOT EXISTS meetings (
    meeting_id            TEXT PRIMARY KEY,
    created_at            TEXT NOT NULL,   -- RFC 3339 UTC, fixed width
    updated_at            TEXT NOT NULL,
    room_id               TEXT,
    recording_id          TEXT,
    transcription_enabled INTEGER NOT NULL DEFAULT 0,
    document              TEXT NOT NULL    -- serialised Meeting
);

CREATE INDEX IF NOT EXISTS meetings_room_idx      ON meetings(room_id);
CREATE INDEX IF NOT EXISTS meetings_recording_idx ON meetings(recording_id);
CREATE INDEX IF NOT EXISTS meetings_created_idx   ON meetings(created_at);
CREATE INDEX IF NOT EXISTS meetings_enabled_idx
    ON meetings(transcription_enabled, created_at);

PRAGMA user_version = 1;
";
