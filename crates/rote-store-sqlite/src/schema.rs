//! SQL schema for the Rote SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS decks (
    deck_id     TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT '',
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS cards (
    card_id          TEXT PRIMARY KEY,
    deck_id          TEXT NOT NULL REFERENCES decks(deck_id) ON DELETE CASCADE,
    front            TEXT NOT NULL,
    back             TEXT NOT NULL,
    easiness_factor  REAL NOT NULL DEFAULT 2.5,
    interval_days    INTEGER NOT NULL DEFAULT 1 CHECK (interval_days >= 1),
    repetition_count INTEGER NOT NULL DEFAULT 0 CHECK (repetition_count >= 0),
    next_review_at   TEXT NOT NULL,   -- RFC 3339 UTC, fixed width; sorts lexically
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL,
    UNIQUE (deck_id, front)
);

CREATE TABLE IF NOT EXISTS study_sessions (
    session_id    TEXT PRIMARY KEY,
    deck_id       TEXT NOT NULL REFERENCES decks(deck_id) ON DELETE CASCADE,
    session_type  TEXT NOT NULL DEFAULT 'review',   -- 'review' | 'cram' | 'new'
    cards_studied INTEGER NOT NULL DEFAULT 0,
    cards_correct INTEGER NOT NULL DEFAULT 0,
    started_at    TEXT NOT NULL,
    completed_at  TEXT
);

-- Review events are append-only; one per card per session.
CREATE TABLE IF NOT EXISTS session_cards (
    event_id         TEXT PRIMARY KEY,
    session_id       TEXT NOT NULL REFERENCES study_sessions(session_id) ON DELETE CASCADE,
    card_id          TEXT NOT NULL REFERENCES cards(card_id) ON DELETE CASCADE,
    response         TEXT NOT NULL,   -- 'easy' | 'hard'
    response_time_ms INTEGER,
    reviewed_at      TEXT NOT NULL,
    UNIQUE (session_id, card_id)
);

-- At most one uncompleted session per deck.
CREATE UNIQUE INDEX IF NOT EXISTS study_sessions_active_idx
    ON study_sessions(deck_id) WHERE completed_at IS NULL;

CREATE INDEX IF NOT EXISTS cards_deck_idx          ON cards(deck_id);
CREATE INDEX IF NOT EXISTS cards_next_review_idx   ON cards(next_review_at);
CREATE INDEX IF NOT EXISTS sessions_deck_idx       ON study_sessions(deck_id);
CREATE INDEX IF NOT EXISTS session_cards_card_idx  ON session_cards(card_id);

PRAGMA user_version = 1;
";
