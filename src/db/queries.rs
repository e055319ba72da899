use anyhow::Context;
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::{
    ConversationMessage, ConversationState, MeetingDescriptor, MeetingRecord, MeetingStatus,
    Session,
};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn fmt_ts(ts: &NaiveDateTime) -> String {
    ts.format(TS_FORMAT).to_string()
}

fn parse_ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, TS_FORMAT).unwrap_or_else(|_| Utc::now().naive_utc())
}

fn parse_utc(s: &str) -> anyhow::Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, TS_FORMAT)
        .map(|dt| dt.and_utc())
        .with_context(|| format!("invalid stored timestamp: {s}"))
}

// ── Sessions ──

pub fn create_session(conn: &Connection, session: &Session) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO sessions (id, phase, state, messages, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            session.id,
            session.state.phase.as_str(),
            serde_json::to_string(&session.state)?,
            serde_json::to_string(&session.messages)?,
            fmt_ts(&session.created_at),
            fmt_ts(&session.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_session(conn: &Connection, id: &str) -> anyhow::Result<Option<Session>> {
    let row = conn
        .query_row(
            "SELECT id, state, messages, created_at, updated_at FROM sessions WHERE id = ?1",
            params![id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            },
        )
        .optional()?;

    let Some((id, state_json, messages_json, created_at, updated_at)) = row else {
        return Ok(None);
    };

    let state: ConversationState = serde_json::from_str(&state_json)
        .with_context(|| format!("corrupt conversation state for session {id}"))?;
    let messages: Vec<ConversationMessage> =
        serde_json::from_str(&messages_json).unwrap_or_default();

    Ok(Some(Session {
        id,
        state,
        messages,
        created_at: parse_ts(&created_at),
        updated_at: parse_ts(&updated_at),
    }))
}

pub fn session_exists(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let found = conn
        .query_row("SELECT 1 FROM sessions WHERE id = ?1", params![id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

pub fn save_session(conn: &Connection, session: &Session) -> anyhow::Result<()> {
    let updated = conn.execute(
        "UPDATE sessions SET phase = ?2, state = ?3, messages = ?4, updated_at = ?5 WHERE id = ?1",
        params![
            session.id,
            session.state.phase.as_str(),
            serde_json::to_string(&session.state)?,
            serde_json::to_string(&session.messages)?,
            fmt_ts(&session.updated_at),
        ],
    )?;
    anyhow::ensure!(updated == 1, "session {} does not exist", session.id);
    Ok(())
}

pub fn delete_session(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM sessions WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

// ── Meetings ──

pub fn insert_meeting(conn: &Connection, meeting: &MeetingRecord) -> anyhow::Result<()> {
    let d = &meeting.descriptor;
    conn.execute(
        "INSERT INTO meetings (id, session_id, title, start_time, end_time, timezone, location, description,
                               meeting_type, organizer_email, attendee_email, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            meeting.id,
            meeting.session_id,
            d.title,
            fmt_ts(&d.start.naive_utc()),
            fmt_ts(&d.end.naive_utc()),
            d.timezone,
            d.location,
            d.description,
            d.meeting_type,
            d.organizer_email,
            d.attendee_email,
            meeting.status.as_str(),
            fmt_ts(&meeting.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_meetings_for_session(
    conn: &Connection,
    session_id: &str,
) -> anyhow::Result<Vec<MeetingRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, session_id, title, start_time, end_time, timezone, location, description,
                meeting_type, organizer_email, attendee_email, status, created_at
         FROM meetings WHERE session_id = ?1 ORDER BY created_at ASC, start_time ASC",
    )?;

    let rows = stmt.query_map(params![session_id], |row| Ok(parse_meeting_row(row)))?;

    let mut meetings = vec![];
    for row in rows {
        meetings.push(row??);
    }
    Ok(meetings)
}

/// Marks every still-scheduled meeting of the session cancelled.
pub fn cancel_meetings_for_session(conn: &Connection, session_id: &str) -> anyhow::Result<usize> {
    let count = conn.execute(
        "UPDATE meetings SET status = 'cancelled' WHERE session_id = ?1 AND status = 'scheduled'",
        params![session_id],
    )?;
    Ok(count)
}

fn parse_meeting_row(row: &Row) -> anyhow::Result<MeetingRecord> {
    let start: String = row.get(3)?;
    let end: String = row.get(4)?;
    let status: String = row.get(11)?;
    let created_at: String = row.get(12)?;

    Ok(MeetingRecord {
        id: row.get(0)?,
        session_id: row.get(1)?,
        descriptor: MeetingDescriptor {
            title: row.get(2)?,
            start: parse_utc(&start)?,
            end: parse_utc(&end)?,
            timezone: row.get(5)?,
            location: row.get(6)?,
            description: row.get(7)?,
            meeting_type: row.get(8)?,
            organizer_email: row.get(9)?,
            attendee_email: row.get(10)?,
        },
        status: MeetingStatus::parse(&status),
        created_at: parse_ts(&created_at),
    })
}
