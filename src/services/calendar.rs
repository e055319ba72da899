use chrono::{DateTime, Utc};

use crate::models::MeetingDescriptor;

const ICS_FORMAT: &str = "%Y%m%dT%H%M%SZ";

pub fn generate_ics(meeting: &MeetingDescriptor, uid: &str, stamp: DateTime<Utc>) -> String {
    let dtstart = meeting.start.format(ICS_FORMAT).to_string();
    let dtend = meeting.end.format(ICS_FORMAT).to_string();
    let dtstamp = stamp.format(ICS_FORMAT).to_string();
    let summary = escape_text(&meeting.title);
    let location = escape_text(&meeting.location);
    let description = escape_text(&meeting.description);
    let organizer = &meeting.organizer_email;
    let attendee = &meeting.attendee_email;

    let url_line = if meeting.location.starts_with("http") {
        format!("URL:{}\r\n", meeting.location)
    } else {
        String::new()
    };

    format!(
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:-//Scheduling Bot//scheduling.bot//\r\n\
         METHOD:REQUEST\r\n\
         BEGIN:VEVENT\r\n\
         UID:{uid}@scheduling.bot\r\n\
         DTSTAMP:{dtstamp}\r\n\
         DTSTART:{dtstart}\r\n\
         DTEND:{dtend}\r\n\
         SUMMARY:{summary}\r\n\
         LOCATION:{location}\r\n\
         DESCRIPTION:{description}\r\n\
         {url_line}\
         ORGANIZER:mailto:{organizer}\r\n\
         ATTENDEE;ROLE=CHAIR;PARTSTAT=ACCEPTED;RSVP=FALSE:mailto:{organizer}\r\n\
         ATTENDEE;ROLE=REQ-PARTICIPANT;PARTSTAT=NEEDS-ACTION;RSVP=TRUE:mailto:{attendee}\r\n\
         BEGIN:VALARM\r\n\
         ACTION:DISPLAY\r\n\
         TRIGGER:-PT15M\r\n\
         DESCRIPTION:Reminder\r\n\
         END:VALARM\r\n\
         END:VEVENT\r\n\
         END:VCALENDAR\r\n"
    )
}

/// Plain-text part of the invitation email.
pub fn email_body(meeting: &MeetingDescriptor) -> String {
    format!(
        "Hello,\n\n\
         You are invited to a {meeting_type}.\n\n\
         Date: {date}\n\
         Time: {start} - {end} {tz}\n\
         Location: Virtual Meeting\n\n\
         Meeting Link: {link}\n\n\
         {description}\n\n\
         Best regards,\n\
         Scheduling Bot\n",
        meeting_type = meeting.meeting_type,
        date = meeting.start.format("%Y-%m-%d"),
        start = meeting.start.format("%I:%M %p"),
        end = meeting.end.format("%I:%M %p"),
        tz = meeting.timezone,
        link = meeting.location,
        description = meeting.description,
    )
}

// RFC 5545 TEXT escaping
fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}
