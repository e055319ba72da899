//! The scheduling dialogue. Each turn is matched against an ordered rule
//! table using plain substring containment on the lowercased input; the first
//! rule whose predicate holds handles the turn.

use chrono::{DateTime, Duration, Utc};

use crate::models::{ConversationState, MeetingDescriptor, Phase, SlotSuggestion};
use crate::services::ai::intent::IntentResponder;
use crate::services::datetime;
use crate::services::invite::InviteDispatcher;
use crate::services::meet_link::MeetingLinkProvider;
use crate::services::slots::SlotSuggester;

pub const GREETING: &str =
    "Hello! I'm your Interview Scheduling Assistant. How can I help you today?";

pub const SCHEDULING_PROMPT: &str = "I'll help you schedule an interview. Please let me know your preferred day and time within the next week.\n\n\
You can specify:\n\
- A specific day (e.g., \"Monday at 2 PM\")\n\
- Relative day (e.g., \"tomorrow at 3:30 PM\")\n\
- Today with time (e.g., \"today at 4 PM\")\n\
- A specific date (e.g., \"25/03 at 2:30 PM\")";

const PAST_TIME: &str =
    "The specified time is in the past. Please provide a future date and time.";
const CLARIFY: &str = "I didn't catch a specific day or time. Could you please specify when you'd like to schedule the interview? For example, 'tomorrow at 2 PM' or 'Monday at 3:30 PM'.";
const DISPATCH_FAILED: &str = "There was an issue sending the calendar invite. Please check the email configuration and try again.";
const MISSING_PARTICIPANTS: &str = "Missing required information to schedule the meeting. Please provide both the recruiter and candidate email addresses.";
const CANCELLED: &str =
    "I've cancelled the scheduled interview. Let me know if you'd like to schedule another time.";
const NOTHING_TO_CANCEL: &str =
    "There's no active interview scheduled to cancel. Would you like to schedule a new interview?";

const FALLBACK_MEETING_TYPE: &str = "Technical Interview";

const SCHEDULING_WORDS: &[&str] = &["schedule", "interview", "meeting"];
const CONFIRM_WORDS: &[&str] = &["yes", "confirm", "schedule"];
const RESCHEDULE_WORDS: &[&str] = &["reschedule", "change"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    StartScheduling,
    SchedulingIntent,
    Availability,
    Finalize,
    Reschedule,
    Cancel,
    Fallback,
}

/// Evaluation order. Earlier rules shadow later ones.
pub const RULES: [Rule; 7] = [
    Rule::StartScheduling,
    Rule::SchedulingIntent,
    Rule::Availability,
    Rule::Finalize,
    Rule::Reschedule,
    Rule::Cancel,
    Rule::Fallback,
];

impl Rule {
    /// `input` must already be lowercased.
    pub fn matches(&self, input: &str, state: &ConversationState) -> bool {
        match self {
            Rule::StartScheduling => {
                state.phase == Phase::Greeting && contains_any(input, SCHEDULING_WORDS)
            }
            Rule::SchedulingIntent => {
                state.phase != Phase::Greeting && contains_any(input, SCHEDULING_WORDS)
            }
            Rule::Availability => state.phase == Phase::CollectingAvailability,
            Rule::Finalize => {
                contains_any(input, CONFIRM_WORDS)
                    && state.phase == Phase::ConfirmSchedule
                    && state.proposed_date_time.is_some()
            }
            Rule::Reschedule => contains_any(input, RESCHEDULE_WORDS),
            Rule::Cancel => input.contains("cancel"),
            Rule::Fallback => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::StartScheduling => "start_scheduling",
            Rule::SchedulingIntent => "scheduling_intent",
            Rule::Availability => "availability",
            Rule::Finalize => "finalize",
            Rule::Reschedule => "reschedule",
            Rule::Cancel => "cancel",
            Rule::Fallback => "fallback",
        }
    }
}

fn contains_any(input: &str, words: &[&str]) -> bool {
    words.iter().any(|w| input.contains(w))
}

pub fn select_rule(input: &str, state: &ConversationState) -> Rule {
    let lowered = input.to_lowercase();
    RULES
        .iter()
        .copied()
        .find(|rule| rule.matches(&lowered, state))
        .unwrap_or(Rule::Fallback)
}

/// What a turn did besides replying, for the caller to persist.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SlotSuggested(SlotSuggestion),
    InviteDispatched(MeetingDescriptor),
    InviteFailed,
    MeetingCancelled,
    StateReset,
}

#[derive(Debug, Clone)]
pub struct Turn {
    pub rule: Rule,
    pub reply: String,
    pub effects: Vec<Effect>,
}

impl Turn {
    fn reply(rule: Rule, reply: impl Into<String>) -> Self {
        Self {
            rule,
            reply: reply.into(),
            effects: Vec::new(),
        }
    }

    fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

pub struct DialogueStateMachine {
    slots: Box<dyn SlotSuggester>,
    invites: Box<dyn InviteDispatcher>,
    links: Box<dyn MeetingLinkProvider>,
    responder: Box<dyn IntentResponder>,
    timezone_label: String,
}

impl DialogueStateMachine {
    pub fn new(
        slots: Box<dyn SlotSuggester>,
        invites: Box<dyn InviteDispatcher>,
        links: Box<dyn MeetingLinkProvider>,
        responder: Box<dyn IntentResponder>,
        timezone_label: String,
    ) -> Self {
        Self {
            slots,
            invites,
            links,
            responder,
            timezone_label,
        }
    }

    /// Runs one user turn against `state`. Never fails: every problem ends up
    /// in the reply and leaves `state` resumable.
    pub async fn handle(
        &self,
        state: &mut ConversationState,
        input: &str,
        now: DateTime<Utc>,
    ) -> Turn {
        let rule = select_rule(input, state);
        let from = state.phase;

        let turn = match rule {
            Rule::StartScheduling => {
                state.phase = Phase::CollectingAvailability;
                Turn::reply(rule, SCHEDULING_PROMPT)
            }
            Rule::SchedulingIntent | Rule::Fallback => {
                Turn::reply(rule, self.responder.respond(input).await)
            }
            Rule::Availability => self.collect_availability(state, input, now),
            Rule::Finalize => self.finalize(state).await,
            Rule::Reschedule => {
                let had_meeting = state.phase == Phase::Completed;
                state.clear_schedule();
                state.phase = Phase::CollectingAvailability;
                let turn = Turn::reply(rule, SCHEDULING_PROMPT).with_effect(Effect::StateReset);
                if had_meeting {
                    turn.with_effect(Effect::MeetingCancelled)
                } else {
                    turn
                }
            }
            Rule::Cancel => {
                if state.phase == Phase::Completed {
                    state.clear_schedule();
                    state.phase = Phase::Greeting;
                    Turn::reply(rule, CANCELLED).with_effect(Effect::MeetingCancelled)
                } else {
                    state.phase = Phase::Greeting;
                    Turn::reply(rule, NOTHING_TO_CANCEL)
                }
            }
        };

        tracing::info!(
            rule = rule.as_str(),
            from = from.as_str(),
            to = state.phase.as_str(),
            "dialogue turn"
        );

        turn
    }

    fn collect_availability(
        &self,
        state: &mut ConversationState,
        input: &str,
        now: DateTime<Utc>,
    ) -> Turn {
        let rule = Rule::Availability;
        let parsed = datetime::extract(input, now);

        if let Some(proposed) = parsed.to_utc() {
            if proposed <= now {
                return Turn::reply(rule, PAST_TIME);
            }

            let suggestion = self.slots.suggest(&state.department, state.duration_minutes);
            tracing::debug!(
                department = %state.department,
                meeting_type = %suggestion.meeting_type,
                "slot suggested"
            );

            state.proposed_date_time = Some(proposed);
            state.meeting_type = Some(suggestion.meeting_type.clone());
            state.duration_minutes = suggestion.duration_minutes;
            state.phase = Phase::ConfirmSchedule;

            let reply = format!(
                "Thanks! I see you're available on {} at {}. {} Would you like me to schedule this now?",
                proposed.format("%A, %B %d"),
                proposed.format("%I:%M %p"),
                suggestion.to_message(),
            );
            return Turn::reply(rule, reply).with_effect(Effect::SlotSuggested(suggestion));
        }

        match (parsed.date, parsed.time) {
            (Some(date), _) => {
                state.pending_date = Some(date);
                Turn::reply(
                    rule,
                    format!(
                        "I see you're interested in {}. What time would work best for you?",
                        date.format("%A, %B %d")
                    ),
                )
            }
            (None, Some(time)) => {
                state.pending_time = Some(time);
                Turn::reply(
                    rule,
                    format!(
                        "I see you prefer {}. Which day would you like to schedule this for?",
                        time.format("%I:%M %p")
                    ),
                )
            }
            (None, None) => Turn::reply(rule, CLARIFY),
        }
    }

    async fn finalize(&self, state: &mut ConversationState) -> Turn {
        let rule = Rule::Finalize;
        let Some(start) = state.proposed_date_time else {
            return Turn::reply(rule, "Please let me know your preferred day and time first.");
        };
        if !state.has_participants() {
            return Turn::reply(rule, MISSING_PARTICIPANTS);
        }

        let meeting_type = state
            .meeting_type
            .clone()
            .unwrap_or_else(|| FALLBACK_MEETING_TYPE.to_string());
        let end = start + Duration::minutes(state.duration_minutes);
        let link = self.links.generate();

        let meeting = MeetingDescriptor {
            title: format!("{meeting_type} - {} Position", state.department),
            start,
            end,
            timezone: self.timezone_label.clone(),
            description: meeting_description(&meeting_type, &state.department, &link),
            location: link,
            meeting_type,
            organizer_email: state.organizer_email.clone(),
            attendee_email: state.attendee_email.clone(),
        };

        if !self.invites.send(&meeting).await {
            tracing::warn!(title = %meeting.title, "invite dispatch failed");
            return Turn::reply(rule, DISPATCH_FAILED).with_effect(Effect::InviteFailed);
        }

        let reply = confirmation_summary(&meeting);
        state.phase = Phase::Completed;
        state.meeting = Some(meeting.clone());
        Turn::reply(rule, reply).with_effect(Effect::InviteDispatched(meeting))
    }
}

fn meeting_description(meeting_type: &str, department: &str, link: &str) -> String {
    format!(
        "{meeting_type} for {department} Position\n\n\
         Meeting Link: {link}\n\n\
         Agenda:\n\
         1. Introduction\n\
         2. Technical/Role Discussion\n\
         3. Q&A\n\n\
         Please prepare to discuss your experience and relevant skills.\n\
         Join the meeting using the link above.\n\n\
         Note: If you have any issues joining the meeting, please contact the recruiter."
    )
}

fn confirmation_summary(meeting: &MeetingDescriptor) -> String {
    format!(
        "Interview scheduled successfully!\n\n\
         Meeting Details:\n\
         - Type: {meeting_type}\n\
         - Date: {date}\n\
         - Time: {start} - {end} {tz}\n\
         - Participants: {organizer}, {attendee}\n\
         - Meeting Link: {link}\n\n\
         Calendar invites have been sent to both participants. Looking forward to the interview!",
        meeting_type = meeting.meeting_type,
        date = meeting.start.format("%A, %B %d, %Y"),
        start = meeting.start.format("%I:%M %p"),
        end = meeting.end.format("%I:%M %p"),
        tz = meeting.timezone,
        organizer = meeting.organizer_email,
        attendee = meeting.attendee_email,
        link = meeting.location,
    )
}
