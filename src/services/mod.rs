pub mod ai;
pub mod calendar;
pub mod conversation;
pub mod datetime;
pub mod dialogue;
pub mod invite;
pub mod meet_link;
pub mod slots;
