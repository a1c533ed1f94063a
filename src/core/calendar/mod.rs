pub mod calendar_service;

pub use calendar_service::{
    format_events, CalendarApi, CalendarError, CalendarEvent, CalendarService, EventStart,
    EventWindow, NewEvent,
};
