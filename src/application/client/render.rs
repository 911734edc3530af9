//! Line rendering for delivered events.

use crate::domain::event::Event;

/// Render one event as a single line (no trailing newline).
///
/// Account events read `<time>: [<id>]: <data>`; sentinel error events
/// read `<time>: [error] <data>`.
pub fn format_event(event: &Event) -> String {
    let at = event.timestamp().display_millis();
    if event.is_error() {
        format!("<{}>: [error] {}", at, event.data())
    } else {
        format!("<{}>: [{}]: {}", at, event.account_id(), event.data())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{AccountId, Timestamp};
    use chrono::{TimeZone, Utc};

    fn at() -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap())
    }

    #[test]
    fn account_event_line() {
        let event = Event::recorded_at(AccountId::new(42).unwrap(), at(), "deposit");
        assert_eq!(format_event(&event), "<2024-03-09 14:05:07.000>: [42]: deposit");
    }

    #[test]
    fn error_event_line() {
        let event = Event::error("bad payload");
        let line = format_event(&event);
        assert!(line.starts_with('<'), "{}", line);
        assert!(line.ends_with(">: [error] bad payload"), "{}", line);
    }
}
