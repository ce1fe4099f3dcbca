use chrono::{DateTime, Local, NaiveDate};

/// Source of "now" for handlers and the scheduler.
///
/// Injected instead of calling the system clock directly so date-boundary
/// logic (same-day check-in, previous-working-day scans) is deterministic
/// under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;

    /// The server's local calendar day. This is the authoritative "today"
    /// for attendance; clients never supply it.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

#[cfg(test)]
pub struct FixedClock(pub DateTime<Local>);

#[cfg(test)]
impl FixedClock {
    pub fn at(datetime: &str) -> Self {
        use chrono::{NaiveDateTime, TimeZone};
        let naive = NaiveDateTime::parse_from_str(datetime, "%Y-%m-%d %H:%M:%S")
            .expect("valid test datetime");
        FixedClock(Local.from_local_datetime(&naive).unwrap())
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_pins_today() {
        let clock = FixedClock::at("2024-03-11 09:30:00");
        assert_eq!(clock.today().to_string(), "2024-03-11");
        assert_eq!(clock.now().time().to_string(), "09:30:00");
    }
}
