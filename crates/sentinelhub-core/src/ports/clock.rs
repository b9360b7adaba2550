use chrono::{DateTime, NaiveDate, Utc};

/// Port for reading the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Current date, used as the implicit end of open time ranges
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}
