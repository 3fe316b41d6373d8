use serde::{Deserialize, Serialize};

/// Recurrence tag for a periodically-repeating obstacle activity window.
///
/// `None` obstacles are active only during their (single) interval, if any.
/// The other variants repeat the obstacle's active interval every `period_secs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recurrence {
    None,
    Minutely,
    Hourly,
    Daily,
}

impl Recurrence {
    /// Period in seconds; `0.0` for `None`.
    pub fn period_secs(&self) -> f64 {
        match self {
            Recurrence::None => 0.0,
            Recurrence::Minutely => 60.0,
            Recurrence::Hourly => 3600.0,
            Recurrence::Daily => 86400.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn periods_match_spec() {
        assert_eq!(Recurrence::None.period_secs(), 0.0);
        assert_eq!(Recurrence::Minutely.period_secs(), 60.0);
        assert_eq!(Recurrence::Hourly.period_secs(), 3600.0);
        assert_eq!(Recurrence::Daily.period_secs(), 86400.0);
    }
}
