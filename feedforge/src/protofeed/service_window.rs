use serde::{Deserialize, Serialize};

use crate::synth::time_ops;

/// a single row from service_windows.csv: a daily time interval and the
/// weekdays on which it is active. all routes referencing the window run at
/// constant frequency throughout it.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServiceWindow {
    pub service_window_id: String,
    /// window start in seconds past midnight
    #[serde(deserialize_with = "time_ops::deserialize_time_seconds")]
    pub start_time: u32,
    /// window end in seconds past midnight
    #[serde(deserialize_with = "time_ops::deserialize_time_seconds")]
    pub end_time: u32,
    pub monday: u8,
    pub tuesday: u8,
    pub wednesday: u8,
    pub thursday: u8,
    pub friday: u8,
    pub saturday: u8,
    pub sunday: u8,
}

impl ServiceWindow {
    pub fn duration_seconds(&self) -> u32 {
        self.end_time.saturating_sub(self.start_time)
    }

    pub fn duration_hours(&self) -> f64 {
        f64::from(self.duration_seconds()) / 3600.0
    }

    pub fn weekday_bits(&self) -> [u8; 7] {
        [
            self.monday,
            self.tuesday,
            self.wednesday,
            self.thursday,
            self.friday,
            self.saturday,
            self.sunday,
        ]
    }

    /// the calendar service id shared by all windows with the same weekday
    /// activity, e.g. `srv1111100`
    pub fn service_id(&self) -> String {
        let bits: String = self.weekday_bits().iter().map(|b| b.to_string()).collect();
        format!("srv{bits}")
    }
}
