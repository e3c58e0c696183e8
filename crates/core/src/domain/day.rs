use serde::{Deserialize, Serialize};

/// One scheduled commute day as entered in the planning sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayInput {
    /// Free-form token: ISO date, weekday name, or "M/D".
    pub date: String,
    pub early_meeting: bool,
    /// Fuel gauge percentage, 0..=100. Overwritten by the gas simulation.
    pub gas_level: i32,
    /// Run-wide preference; identical on every day of a plan.
    pub budget_mode: bool,
    /// 1..=10.
    pub urgency: i32,
    pub origin: String,
    pub destination: String,
}

impl DayInput {
    pub fn has_route(&self) -> bool {
        !self.origin.trim().is_empty() && !self.destination.trim().is_empty()
    }
}
