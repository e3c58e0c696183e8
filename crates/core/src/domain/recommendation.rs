use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommuteMethod {
    Walk,
    Bike,
    Car,
}

impl CommuteMethod {
    /// Winner-selection order. Earlier entries win ties.
    pub const ALL: [CommuteMethod; 3] = [Self::Walk, Self::Bike, Self::Car];
}

impl fmt::Display for CommuteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Walk => "Walk",
            Self::Bike => "Bike",
            Self::Car => "Car",
        };
        f.write_str(s)
    }
}

/// Score per method. Always carries exactly the three methods; values may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    #[serde(rename = "Walk")]
    pub walk: i32,
    #[serde(rename = "Bike")]
    pub bike: i32,
    #[serde(rename = "Car")]
    pub car: i32,
}

impl Scores {
    pub fn uniform(v: i32) -> Self {
        Self {
            walk: v,
            bike: v,
            car: v,
        }
    }

    pub fn get(&self, method: CommuteMethod) -> i32 {
        match method {
            CommuteMethod::Walk => self.walk,
            CommuteMethod::Bike => self.bike,
            CommuteMethod::Car => self.car,
        }
    }

    pub fn get_mut(&mut self, method: CommuteMethod) -> &mut i32 {
        match method {
            CommuteMethod::Walk => &mut self.walk,
            CommuteMethod::Bike => &mut self.bike,
            CommuteMethod::Car => &mut self.car,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub best_method: CommuteMethod,
    pub scores: Scores,
    pub reasoning: Vec<String>,
}
