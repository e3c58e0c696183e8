use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportProfile {
    Car,
    Bike,
    Foot,
}

impl TransportProfile {
    /// Profile name used in OSRM URLs.
    pub fn osrm_profile(self) -> &'static str {
        match self {
            Self::Car => "driving",
            Self::Bike => "cycling",
            Self::Foot => "walking",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteEstimate {
    /// Seconds.
    pub duration: f64,
    /// Meters.
    pub distance: f64,
}

/// Route estimates for one origin/destination pair. A missing profile is `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CommuteTimes {
    pub car: Option<RouteEstimate>,
    pub bike: Option<RouteEstimate>,
    pub foot: Option<RouteEstimate>,
}

impl CommuteTimes {
    pub fn get(&self, profile: TransportProfile) -> Option<&RouteEstimate> {
        match profile {
            TransportProfile::Car => self.car.as_ref(),
            TransportProfile::Bike => self.bike.as_ref(),
            TransportProfile::Foot => self.foot.as_ref(),
        }
    }

    /// Duration in minutes; a missing profile counts as unreachable (infinite).
    pub fn minutes(&self, profile: TransportProfile) -> f64 {
        self.get(profile)
            .map(|r| r.duration / 60.0)
            .unwrap_or(f64::INFINITY)
    }

    pub fn is_empty(&self) -> bool {
        self.car.is_none() && self.bike.is_none() && self.foot.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
    pub display_name: String,
}
