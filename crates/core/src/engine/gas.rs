use crate::domain::recommendation::CommuteMethod;
use crate::domain::route::CommuteTimes;

pub const FULL_TANK_PCT: f64 = 100.0;
pub const MILES_PER_GALLON: f64 = 25.0;
pub const TANK_GALLONS: f64 = 12.0;
pub const MILES_PER_METER: f64 = 0.000621371;

/// Miles driven on one full tank.
pub fn tank_range_miles() -> f64 {
    MILES_PER_GALLON * TANK_GALLONS
}

/// Percentage of a full tank burned by driving there and back.
pub fn round_trip_fuel_pct(one_way_meters: f64) -> f64 {
    let round_trip_miles = one_way_meters * MILES_PER_METER * 2.0;
    round_trip_miles / tank_range_miles() * FULL_TANK_PCT
}

/// Running fuel level for one planning run. Never shared between runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasGauge {
    level: f64,
}

impl GasGauge {
    pub fn full() -> Self {
        Self {
            level: FULL_TANK_PCT,
        }
    }

    /// Gauge at a reported whole-percent reading, clamped to an empty..full tank.
    pub fn at(reading: i32) -> Self {
        Self {
            level: f64::from(reading).clamp(0.0, FULL_TANK_PCT),
        }
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    /// Whole-percent reading handed to the decision engine, floored at empty.
    pub fn reading(&self) -> i32 {
        self.level.round().max(0.0) as i32
    }

    /// Gauge after the day's commute. Only a car trip with a known driving distance burns fuel.
    pub fn after_commute(self, method: CommuteMethod, routes: Option<&CommuteTimes>) -> Self {
        if method != CommuteMethod::Car {
            return self;
        }
        let Some(car) = routes.and_then(|r| r.car.as_ref()) else {
            return self;
        };
        Self {
            level: self.level - round_trip_fuel_pct(car.distance),
        }
    }
}
