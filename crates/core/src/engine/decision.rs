//! Commute method scoring.
//!
//! Every method starts at [`BASELINE`]. Rules add or subtract points independently, so
//! their order only affects the order of the reasoning lines. Hard vetoes pin a method to
//! exactly zero after all adjustments are summed.

use crate::domain::day::DayInput;
use crate::domain::recommendation::{CommuteMethod, Recommendation, Scores};
use crate::domain::route::{CommuteTimes, TransportProfile};
use crate::domain::weather::{celsius_to_fahrenheit, WeatherSnapshot};

pub const BASELINE: i32 = 100;

const BIKE_MAX_MINUTES: f64 = 60.0;
const WALK_MAX_MINUTES: f64 = 45.0;
const HEAVY_PRECIPITATION_MM: f64 = 2.0;
const ICE_TEMPERATURE_C: f64 = 1.0;
const COLD_TEMPERATURE_C: f64 = 0.0;
const HOT_TEMPERATURE_C: f64 = 35.0;
const IDEAL_TEMPERATURE_C: (f64, f64) = (15.0, 25.0);
const HIGH_WIND_KMH: f64 = 25.0;
const CRITICAL_GAS: i32 = 5;
const LOW_GAS: i32 = 15;

/// Score walk/bike/car for one day and explain the outcome.
///
/// `routes` is optional; without it the travel-time rules simply do not fire.
pub fn make_decision(
    day: &DayInput,
    weather: &WeatherSnapshot,
    routes: Option<&CommuteTimes>,
) -> Recommendation {
    let mut tally = Tally::new();

    if let Some(routes) = routes {
        apply_route_rules(&mut tally, day, routes);
    }
    apply_weather_rules(&mut tally, weather);
    apply_user_rules(&mut tally, day);

    tally.finish()
}

fn apply_route_rules(tally: &mut Tally, day: &DayInput, routes: &CommuteTimes) {
    let car = routes.minutes(TransportProfile::Car);
    let bike = routes.minutes(TransportProfile::Bike);
    let foot = routes.minutes(TransportProfile::Foot);

    if bike < car && bike < BIKE_MAX_MINUTES {
        tally.adjust(CommuteMethod::Bike, 30);
        tally.note_for(
            CommuteMethod::Bike,
            format!(
                "Biking faster than driving: {} by bike vs {} by car.",
                describe_minutes(bike),
                describe_minutes(car)
            ),
        );
    }

    if foot > WALK_MAX_MINUTES {
        tally.adjust(CommuteMethod::Walk, -50);
        let walk = if foot.is_finite() {
            format!("Walking takes {}", describe_minutes(foot))
        } else {
            "No walking route was found".to_string()
        };
        if day.urgency > 3 {
            tally.note(format!("{walk}, which would delay your arrival."));
        } else {
            tally.note(format!("{walk}, but there's no rush today."));
        }
    }

    if car < bike / 2.0 && car < foot / 4.0 {
        tally.adjust(CommuteMethod::Car, 20);
        tally.note_for(
            CommuteMethod::Car,
            format!(
                "Car is significantly faster: {} vs {} by bike.",
                describe_minutes(car),
                describe_minutes(bike)
            ),
        );
    }
}

fn apply_weather_rules(tally: &mut Tally, weather: &WeatherSnapshot) {
    if weather.precipitation > HEAVY_PRECIPITATION_MM || weather.is_snowing {
        tally.veto(CommuteMethod::Bike);
        tally.veto(CommuteMethod::Walk);
        tally.note("Heavy precipitation or snow rules out walking and biking.");
    } else if weather.is_raining {
        tally.adjust(CommuteMethod::Bike, -50);
        tally.adjust(CommuteMethod::Walk, -30);
        tally.note("Rain makes walking and biking less desirable.");
    }

    if weather.temperature < ICE_TEMPERATURE_C
        && (weather.is_raining || weather.precipitation > 0.0)
    {
        tally.veto(CommuteMethod::Bike);
        tally.note("Icy conditions make biking unsafe.");
    }

    let (ideal_low, ideal_high) = IDEAL_TEMPERATURE_C;
    if weather.temperature < COLD_TEMPERATURE_C || weather.temperature > HOT_TEMPERATURE_C {
        tally.adjust(CommuteMethod::Walk, -20);
        tally.adjust(CommuteMethod::Bike, -20);
        tally.note(format!(
            "Extreme temperature ({:.0}°F) discourages an outdoor commute.",
            celsius_to_fahrenheit(weather.temperature)
        ));
    } else if (ideal_low..=ideal_high).contains(&weather.temperature) {
        tally.adjust(CommuteMethod::Walk, 10);
        tally.adjust(CommuteMethod::Bike, 15);
        tally.note("Ideal weather for walking or biking.");
    }

    if weather.wind_speed > HIGH_WIND_KMH {
        tally.adjust(CommuteMethod::Bike, -40);
        tally.adjust(CommuteMethod::Walk, -10);
        tally.note("High winds make biking difficult.");
    }
}

fn apply_user_rules(tally: &mut Tally, day: &DayInput) {
    if day.gas_level < CRITICAL_GAS {
        tally.veto(CommuteMethod::Car);
        tally.note("Gas level is critical (<5%). Car is not an option.");
    } else if day.gas_level < LOW_GAS {
        tally.adjust(CommuteMethod::Car, -30);
        tally.note("Low gas level penalizes car usage.");
    }

    if day.early_meeting {
        tally.adjust(CommuteMethod::Car, 200);
        tally.adjust(CommuteMethod::Bike, -100);
        tally.adjust(CommuteMethod::Walk, -100);
        tally.note("Early meeting: driving to arrive on time overrides other factors.");
    }

    match day.urgency {
        u if u >= 8 => {
            tally.adjust(CommuteMethod::Car, 50);
            tally.adjust(CommuteMethod::Bike, -20);
            tally.adjust(CommuteMethod::Walk, -100);
            tally.note_for(CommuteMethod::Car, "High urgency requires driving.");
        }
        3..=7 => {
            tally.adjust(CommuteMethod::Bike, 50);
            tally.adjust(CommuteMethod::Car, -20);
            tally.adjust(CommuteMethod::Walk, -30);
            tally.note("Moderate urgency favors biking.");
        }
        _ => {
            tally.adjust(CommuteMethod::Walk, 30);
            tally.adjust(CommuteMethod::Bike, -10);
            tally.adjust(CommuteMethod::Car, -40);
            tally.note("Low urgency favors walking.");
        }
    }

    if day.budget_mode {
        tally.adjust(CommuteMethod::Car, -40);
        tally.adjust(CommuteMethod::Walk, 20);
        tally.adjust(CommuteMethod::Bike, 20);
        tally.note("Budget mode favors free transport (Walk/Bike).");
    }
}

fn describe_minutes(minutes: f64) -> String {
    if minutes.is_finite() {
        format!("{minutes:.0} min")
    } else {
        "no route".to_string()
    }
}

/// A reasoning line, optionally only valid when a particular method wins.
#[derive(Debug, Clone)]
struct Note {
    only_if: Option<CommuteMethod>,
    text: String,
}

#[derive(Debug, Clone)]
struct Tally {
    scores: Scores,
    vetoed: Vec<CommuteMethod>,
    notes: Vec<Note>,
}

impl Tally {
    fn new() -> Self {
        Self {
            scores: Scores::uniform(BASELINE),
            vetoed: Vec::new(),
            notes: Vec::new(),
        }
    }

    fn adjust(&mut self, method: CommuteMethod, delta: i32) {
        *self.scores.get_mut(method) += delta;
    }

    fn veto(&mut self, method: CommuteMethod) {
        if !self.vetoed.contains(&method) {
            self.vetoed.push(method);
        }
    }

    fn note(&mut self, text: impl Into<String>) {
        self.notes.push(Note {
            only_if: None,
            text: text.into(),
        });
    }

    /// A note that argues for `method` and would contradict any other winner.
    fn note_for(&mut self, method: CommuteMethod, text: impl Into<String>) {
        self.notes.push(Note {
            only_if: Some(method),
            text: text.into(),
        });
    }

    fn finish(self) -> Recommendation {
        let mut scores = self.scores;
        for method in &self.vetoed {
            *scores.get_mut(*method) = 0;
        }

        let best_method = pick_winner(&scores);
        let reasoning = self
            .notes
            .into_iter()
            .filter(|n| n.only_if.map_or(true, |m| m == best_method))
            .map(|n| n.text)
            .collect();

        Recommendation {
            best_method,
            scores,
            reasoning,
        }
    }
}

/// Walk, then Bike, then Car; a later method only takes over on a strictly higher score,
/// so ties go to the earlier method.
fn pick_winner(scores: &Scores) -> CommuteMethod {
    let mut best = CommuteMethod::Car;
    let mut best_score: Option<i32> = None;
    for method in CommuteMethod::ALL {
        let score = scores.get(method);
        if best_score.map_or(true, |b| score > b) {
            best = method;
            best_score = Some(score);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::route::RouteEstimate;

    fn day() -> DayInput {
        DayInput {
            date: "2024-01-01".to_string(),
            early_meeting: false,
            gas_level: 100,
            budget_mode: false,
            urgency: 5,
            origin: "Home".to_string(),
            destination: "Work".to_string(),
        }
    }

    /// 10°C, dry, calm: no weather rule fires.
    fn mild() -> WeatherSnapshot {
        WeatherSnapshot {
            temperature: 10.0,
            is_raining: false,
            is_snowing: false,
            wind_speed: 5.0,
            precipitation: 0.0,
            city_name: "Springfield".to_string(),
            date: "2024-01-01".to_string(),
        }
    }

    fn routes(car_min: f64, bike_min: f64, foot_min: f64) -> CommuteTimes {
        let r = |min: f64| {
            Some(RouteEstimate {
                duration: min * 60.0,
                distance: 5000.0,
            })
        };
        CommuteTimes {
            car: r(car_min),
            bike: r(bike_min),
            foot: r(foot_min),
        }
    }

    #[test]
    fn moderate_urgency_on_a_mild_day_picks_bike() {
        let rec = make_decision(&day(), &mild(), None);
        assert_eq!(
            rec.scores,
            Scores {
                walk: 70,
                bike: 150,
                car: 80
            }
        );
        assert_eq!(rec.best_method, CommuteMethod::Bike);
        assert_eq!(rec.reasoning, vec!["Moderate urgency favors biking."]);
    }

    #[test]
    fn exact_tie_goes_to_walk() {
        let scores = Scores::uniform(BASELINE);
        assert_eq!(pick_winner(&scores), CommuteMethod::Walk);

        let scores = Scores {
            walk: 10,
            bike: 40,
            car: 40,
        };
        assert_eq!(pick_winner(&scores), CommuteMethod::Bike);
    }

    #[test]
    fn all_vetoed_still_recommends_a_method() {
        let mut d = day();
        d.gas_level = 2;
        let w = WeatherSnapshot {
            is_snowing: true,
            ..mild()
        };
        let rec = make_decision(&d, &w, None);
        assert_eq!(rec.scores, Scores::uniform(0));
        assert_eq!(rec.best_method, CommuteMethod::Walk);
    }

    #[test]
    fn heavy_precipitation_vetoes_active_modes() {
        let w = WeatherSnapshot {
            precipitation: 3.0,
            temperature: 20.0,
            ..mild()
        };
        for urgency in 1..=10 {
            for budget_mode in [false, true] {
                let d = DayInput {
                    urgency,
                    budget_mode,
                    ..day()
                };
                let r = routes(30.0, 10.0, 20.0);
                let rec = make_decision(&d, &w, Some(&r));
                assert!(rec.scores.bike <= 0, "bike {:?}", rec.scores);
                assert!(rec.scores.walk <= 0, "walk {:?}", rec.scores);
            }
        }
    }

    #[test]
    fn critical_gas_vetoes_car_even_with_early_meeting() {
        let d = DayInput {
            gas_level: 3,
            early_meeting: true,
            urgency: 10,
            ..day()
        };
        let rec = make_decision(&d, &mild(), Some(&routes(5.0, 40.0, 120.0)));
        assert_eq!(rec.scores.car, 0);
        assert!(rec
            .reasoning
            .iter()
            .any(|r| r.starts_with("Gas level is critical")));
    }

    #[test]
    fn low_gas_penalizes_car() {
        let d = DayInput {
            gas_level: 10,
            ..day()
        };
        let rec = make_decision(&d, &mild(), None);
        assert_eq!(rec.scores.car, 50);
    }

    #[test]
    fn early_meeting_dominates() {
        for urgency in 1..=10 {
            let d = DayInput {
                early_meeting: true,
                urgency,
                ..day()
            };
            let rec = make_decision(&d, &mild(), None);
            assert_eq!(rec.best_method, CommuteMethod::Car);
            assert!(rec.scores.car >= rec.scores.bike + 100);
            assert!(rec.scores.car >= rec.scores.walk + 100);
        }
    }

    #[test]
    fn rain_and_ice() {
        let w = WeatherSnapshot {
            is_raining: true,
            precipitation: 1.0,
            temperature: 0.5,
            ..mild()
        };
        let rec = make_decision(&day(), &w, None);
        // Ice veto on bike; walk gets rain -30 and moderate urgency -30.
        assert_eq!(rec.scores.bike, 0);
        assert_eq!(rec.scores.walk, 40);
        assert_eq!(
            rec.reasoning,
            vec![
                "Rain makes walking and biking less desirable.",
                "Icy conditions make biking unsafe.",
                "Moderate urgency favors biking.",
            ]
        );
    }

    #[test]
    fn extreme_temperature_is_reported_in_fahrenheit() {
        let w = WeatherSnapshot {
            temperature: -10.0,
            ..mild()
        };
        let rec = make_decision(&day(), &w, None);
        assert_eq!(rec.scores.walk, 50);
        assert_eq!(rec.scores.bike, 130);
        assert!(rec.reasoning.iter().any(|r| r.contains("14°F")));
    }

    #[test]
    fn ideal_temperature_and_wind() {
        let w = WeatherSnapshot {
            temperature: 25.0,
            wind_speed: 30.0,
            ..mild()
        };
        let d = DayInput {
            urgency: 1,
            ..day()
        };
        let rec = make_decision(&d, &w, None);
        // Walk 100+10-10+30, bike 100+15-40-10, car 100-40.
        assert_eq!(
            rec.scores,
            Scores {
                walk: 130,
                bike: 65,
                car: 60
            }
        );
        assert_eq!(rec.best_method, CommuteMethod::Walk);
    }

    #[test]
    fn high_urgency_and_budget() {
        let d = DayInput {
            urgency: 9,
            budget_mode: true,
            ..day()
        };
        let rec = make_decision(&d, &mild(), None);
        assert_eq!(
            rec.scores,
            Scores {
                walk: 20,
                bike: 100,
                car: 110
            }
        );
        assert_eq!(rec.best_method, CommuteMethod::Car);
        assert!(rec
            .reasoning
            .contains(&"High urgency requires driving.".to_string()));
    }

    #[test]
    fn route_rules_reward_fast_bike_and_penalize_long_walks() {
        let d = DayInput {
            urgency: 2,
            ..day()
        };
        let rec = make_decision(&d, &mild(), Some(&routes(25.0, 20.0, 70.0)));
        // Bike 100+30-10, walk 100-50+30, car 100-40.
        assert_eq!(
            rec.scores,
            Scores {
                walk: 80,
                bike: 120,
                car: 60
            }
        );
        assert_eq!(rec.best_method, CommuteMethod::Bike);
        assert_eq!(
            rec.reasoning[0],
            "Biking faster than driving: 20 min by bike vs 25 min by car."
        );
        assert_eq!(
            rec.reasoning[1],
            "Walking takes 70 min, but there's no rush today."
        );
    }

    #[test]
    fn contradicting_speed_notes_are_dropped() {
        // Car is much faster, but moderate urgency + budget mode still favor the bike.
        let d = DayInput {
            budget_mode: true,
            ..day()
        };
        let rec = make_decision(&d, &mild(), Some(&routes(5.0, 15.0, 60.0)));
        assert_eq!(rec.best_method, CommuteMethod::Bike);
        assert!(rec.scores.car > 0);
        assert!(!rec
            .reasoning
            .iter()
            .any(|r| r.contains("significantly faster")));
        assert!(rec
            .reasoning
            .iter()
            .any(|r| r.contains("which would delay your arrival")));
    }

    #[test]
    fn high_urgency_note_dropped_when_car_loses() {
        let d = DayInput {
            urgency: 8,
            gas_level: 1,
            ..day()
        };
        let rec = make_decision(&d, &mild(), None);
        assert_eq!(rec.best_method, CommuteMethod::Bike);
        assert!(!rec.reasoning.iter().any(|r| r.contains("requires driving")));
    }

    #[test]
    fn missing_route_profiles_count_as_unreachable() {
        let r = CommuteTimes {
            bike: Some(RouteEstimate {
                duration: 15.0 * 60.0,
                distance: 4000.0,
            }),
            ..CommuteTimes::default()
        };
        let rec = make_decision(&day(), &mild(), Some(&r));
        // Bike beats a missing car route; missing foot route is "too long".
        assert_eq!(rec.scores.bike, 180);
        assert_eq!(rec.scores.walk, 20);
        assert_eq!(rec.scores.car, 80);
        assert!(rec.reasoning[0].ends_with("vs no route by car."));
        assert!(rec.reasoning[1].starts_with("No walking route was found"));
    }

    #[test]
    fn identical_inputs_give_identical_output() {
        let r = routes(12.0, 30.0, 90.0);
        let a = make_decision(&day(), &mild(), Some(&r));
        let b = make_decision(&day(), &mild(), Some(&r));
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    fn scores_in(weather: WeatherSnapshot) -> Scores {
        make_decision(&day(), &weather, None).scores
    }

    #[test]
    fn above_35_degrees_is_extreme_heat() {
        let scores = scores_in(WeatherSnapshot {
            temperature: 36.0,
            ..mild()
        });
        assert_eq!(
            scores,
            Scores {
                walk: 50,
                bike: 130,
                car: 80
            }
        );
    }

    #[test]
    fn fifteen_degrees_is_ideal() {
        let scores = scores_in(WeatherSnapshot {
            temperature: 15.0,
            ..mild()
        });
        assert_eq!(
            scores,
            Scores {
                walk: 80,
                bike: 165,
                car: 80
            }
        );
    }

    #[test]
    fn freezing_point_is_not_extreme() {
        let scores = scores_in(WeatherSnapshot {
            temperature: 0.0,
            ..mild()
        });
        assert_eq!(
            scores,
            Scores {
                walk: 70,
                bike: 150,
                car: 80
            }
        );
    }

    #[test]
    fn two_millimetres_of_rain_is_only_a_rain_penalty() {
        let scores = scores_in(WeatherSnapshot {
            is_raining: true,
            precipitation: 2.0,
            ..mild()
        });
        assert_eq!(
            scores,
            Scores {
                walk: 40,
                bike: 100,
                car: 80
            }
        );
    }

    #[test]
    fn wind_of_exactly_25_is_not_high() {
        let at_limit = scores_in(WeatherSnapshot {
            wind_speed: 25.0,
            ..mild()
        });
        assert_eq!(
            at_limit,
            Scores {
                walk: 70,
                bike: 150,
                car: 80
            }
        );

        let above = scores_in(WeatherSnapshot {
            wind_speed: 25.1,
            ..mild()
        });
        assert_eq!(
            above,
            Scores {
                walk: 60,
                bike: 110,
                car: 80
            }
        );
    }

    #[test]
    fn rain_at_one_degree_is_not_ice() {
        let scores = scores_in(WeatherSnapshot {
            temperature: 1.0,
            is_raining: true,
            precipitation: 1.0,
            ..mild()
        });
        assert_eq!(
            scores,
            Scores {
                walk: 40,
                bike: 100,
                car: 80
            }
        );
    }

    #[test]
    fn dry_precipitation_below_one_degree_is_ice() {
        let rec = make_decision(
            &day(),
            &WeatherSnapshot {
                temperature: 0.5,
                is_raining: false,
                precipitation: 0.5,
                ..mild()
            },
            None,
        );
        assert_eq!(
            rec.scores,
            Scores {
                walk: 70,
                bike: 0,
                car: 80
            }
        );
        assert_eq!(rec.best_method, CommuteMethod::Car);
        assert!(rec
            .reasoning
            .contains(&"Icy conditions make biking unsafe.".to_string()));
    }
}
