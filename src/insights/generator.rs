//! Statistical Insight Generator
//!
//! Rule-based insights over the per-day trend series. Each analysis has its
//! own data-sufficiency threshold and runs independently of the others.

use super::stats::{
    correlation_confidence, correlation_strength, mean, paired_levels, pearson, PearsonOutcome,
};
use super::types::{Insight, InsightKind, InsightMap};
use crate::entry::{DayAggregate, Metric};
use crate::trends::metric_mean;

const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Minimum days of history for the weekly pattern and trend analyses
pub const MIN_HISTORY_DAYS: usize = 7;
/// Weekdays that need at least [`MIN_WEEKDAY_SAMPLES`] samples
pub const MIN_WEEKDAYS: usize = 3;
pub const MIN_WEEKDAY_SAMPLES: usize = 2;
/// Size of each window compared by the trend analysis
pub const TREND_WINDOW: usize = 7;
/// Non-null energy values each trend window needs
pub const MIN_TREND_VALUES: usize = 5;
/// Days with data needed for a recommendation
pub const MIN_RECOMMENDATION_DAYS: usize = 5;

const WEEKLY_CONFIDENCE: f64 = 0.8;
const TREND_CONFIDENCE: f64 = 0.7;
const RECOMMENDATION_CONFIDENCE: f64 = 0.8;

/// Generate every insight whose threshold is met
///
/// `days` should be the chronological trend series; `period` is the
/// requested number of days.
pub fn generate_insights(days: &[DayAggregate], period: u32) -> InsightMap {
    InsightGenerator::new(days, period).generate()
}

/// Runs the individual analyses over one trend series
pub struct InsightGenerator<'a> {
    days: &'a [DayAggregate],
    period: u32,
}

impl<'a> InsightGenerator<'a> {
    pub fn new(days: &'a [DayAggregate], period: u32) -> Self {
        Self { days, period }
    }

    /// Run all analyses and collect the insights that were produced
    pub fn generate(&self) -> InsightMap {
        let mut insights = InsightMap::new();

        let candidates = [
            Some(self.correlation()),
            self.weekly_pattern(),
            self.trend(),
            self.recommendation(),
        ];

        for insight in candidates.into_iter().flatten() {
            insights.insert(insight.kind, insight);
        }

        tracing::debug!(
            days = self.days.len(),
            generated = insights.len(),
            "Generated insights"
        );

        insights
    }

    /// Energy/stress correlation
    ///
    /// Always produces an insight; small or flat samples yield the
    /// insufficient-data or no-variance variants.
    pub fn correlation(&self) -> Insight {
        let (energy, stress) = paired_levels(self.days);
        let title = "Energy & Stress Connection";

        match pearson(&energy, &stress) {
            PearsonOutcome::Insufficient { n } => Insight::new(
                InsightKind::Correlation,
                title,
                "Insufficient data",
                format!(
                    "Only {} day{} with both energy and stress recorded. Log both on at least 3 days to see how they relate.",
                    n,
                    if n == 1 { "" } else { "s" }
                ),
                0.0,
            )
            .datum("Days with both metrics", n)
            .actions(["Record both energy and stress levels each day"]),

            PearsonOutcome::NoVariance { n } => Insight::new(
                InsightKind::Correlation,
                title,
                "No variance",
                "Your energy or stress levels have stayed the same across these days, so no relationship can be measured yet.",
                0.5,
            )
            .datum("Days with both metrics", n)
            .actions(["Keep logging honestly, including small changes in how you feel"]),

            PearsonOutcome::Coefficient { r, n } => {
                let strength = correlation_strength(r);
                let direction = if r < 0.0 { "negative" } else { "positive" };
                let confidence = correlation_confidence(r, n, self.period);

                let description = if r < 0.0 {
                    format!(
                        "{} negative correlation: on days when your stress is higher, your energy tends to be lower (based on {} of the last {} days).",
                        strength, n, self.period
                    )
                } else {
                    format!(
                        "{} positive correlation: your energy and stress tend to rise and fall together (based on {} of the last {} days).",
                        strength, n, self.period
                    )
                };

                let actions: &[&str] = if r < -0.4 {
                    &[
                        "Reducing stress is likely to lift your energy",
                        "Try a short breathing exercise when stress builds up",
                        "Protect recovery time after stressful days",
                    ]
                } else if r > 0.4 {
                    &[
                        "High-energy days may also be high-pressure days; watch for burnout",
                        "Pair demanding work with deliberate breaks",
                        "Notice whether excitement and stress feel alike for you",
                    ]
                } else {
                    &[
                        "Energy and stress seem mostly independent for you",
                        "Look at your energy and stress sources for other drivers",
                    ]
                };

                Insight::new(
                    InsightKind::Correlation,
                    title,
                    format!("{} {} correlation", strength, direction),
                    description,
                    confidence,
                )
                .datum("Correlation", format!("{:.2}", r))
                .datum("Strength", strength)
                .datum("Days analyzed", n)
                .actions(actions.iter().copied())
            }
        }
    }

    /// Day-of-week pattern
    pub fn weekly_pattern(&self) -> Option<Insight> {
        if self.days.len() < MIN_HISTORY_DAYS {
            return None;
        }

        let mut buckets: [WeekdayBucket; 7] = Default::default();
        for day in self.days {
            if let Some(weekday) = day.weekday() {
                let bucket = &mut buckets[weekday as usize];
                bucket.samples += 1;
                if let Some(e) = day.energy_avg {
                    bucket.energy.push(e);
                }
                if let Some(s) = day.stress_avg {
                    bucket.stress.push(s);
                }
            }
        }

        let qualifying: Vec<(usize, &WeekdayBucket)> = buckets
            .iter()
            .enumerate()
            .filter(|(_, b)| b.samples >= MIN_WEEKDAY_SAMPLES)
            .collect();

        if qualifying.len() < MIN_WEEKDAYS {
            return None;
        }

        let best_energy = extreme(&qualifying, Metric::Energy, |a, b| a > b);
        let calmest = extreme(&qualifying, Metric::Stress, |a, b| a < b);
        let most_stressful = extreme(&qualifying, Metric::Stress, |a, b| a > b);

        if best_energy.is_none() && calmest.is_none() {
            return None;
        }

        let mut parts = Vec::new();
        let mut actions = Vec::new();
        let mut insight_data = Vec::new();

        if let Some((day, avg)) = best_energy {
            parts.push(format!(
                "Your energy tends to peak on {}s (average {:.1}).",
                WEEKDAY_NAMES[day], avg
            ));
            actions.push(format!(
                "Schedule important or demanding tasks on {}s",
                WEEKDAY_NAMES[day]
            ));
            insight_data.push(("Best energy day", WEEKDAY_NAMES[day].to_string()));
            insight_data.push(("Best day energy", format!("{:.1}", avg)));
        }

        if let Some((day, avg)) = calmest {
            parts.push(format!(
                "{}s are usually your least stressful day (average stress {:.1}).",
                WEEKDAY_NAMES[day], avg
            ));
            insight_data.push(("Least stressful day", WEEKDAY_NAMES[day].to_string()));
        }

        if let Some((day, avg)) = most_stressful {
            actions.push(format!(
                "Plan recovery time on {}s, your most stressful day",
                WEEKDAY_NAMES[day]
            ));
            insight_data.push(("Most stressful day", WEEKDAY_NAMES[day].to_string()));
            insight_data.push(("Most stressful day stress", format!("{:.1}", avg)));
        }

        let subtitle = match best_energy {
            Some((day, _)) => format!("{}s are your best days", WEEKDAY_NAMES[day]),
            None => "Your week has a rhythm".to_string(),
        };

        let mut insight = Insight::new(
            InsightKind::Pattern,
            "Weekly Pattern",
            subtitle,
            parts.join(" "),
            WEEKLY_CONFIDENCE,
        )
        .actions(actions);
        for (label, value) in insight_data {
            insight = insight.datum(label, value);
        }

        Some(insight)
    }

    /// Recent energy direction: the latest 7 days against the 7 before
    pub fn trend(&self) -> Option<Insight> {
        if self.days.len() < MIN_HISTORY_DAYS {
            return None;
        }

        let len = self.days.len();
        let recent_start = len.saturating_sub(TREND_WINDOW);
        let previous_start = recent_start.saturating_sub(TREND_WINDOW);

        let recent = energies(&self.days[recent_start..]);
        let previous = energies(&self.days[previous_start..recent_start]);

        if recent.len() < MIN_TREND_VALUES || previous.len() < MIN_TREND_VALUES {
            return None;
        }

        let recent_avg = mean(&recent)?;
        let previous_avg = mean(&previous)?;
        let energy_change = recent_avg - previous_avg;

        let (subtitle, description) = if energy_change > 0.5 {
            (
                "Improving",
                format!(
                    "Your energy has improved by {:.1} points over the past week compared to the week before.",
                    energy_change
                ),
            )
        } else if energy_change < -0.5 {
            (
                "Declining",
                format!(
                    "Your energy has dropped by {:.1} points over the past week compared to the week before.",
                    energy_change.abs()
                ),
            )
        } else {
            (
                "Stable",
                "Your energy has been steady over the past two weeks.".to_string(),
            )
        };

        let actions: &[&str] = if energy_change < -0.5 {
            &[
                "Check whether sleep or workload changed this week",
                "Revisit the activities that gave you energy before",
                "Schedule a lighter day to recover",
            ]
        } else {
            &[
                "Keep the habits that are working",
                "Note what helped this week so you can repeat it",
            ]
        };

        Some(
            Insight::new(
                InsightKind::Prediction,
                "Energy Trend",
                subtitle,
                description,
                TREND_CONFIDENCE,
            )
            .datum("Recent average", format!("{:.1}", recent_avg))
            .datum("Previous average", format!("{:.1}", previous_avg))
            .datum("Change", format!("{:+.1}", energy_change))
            .actions(actions.iter().copied()),
        )
    }

    /// Overall recommendation from period averages
    pub fn recommendation(&self) -> Option<Insight> {
        if self.days.iter().filter(|d| d.has_data()).count() < MIN_RECOMMENDATION_DAYS {
            return None;
        }

        let avg_energy = metric_mean(self.days, Metric::Energy);
        let avg_stress = metric_mean(self.days, Metric::Stress);

        let (subtitle, description, actions): (&str, &str, &[&str]) =
            if avg_energy.map(|e| e < 5.0).unwrap_or(false) {
                (
                    "Build your foundation",
                    "Your average energy is on the low side. Small changes to the basics usually make the biggest difference.",
                    &[
                        "Aim for a consistent sleep schedule",
                        "Get outside for at least 15 minutes a day",
                        "Eat regular meals and stay hydrated",
                    ],
                )
            } else if avg_stress.map(|s| s > 6.0).unwrap_or(false) {
                (
                    "Bring stress down",
                    "Your energy is holding up, but stress has been consistently high.",
                    &[
                        "Block short breaks between demanding tasks",
                        "Try a five-minute breathing or meditation session",
                        "Identify one stress source you can reduce this week",
                    ],
                )
            } else {
                (
                    "Keep it up",
                    "Your energy and stress are in a healthy balance.",
                    &[
                        "Keep your current routines going",
                        "Keep logging to catch changes early",
                    ],
                )
            };

        let mut insight = Insight::new(
            InsightKind::Recommendation,
            "Recommendation",
            subtitle,
            description,
            RECOMMENDATION_CONFIDENCE,
        )
        .actions(actions.iter().copied());

        if let Some(e) = avg_energy {
            insight = insight.datum("Average energy", format!("{:.1}", e));
        }
        if let Some(s) = avg_stress {
            insight = insight.datum("Average stress", format!("{:.1}", s));
        }

        Some(insight)
    }
}

#[derive(Debug, Default)]
struct WeekdayBucket {
    samples: usize,
    energy: Vec<f64>,
    stress: Vec<f64>,
}

impl WeekdayBucket {
    fn average(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Energy => mean(&self.energy),
            Metric::Stress => mean(&self.stress),
        }
    }
}

/// Weekday whose average wins under `better`; the earliest weekday wins ties
fn extreme(
    buckets: &[(usize, &WeekdayBucket)],
    metric: Metric,
    better: impl Fn(f64, f64) -> bool,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (day, bucket) in buckets {
        if let Some(avg) = bucket.average(metric) {
            match best {
                Some((_, current)) if !better(avg, current) => {}
                _ => best = Some((*day, avg)),
            }
        }
    }
    best
}

fn energies(days: &[DayAggregate]) -> Vec<f64> {
    days.iter().filter_map(|d| d.energy_avg).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{DailyEntry, SlotLevels};
    use crate::trends::build_trend_data;
    use chrono::{Duration, NaiveDate};

    fn day(date: &str, energy: Option<f64>, stress: Option<f64>) -> DayAggregate {
        DayAggregate {
            date: date.to_string(),
            energy_avg: energy,
            stress_avg: stress,
        }
    }

    /// Consecutive days starting Monday 2024-03-04
    fn series(values: &[(Option<f64>, Option<f64>)]) -> Vec<DayAggregate> {
        let start = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, (e, s))| {
                let date = start + Duration::days(i as i64);
                day(&date.format("%Y-%m-%d").to_string(), *e, *s)
            })
            .collect()
    }

    #[test]
    fn test_two_entries_insufficient() {
        let entries = vec![
            DailyEntry::new("2024-03-04")
                .energy(SlotLevels::uniform(8))
                .stress(SlotLevels::uniform(2)),
            DailyEntry::new("2024-03-05")
                .energy(SlotLevels::uniform(8))
                .stress(SlotLevels::uniform(2)),
        ];
        let days = build_trend_data(&entries);
        let insight = InsightGenerator::new(&days, 7).correlation();

        assert_eq!(insight.subtitle, "Insufficient data");
        assert_eq!(insight.confidence, 0.0);
    }

    #[test]
    fn test_constant_series_no_variance() {
        let days = series(&[(Some(6.0), Some(4.0)); 8]);
        let insight = InsightGenerator::new(&days, 8).correlation();

        assert_eq!(insight.subtitle, "No variance");
        assert_eq!(insight.confidence, 0.5);
        assert!(insight.data_value("Correlation").is_none());
    }

    #[test]
    fn test_strong_negative_correlation() {
        let values: Vec<(Option<f64>, Option<f64>)> = (0..10)
            .map(|i| (Some(9.0 - i as f64), Some(1.0 + i as f64)))
            .collect();
        let days = series(&values);
        let insight = InsightGenerator::new(&days, 10).correlation();

        assert_eq!(insight.data_value("Strength"), Some("Strong"));
        assert_eq!(insight.data_value("Correlation"), Some("-1.00"));
        assert!(insight.subtitle.contains("negative"));
        assert!(insight.description.contains("negative"));
        assert!(insight.confidence >= 0.9);
        assert!(insight.confidence <= 1.0);
        assert!(insight.action_items[0].contains("Reducing stress"));
    }

    #[test]
    fn test_incomplete_period_lowers_confidence() {
        let values: Vec<(Option<f64>, Option<f64>)> = (0..10)
            .map(|i| (Some(9.0 - i as f64), Some(1.0 + i as f64)))
            .collect();
        let days = series(&values);

        let full = InsightGenerator::new(&days, 10).correlation().confidence;
        let sparse = InsightGenerator::new(&days, 30).correlation().confidence;
        assert!(sparse < full);
        assert!((sparse - 0.84).abs() < 1e-9);
    }

    #[test]
    fn test_weekly_pattern_omitted_with_too_few_weekdays() {
        // Monday twice, Tuesday and Wednesday once: only one weekday has 2 samples
        let days = vec![
            day("2024-03-04", Some(6.0), Some(3.0)),
            day("2024-03-11", Some(7.0), Some(4.0)),
            day("2024-03-05", Some(5.0), Some(5.0)),
            day("2024-03-06", Some(4.0), Some(6.0)),
        ];
        assert!(InsightGenerator::new(&days, 14).weekly_pattern().is_none());

        // Even with 7+ days, too few repeated weekdays
        let mut longer = days.clone();
        longer.push(day("2024-03-07", Some(5.0), Some(5.0)));
        longer.push(day("2024-03-08", Some(5.0), Some(5.0)));
        longer.push(day("2024-03-09", Some(5.0), Some(5.0)));
        assert!(InsightGenerator::new(&longer, 14).weekly_pattern().is_none());
    }

    #[test]
    fn test_weekly_pattern_best_and_calmest_days() {
        // Two weeks Mon..Sun; Wednesdays high energy, Fridays low stress, Mondays high stress
        let values: Vec<(Option<f64>, Option<f64>)> = (0..14)
            .map(|i| match i % 7 {
                0 => (Some(5.0), Some(8.0)),
                2 => (Some(9.0), Some(4.0)),
                4 => (Some(6.0), Some(1.0)),
                _ => (Some(5.0), Some(5.0)),
            })
            .collect();
        let days = series(&values);
        let insight = InsightGenerator::new(&days, 14).weekly_pattern().unwrap();

        assert_eq!(insight.kind, InsightKind::Pattern);
        assert_eq!(insight.confidence, 0.8);
        assert_eq!(insight.data_value("Best energy day"), Some("Wednesday"));
        assert_eq!(insight.data_value("Least stressful day"), Some("Friday"));
        assert_eq!(insight.data_value("Most stressful day"), Some("Monday"));
        assert!(insight.action_items[0].contains("Wednesday"));
        assert!(insight.action_items[1].contains("Monday"));
    }

    #[test]
    fn test_trend_declining() {
        let mut values = vec![(Some(8.0), Some(3.0)); 7];
        values.extend(vec![(Some(5.0), Some(3.0)); 7]);
        let days = series(&values);
        let insight = InsightGenerator::new(&days, 14).trend().unwrap();

        assert_eq!(insight.subtitle, "Declining");
        assert_eq!(insight.data_value("Change"), Some("-3.0"));
        assert_eq!(insight.confidence, 0.7);
    }

    #[test]
    fn test_trend_requires_two_full_windows() {
        // 10 days: the previous window has only 3 entries
        let days = series(&[(Some(6.0), None); 10]);
        assert!(InsightGenerator::new(&days, 10).trend().is_none());

        // 14 days but energy missing on most of the earlier week
        let mut values = vec![(None, Some(4.0)); 5];
        values.extend(vec![(Some(6.0), Some(4.0)); 9]);
        let days = series(&values);
        assert!(InsightGenerator::new(&days, 14).trend().is_none());
    }

    #[test]
    fn test_trend_stable_and_improving() {
        let days = series(&[(Some(6.0), None); 14]);
        let insight = InsightGenerator::new(&days, 14).trend().unwrap();
        assert_eq!(insight.subtitle, "Stable");

        let mut values = vec![(Some(4.0), None); 7];
        values.extend(vec![(Some(7.0), None); 7]);
        let insight = InsightGenerator::new(&series(&values), 14).trend().unwrap();
        assert_eq!(insight.subtitle, "Improving");
    }

    #[test]
    fn test_recommendation_branches() {
        let low_energy = series(&[(Some(3.0), Some(2.0)); 5]);
        let rec = InsightGenerator::new(&low_energy, 5).recommendation().unwrap();
        assert_eq!(rec.subtitle, "Build your foundation");

        let stressed = series(&[(Some(7.0), Some(8.0)); 5]);
        let rec = InsightGenerator::new(&stressed, 5).recommendation().unwrap();
        assert_eq!(rec.subtitle, "Bring stress down");

        let balanced = series(&[(Some(7.0), Some(3.0)); 5]);
        let rec = InsightGenerator::new(&balanced, 5).recommendation().unwrap();
        assert_eq!(rec.subtitle, "Keep it up");
        assert_eq!(rec.confidence, 0.8);

        let short = series(&[(Some(7.0), Some(3.0)); 4]);
        assert!(InsightGenerator::new(&short, 5).recommendation().is_none());
    }

    #[test]
    fn test_generate_contains_only_met_thresholds() {
        let days = series(&[(Some(7.0), Some(3.0)); 2]);
        let insights = generate_insights(&days, 7);
        assert_eq!(insights.len(), 1);
        assert!(insights.contains_key(&InsightKind::Correlation));
    }

    #[test]
    fn test_confidence_always_in_range() {
        for n in 0..20 {
            let values: Vec<(Option<f64>, Option<f64>)> = (0..n)
                .map(|i| (Some((i * 7 % 10) as f64), Some((i * 3 % 10) as f64)))
                .collect();
            let days = series(&values);
            for insight in generate_insights(&days, 30).values() {
                assert!((0.0..=1.0).contains(&insight.confidence));
            }
        }
    }
}
