//! Epidemiological statistics over passenger records.
//!
//! Every projection here is recomputed from the passenger list it is given.
//! Nothing is cached between calls and the input is never mutated.

use crate::domain::model::{Passenger, SymptomSeverity};
use crate::domain::ports::PassengerSource;
use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Returned by [`calculate_r_naught`] when fewer than two days can be compared.
pub const R_NAUGHT_UNDEFINED: f64 = -1.0;

/// Date-keyed counts, ascending, without gaps between the first and last day.
pub type DailySeries = BTreeMap<NaiveDate, usize>;

/// Number of passengers whose first symptoms appeared on each day.
///
/// Passengers that are not infected contribute nothing. Every day between
/// two observed infection days is present with a count of zero, nothing is
/// added before the first or after the last observed day.
pub fn new_infections_per_day(passengers: &[Passenger]) -> DailySeries {
    let mut series = DailySeries::new();

    for date in passengers.iter().filter_map(Passenger::infection_date) {
        *series.entry(date).or_insert(0) += 1;
    }

    // BTreeMap 已依日期排序，逐對補上中間缺少的日子
    let observed: Vec<NaiveDate> = series.keys().copied().collect();
    for pair in observed.windows(2) {
        let (before, current) = (pair[0], pair[1]);
        let mut gap = (current - before).num_days();
        while gap > 1 {
            gap -= 1;
            if let Some(missing) = before.checked_add_days(Days::new(gap as u64)) {
                series.insert(missing, 0);
            }
        }
    }

    tracing::debug!(
        "Built daily infection series: {} observed days, {} days after gap filling",
        observed.len(),
        series.len()
    );
    series
}

/// Running total of a gap-filled daily series.
pub fn total_infections_per_day(daily: &DailySeries) -> DailySeries {
    let mut total = 0;
    daily
        .iter()
        .map(|(date, count)| {
            total += count;
            (*date, total)
        })
        .collect()
}

/// Cumulative passenger counts per severity, in lockstep with `dates`.
///
/// For every index `not_infected + mild + severe + critical` equals the
/// number of passengers the breakdown was computed from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeverityBreakdown {
    pub dates: Vec<NaiveDate>,
    pub not_infected: Vec<usize>,
    pub mild: Vec<usize>,
    pub severe: Vec<usize>,
    pub critical: Vec<usize>,
}

impl SeverityBreakdown {
    /// `dates` must contain the infection date of every infected passenger,
    /// which holds for the keys of [`new_infections_per_day`].
    pub fn compute(dates: &[NaiveDate], passengers: &[Passenger]) -> Self {
        let len = dates.len();
        let index: HashMap<NaiveDate, usize> = dates
            .iter()
            .enumerate()
            .map(|(i, date)| (*date, i))
            .collect();

        let mut mild = vec![0; len];
        let mut severe = vec![0; len];
        let mut critical = vec![0; len];

        // 先記錄每天新增的人數
        for passenger in passengers {
            let Some(date) = passenger.infection_date() else {
                continue;
            };
            let Some(&i) = index.get(&date) else {
                tracing::warn!(
                    "Infection date {} of passenger {} is outside the series",
                    date,
                    passenger.passenger_id()
                );
                continue;
            };
            match passenger.symptom_severity() {
                SymptomSeverity::Mild => mild[i] += 1,
                SymptomSeverity::Severe => severe[i] += 1,
                SymptomSeverity::Critical => critical[i] += 1,
                SymptomSeverity::NotInfected => {}
            }
        }

        // 再轉成累計人數，未感染人數為剩下的乘客
        accumulate(&mut mild);
        accumulate(&mut severe);
        accumulate(&mut critical);

        let total = passengers.len();
        let not_infected = (0..len)
            .map(|i| total.saturating_sub(mild[i] + severe[i] + critical[i]))
            .collect();

        Self {
            dates: dates.to_vec(),
            not_infected,
            mild,
            severe,
            critical,
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

fn accumulate(counts: &mut [usize]) {
    let mut running = 0;
    for count in counts.iter_mut() {
        running += *count;
        *count = running;
    }
}

/// Mean day-over-day growth ratio of new infections, from the first day up
/// to and including the peak day.
///
/// The peak is the day with the most new infections; when several days tie,
/// the latest of them is the peak. A previous day with zero infections
/// counts as one. Returns [`R_NAUGHT_UNDEFINED`] when fewer than two days
/// are visited.
pub fn calculate_r_naught(passengers: &[Passenger]) -> f64 {
    let series = new_infections_per_day(passengers);

    let mut peak: Option<(NaiveDate, usize)> = None;
    for (date, count) in &series {
        match peak {
            Some((_, max)) if *count < max => {}
            _ => peak = Some((*date, *count)),
        }
    }
    let Some((peak_day, _)) = peak else {
        return R_NAUGHT_UNDEFINED;
    };

    let mut total_ratio = 0.0;
    let mut days = 0usize;
    let mut previous: Option<usize> = None;
    for (_, count) in series.range(..=peak_day) {
        days += 1;
        if let Some(prev) = previous {
            let prev = if prev == 0 { 1 } else { prev };
            total_ratio += *count as f64 / prev as f64;
        }
        previous = Some(*count);
    }

    if days < 2 {
        return R_NAUGHT_UNDEFINED;
    }
    let r_naught = total_ratio / (days - 1) as f64;
    tracing::debug!("R0 = {:.4} over {} days up to peak {}", r_naught, days, peak_day);
    r_naught
}

/// All date-based projections of one passenger snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassengerStatistics {
    passenger_count: usize,
    new_infections_per_day: DailySeries,
    total_infections_per_day: DailySeries,
    #[serde(flatten)]
    severity: SeverityBreakdown,
}

impl PassengerStatistics {
    pub fn from_passengers(passengers: &[Passenger]) -> Self {
        let new_infections_per_day = new_infections_per_day(passengers);
        let total_infections_per_day = total_infections_per_day(&new_infections_per_day);
        let dates: Vec<NaiveDate> = new_infections_per_day.keys().copied().collect();
        let severity = SeverityBreakdown::compute(&dates, passengers);

        tracing::info!(
            "📈 Computed statistics for {} passengers over {} days",
            passengers.len(),
            dates.len()
        );

        Self {
            passenger_count: passengers.len(),
            new_infections_per_day,
            total_infections_per_day,
            severity,
        }
    }

    pub fn from_source<S: PassengerSource + ?Sized>(source: &S) -> Self {
        Self::from_passengers(&source.passengers())
    }

    pub fn passenger_count(&self) -> usize {
        self.passenger_count
    }

    pub fn new_infections_per_day(&self) -> &DailySeries {
        &self.new_infections_per_day
    }

    pub fn total_infections_per_day(&self) -> &DailySeries {
        &self.total_infections_per_day
    }

    pub fn severity(&self) -> &SeverityBreakdown {
        &self.severity
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.severity.dates
    }

    pub fn not_infected(&self) -> &[usize] {
        &self.severity.not_infected
    }

    pub fn mild(&self) -> &[usize] {
        &self.severity.mild
    }

    pub fn severe(&self) -> &[usize] {
        &self.severity.severe
    }

    pub fn critical(&self) -> &[usize] {
        &self.severity.critical
    }
}
