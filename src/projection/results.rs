//! Result store for a projection run
//!
//! One history per registered variable, one entry per evaluated period,
//! plus the synthesized `total` series and the list of formatted dates.

use crate::error::Result;
use crate::variables::{Projection, Value, VariableKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io;

/// Name of the synthesized per-period total series
pub const TOTAL: &str = "total";

/// One period's result for a derived variable (or the total)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultEntry {
    pub current: f64,
    /// Running sum of `current` from the first period through this one
    pub sum: f64,
    /// `sum / (period + 1)`
    pub average: f64,
}

impl ResultEntry {
    pub fn get(&self, projection: Projection) -> f64 {
        match projection {
            Projection::Current => self.current,
            Projection::Sum => self.sum,
            Projection::Average => self.average,
        }
    }
}

/// Append `current` to an aggregated history, carrying the running sum forward
pub(crate) fn push_aggregate(history: &mut Vec<ResultEntry>, current: f64) -> ResultEntry {
    let previous_sum = history.last().map(|e| e.sum).unwrap_or(0.0);
    let sum = previous_sum + current;
    let entry = ResultEntry {
        current,
        sum,
        average: sum / (history.len() + 1) as f64,
    };
    history.push(entry);
    entry
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum History {
    /// Internal and external variables: raw values only
    Raw(Vec<Value>),
    /// Derived variables: current/sum/average triples
    Aggregated(Vec<ResultEntry>),
}

impl History {
    pub fn len(&self) -> usize {
        match self {
            History::Raw(v) => v.len(),
            History::Aggregated(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at `index`, applying `projection` only to aggregated histories
    pub fn read(&self, index: usize, projection: Projection) -> Option<Value> {
        match self {
            History::Raw(v) => v.get(index).cloned(),
            History::Aggregated(v) => v.get(index).map(|e| Value::Number(e.get(projection))),
        }
    }
}

/// A named variable history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub kind: VariableKind,
    #[serde(skip)]
    pub hidden: bool,
    pub history: History,
}

impl Series {
    pub(crate) fn raw(name: &str, kind: VariableKind, periods: usize) -> Self {
        Self {
            name: name.to_string(),
            kind,
            hidden: false,
            history: History::Raw(Vec::with_capacity(periods)),
        }
    }

    pub(crate) fn aggregated(name: &str, hidden: bool, periods: usize) -> Self {
        Self {
            name: name.to_string(),
            kind: VariableKind::Derived,
            hidden,
            history: History::Aggregated(Vec::with_capacity(periods)),
        }
    }

    /// Append a raw value; only internal and external series hold raw histories
    pub(crate) fn push_raw(&mut self, value: Value) {
        match &mut self.history {
            History::Raw(values) => values.push(value),
            History::Aggregated(_) => {
                debug_assert!(false, "raw value pushed to derived series '{}'", self.name)
            }
        }
    }

    /// Append a derived result; `None` if this series holds raw values
    pub(crate) fn push_aggregate(&mut self, current: f64) -> Option<ResultEntry> {
        match &mut self.history {
            History::Aggregated(entries) => Some(push_aggregate(entries, current)),
            History::Raw(_) => {
                debug_assert!(false, "derived result pushed to raw series '{}'", self.name);
                None
            }
        }
    }
}

/// Completed results of one `run()`
#[derive(Debug, Clone)]
pub struct ResultStore {
    periods: u32,
    series: Vec<Series>,
    index: HashMap<String, usize>,
    total: Vec<ResultEntry>,
    dates: Vec<String>,
}

impl ResultStore {
    pub(crate) fn new(periods: u32, series: Vec<Series>) -> Self {
        let index = series
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name.clone(), i))
            .collect();
        Self {
            periods,
            series,
            index,
            total: Vec::with_capacity(periods as usize),
            dates: Vec::new(),
        }
    }

    pub(crate) fn series_mut(&mut self, position: usize) -> &mut Series {
        &mut self.series[position]
    }

    pub(crate) fn series_at(&self, position: usize) -> &Series {
        &self.series[position]
    }

    pub(crate) fn push_total(&mut self, current: f64) -> ResultEntry {
        push_aggregate(&mut self.total, current)
    }

    pub(crate) fn set_dates(&mut self, dates: Vec<String>) {
        self.dates = dates;
    }

    pub fn periods(&self) -> u32 {
        self.periods
    }

    pub fn get(&self, name: &str) -> Option<&Series> {
        self.index.get(name).map(|&i| &self.series[i])
    }

    /// Raw history of an internal or external variable
    pub fn raw(&self, name: &str) -> Option<&[Value]> {
        match &self.get(name)?.history {
            History::Raw(values) => Some(values),
            History::Aggregated(_) => None,
        }
    }

    /// Aggregated history of a derived variable, or of `total`
    pub fn aggregated(&self, name: &str) -> Option<&[ResultEntry]> {
        if name == TOTAL {
            return Some(&self.total);
        }
        match &self.get(name)?.history {
            History::Aggregated(entries) => Some(entries),
            History::Raw(_) => None,
        }
    }

    pub fn total(&self) -> &[ResultEntry] {
        &self.total
    }

    /// Formatted period dates, empty when no date sequence is configured
    pub fn dates(&self) -> &[String] {
        &self.dates
    }

    /// All series in registration order (internal, external, derived)
    pub fn series(&self) -> impl Iterator<Item = &Series> {
        self.series.iter()
    }

    /// Series that are not marked hidden
    pub fn visible(&self) -> impl Iterator<Item = &Series> {
        self.series.iter().filter(|s| !s.hidden)
    }

    /// Final running aggregates per visible derived variable and for the total
    pub fn summary(&self) -> ProjectionSummary {
        let variables = self
            .visible()
            .filter_map(|s| match &s.history {
                History::Aggregated(entries) => entries.last().map(|last| VariableSummary {
                    name: s.name.clone(),
                    final_current: last.current,
                    sum: last.sum,
                    average: last.average,
                }),
                History::Raw(_) => None,
            })
            .collect();

        let last_total = self.total.last().copied().unwrap_or_default();
        ProjectionSummary {
            periods: self.periods,
            total_sum: last_total.sum,
            total_average: last_total.average,
            variables,
        }
    }

    pub fn to_report(&self) -> ResultReport<'_> {
        ResultReport {
            periods: self.periods,
            dates: &self.dates,
            variables: self.visible().collect(),
            total: &self.total,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_report())?)
    }

    /// Write one CSV row per period with every visible series
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        let visible: Vec<&Series> = self.visible().collect();

        let mut header = vec!["period".to_string()];
        for s in &visible {
            match s.history {
                History::Raw(_) => header.push(s.name.clone()),
                History::Aggregated(_) => {
                    header.push(s.name.clone());
                    header.push(format!("{}_sum", s.name));
                    header.push(format!("{}_avg", s.name));
                }
            }
        }
        header.extend([TOTAL.to_string(), format!("{}_sum", TOTAL), format!("{}_avg", TOTAL)]);
        csv.write_record(&header)?;

        for period in 0..self.periods as usize {
            let mut record = vec![(period + 1).to_string()];
            for s in &visible {
                match &s.history {
                    History::Raw(values) => {
                        record.push(values.get(period).map(|v| v.to_string()).unwrap_or_default());
                    }
                    History::Aggregated(entries) => {
                        let e = entries.get(period).copied().unwrap_or_default();
                        record.extend([e.current.to_string(), e.sum.to_string(), e.average.to_string()]);
                    }
                }
            }
            let t = self.total.get(period).copied().unwrap_or_default();
            record.extend([t.current.to_string(), t.sum.to_string(), t.average.to_string()]);
            csv.write_record(&record)?;
        }

        csv.flush().map_err(|e| crate::error::ProjectionError::Export(e.to_string()))?;
        Ok(())
    }
}

/// Serializable view of a result store (hidden variables omitted)
#[derive(Debug, Serialize)]
pub struct ResultReport<'a> {
    pub periods: u32,
    pub dates: &'a [String],
    pub variables: Vec<&'a Series>,
    pub total: &'a [ResultEntry],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableSummary {
    pub name: String,
    pub final_current: f64,
    pub sum: f64,
    pub average: f64,
}

/// Summary statistics for a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub periods: u32,
    pub total_sum: f64,
    pub total_average: f64,
    pub variables: Vec<VariableSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn store() -> ResultStore {
        let mut store = ResultStore::new(
            3,
            vec![
                Series::raw("periodNumber", VariableKind::Internal, 3),
                Series::aggregated("rent", false, 3),
                Series::aggregated("fees", true, 3),
            ],
        );
        for (p, (rent, fees)) in [(100.0, 1.0), (110.0, 1.0), (121.0, 1.0)].into_iter().enumerate() {
            store.series_mut(0).push_raw(Value::Number((p + 1) as f64));
            store.series_mut(1).push_aggregate(rent);
            store.series_mut(2).push_aggregate(fees);
            store.push_total(rent + fees);
        }
        store
    }

    #[test]
    fn test_running_aggregates() {
        let mut history = Vec::new();
        push_aggregate(&mut history, 4.0);
        push_aggregate(&mut history, 6.0);
        let last = push_aggregate(&mut history, 2.0);

        assert_relative_eq!(last.sum, 12.0);
        assert_relative_eq!(last.average, 4.0);
        assert_relative_eq!(history[1].average, 5.0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "raw value pushed to derived series 'rent'")]
    fn test_raw_push_into_derived_series_panics() {
        Series::aggregated("rent", false, 1).push_raw(Value::Number(1.0));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "derived result pushed to raw series 'rate'")]
    fn test_aggregate_push_into_raw_series_panics() {
        Series::raw("rate", VariableKind::External, 1).push_aggregate(1.0);
    }

    #[test]
    fn test_matching_pushes_grow_history() {
        let mut derived = Series::aggregated("rent", false, 2);
        assert_eq!(derived.push_aggregate(5.0).map(|e| e.sum), Some(5.0));
        let mut raw = Series::raw("rate", VariableKind::External, 2);
        raw.push_raw(Value::Number(0.01));
        assert_eq!(derived.history.len(), 1);
        assert_eq!(raw.history.len(), 1);
    }

    #[test]
    fn test_queries() {
        let store = store();
        assert_eq!(store.raw("periodNumber").unwrap().len(), 3);
        assert!(store.raw("rent").is_none());
        assert_relative_eq!(store.aggregated("rent").unwrap()[2].sum, 331.0);
        assert_relative_eq!(store.aggregated(TOTAL).unwrap()[0].current, 101.0);
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn test_summary_skips_hidden() {
        let summary = store().summary();
        assert_eq!(summary.variables.len(), 1);
        assert_eq!(summary.variables[0].name, "rent");
        assert_relative_eq!(summary.total_sum, 334.0);
        assert_relative_eq!(summary.total_average, 334.0 / 3.0);
    }

    #[test]
    fn test_csv_export() {
        let mut buf = Vec::new();
        store().write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next(),
            Some("period,periodNumber,rent,rent_sum,rent_avg,total,total_sum,total_avg")
        );
        assert_eq!(lines.next(), Some("1,1,100,100,100,101,101,101"));
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn test_json_report_omits_hidden() {
        let json = store().to_json().unwrap();
        assert!(json.contains("\"rent\""));
        assert!(!json.contains("\"fees\""));
    }
}
