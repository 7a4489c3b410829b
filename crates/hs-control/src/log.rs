//! Append-only per-group signal logging.
//!
//! Rows are stored as they come; the column layout of each group is only
//! checked and built by the terminal [`SignalLog::into_tables`] pass.

use hs_core::{Column, Series, Value};

use crate::error::{ControlError, ControlResult};
use crate::signal::SignalGroup;

#[derive(Debug, Clone, Default)]
struct GroupLog {
    name: &'static str,
    t: Vec<f64>,
    rows: Vec<Vec<(&'static str, Value)>>,
}

/// Log of every signal group recorded by a control loop.
#[derive(Debug, Clone, Default)]
pub struct SignalLog {
    groups: Vec<GroupLog>,
}

impl SignalLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one row of `group` sampled at controller time `t`.
    pub fn record<G: SignalGroup>(&mut self, t: f64, group: &G) {
        let log = match self.groups.iter().position(|g| g.name == G::GROUP) {
            Some(i) => &mut self.groups[i],
            None => {
                self.groups.push(GroupLog {
                    name: G::GROUP,
                    ..GroupLog::default()
                });
                let last = self.groups.len() - 1;
                &mut self.groups[last]
            }
        };
        log.t.push(t);
        log.rows.push(group.signals());
    }

    /// Number of rows recorded for a group.
    pub fn len(&self, group: &str) -> usize {
        self.groups
            .iter()
            .find(|g| g.name == group)
            .map_or(0, |g| g.t.len())
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.t.is_empty())
    }

    /// Convert every group into a random-access series.
    ///
    /// Each row must carry the same field names and kinds as the group's
    /// first row.
    pub fn into_tables(self) -> ControlResult<ControlTables> {
        let mut groups = Vec::with_capacity(self.groups.len());
        for log in self.groups {
            let series = group_series(&log)?;
            groups.push((log.name.to_string(), series));
        }
        Ok(ControlTables { groups })
    }
}

fn group_series(log: &GroupLog) -> ControlResult<Series> {
    let mut series = Series::new(log.t.clone());
    let Some(first) = log.rows.first() else {
        return Ok(series);
    };

    let mut columns: Vec<Column> = first
        .iter()
        .map(|(_, v)| Column::with_kind(v.kind(), log.rows.len()))
        .collect();

    for (step, row) in log.rows.iter().enumerate() {
        if row.len() != first.len() {
            return Err(ControlError::SchemaMismatch {
                group: log.name.to_string(),
                step,
                what: format!("{} fields, expected {}", row.len(), first.len()),
            });
        }
        for ((name, value), (expected, column)) in row.iter().zip(first.iter().zip(&mut columns)) {
            if name != &expected.0 {
                return Err(ControlError::SchemaMismatch {
                    group: log.name.to_string(),
                    step,
                    what: format!("field '{name}' where '{}' was logged before", expected.0),
                });
            }
            column.push(name, *value).map_err(|_| ControlError::SchemaMismatch {
                group: log.name.to_string(),
                step,
                what: format!("field '{name}' changed kind"),
            })?;
        }
    }

    for ((name, _), column) in first.iter().zip(columns) {
        series.insert(*name, column)?;
    }
    Ok(series)
}

/// Random-access control signal history, one series per group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlTables {
    groups: Vec<(String, Series)>,
}

impl ControlTables {
    pub fn get(&self, group: &str) -> Option<&Series> {
        self.groups
            .iter()
            .find(|(n, _)| n == group)
            .map(|(_, s)| s)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(n, _)| n.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hs_core::Complex64;

    struct Fbk {
        w: f64,
        i: Complex64,
    }

    impl SignalGroup for Fbk {
        const GROUP: &'static str = "fbk";
        fn signals(&self) -> Vec<(&'static str, Value)> {
            vec![("w", self.w.into()), ("i", self.i.into())]
        }
    }

    /// Shape depends on the data, which a well-formed group never does.
    struct Ragged(usize);

    impl SignalGroup for Ragged {
        const GROUP: &'static str = "ragged";
        fn signals(&self) -> Vec<(&'static str, Value)> {
            match self.0 {
                0 => vec![("a", Value::Real(0.0))],
                1 => vec![("a", Value::Abc([0.0; 3]))],
                _ => vec![("b", Value::Real(0.0))],
            }
        }
    }

    #[test]
    fn rows_become_columns() {
        let mut log = SignalLog::new();
        log.record(0.0, &Fbk { w: 1.0, i: Complex64::new(0.0, 1.0) });
        log.record(0.1, &Fbk { w: 2.0, i: Complex64::new(1.0, 0.0) });
        assert_eq!(log.len("fbk"), 2);

        let tables = log.into_tables().unwrap();
        let fbk = tables.get("fbk").unwrap();
        assert_eq!(fbk.t, vec![0.0, 0.1]);
        assert_eq!(fbk.get("w").and_then(Column::as_real), Some(&[1.0, 2.0][..]));
        assert_eq!(
            fbk.get("i").and_then(Column::as_complex).map(|c| c[1]),
            Some(Complex64::new(1.0, 0.0))
        );
    }

    #[test]
    fn kind_change_is_rejected() {
        let mut log = SignalLog::new();
        log.record(0.0, &Ragged(0));
        log.record(1.0, &Ragged(1));
        let err = log.into_tables().unwrap_err();
        assert!(matches!(err, ControlError::SchemaMismatch { step: 1, .. }));
    }

    #[test]
    fn renamed_field_is_rejected() {
        let mut log = SignalLog::new();
        log.record(0.0, &Ragged(0));
        log.record(1.0, &Ragged(2));
        assert!(log.into_tables().is_err());
    }

    #[test]
    fn empty_log_has_no_tables() {
        let log = SignalLog::new();
        assert!(log.is_empty());
        let tables = log.into_tables().unwrap();
        assert_eq!(tables.names().count(), 0);
    }
}
