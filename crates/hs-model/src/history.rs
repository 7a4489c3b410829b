//! Append-only model history and its terminal conversion to series.

use hs_core::{Column, Complex64, HsError, Series, ValueKind, read_complex};

use crate::error::ModelResult;
use crate::layout::Layout;
use crate::subsystem::Subsystem;

/// Column name of the switching-state series.
pub const SWITCHING_STATE: &str = "q_abc";

/// Samples appended by [`Model::save`](crate::Model::save).
///
/// Rows are stored flat: row `k` of the state matrix is
/// `x[k * dim..(k + 1) * dim]`. Time is non-decreasing; an instant can repeat
/// where one switching sub-interval ends and the next begins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelHistory {
    dim: usize,
    t: Vec<f64>,
    x: Vec<f64>,
    q: Vec<[f64; 3]>,
}

impl ModelHistory {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            ..Self::default()
        }
    }

    /// Append samples, each tagged with the held switching state `q`.
    pub fn extend(&mut self, t: &[f64], states: &[f64], q: [f64; 3]) -> ModelResult<()> {
        if states.len() != t.len() * self.dim {
            return Err(HsError::IndexOob {
                what: "history rows vs state dimension",
                index: states.len(),
                len: t.len() * self.dim,
            }
            .into());
        }
        if let (Some(&last), Some(&first)) = (self.t.last(), t.first()) {
            if first < last {
                return Err(HsError::Invariant {
                    what: "history time must be non-decreasing",
                }
                .into());
            }
        }
        self.t.extend_from_slice(t);
        self.x.extend_from_slice(states);
        self.q.extend(std::iter::repeat_n(q, t.len()));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn t(&self) -> &[f64] {
        &self.t
    }

    /// State vector of sample `k`.
    pub fn row(&self, k: usize) -> Option<&[f64]> {
        (k < self.t.len()).then(|| &self.x[k * self.dim..(k + 1) * self.dim])
    }

    pub fn last_row(&self) -> Option<&[f64]> {
        self.t.len().checked_sub(1).and_then(|k| self.row(k))
    }

    pub fn switching_states(&self) -> &[[f64; 3]] {
        &self.q
    }

    pub(crate) fn post_process(
        &self,
        subsystems: &[Box<dyn Subsystem>],
        layout: &Layout,
    ) -> ModelResult<ModelSeries> {
        let n = self.t.len();
        let mut switching = Series::new(self.t.clone());
        switching.insert(SWITCHING_STATE, Column::Abc(self.q.clone()))?;

        let mut per_subsystem = Vec::with_capacity(subsystems.len());
        for (slot, sub) in subsystems.iter().enumerate() {
            let mut series = Series::new(self.t.clone());
            let mut offset = layout.state_range(slot).start;
            for spec in sub.states() {
                let column = match spec.kind {
                    ValueKind::Real => {
                        Column::Real((0..n).map(|k| self.x[k * self.dim + offset]).collect())
                    }
                    ValueKind::Complex => Column::Complex(
                        (0..n)
                            .map(|k| read_complex(&self.x, k * self.dim + offset))
                            .collect::<Vec<Complex64>>(),
                    ),
                    ValueKind::Abc => Column::Abc(
                        (0..n)
                            .map(|k| {
                                let base = k * self.dim + offset;
                                [self.x[base], self.x[base + 1], self.x[base + 2]]
                            })
                            .collect(),
                    ),
                };
                series.insert(spec.name, column)?;
                offset += spec.kind.slots();
            }
            per_subsystem.push((sub.name().to_string(), series));
        }

        Ok(ModelSeries {
            switching,
            subsystems: per_subsystem,
        })
    }
}

/// Random-access history of every subsystem, keyed by subsystem name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelSeries {
    /// Held switching state on the model's time base.
    pub switching: Series,
    subsystems: Vec<(String, Series)>,
}

impl ModelSeries {
    pub fn get(&self, subsystem: &str) -> Option<&Series> {
        self.subsystems
            .iter()
            .find(|(n, _)| n == subsystem)
            .map(|(_, s)| s)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.subsystems.iter().map(|(n, _)| n.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extend_checks_row_length() {
        let mut h = ModelHistory::new(2);
        assert!(h.extend(&[0.0], &[1.0], [0.0; 3]).is_err());
        h.extend(&[0.0, 0.5], &[1.0, 2.0, 3.0, 4.0], [1.0, 0.0, 0.0])
            .unwrap();
        assert_eq!(h.len(), 2);
        assert_eq!(h.row(1), Some(&[3.0, 4.0][..]));
        assert_eq!(h.last_row(), Some(&[3.0, 4.0][..]));
        assert_eq!(h.switching_states(), &[[1.0, 0.0, 0.0]; 2]);
    }

    #[test]
    fn repeated_instant_is_kept() {
        let mut h = ModelHistory::new(1);
        h.extend(&[0.0, 1.0], &[0.0, 1.0], [0.0; 3]).unwrap();
        h.extend(&[1.0, 2.0], &[1.0, 2.0], [1.0; 3]).unwrap();
        assert_eq!(h.t(), &[0.0, 1.0, 1.0, 2.0]);
        assert!(h.extend(&[1.5], &[0.0], [0.0; 3]).is_err());
    }
}
