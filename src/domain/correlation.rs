use crate::domain::table::FeatureColumn;
use serde::Serialize;

/// Square, symmetric Pearson matrix indexed by column.
///
/// `None` entries are undefined (too few pairwise-complete observations or a
/// constant side) and must never be read as zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    columns: Vec<FeatureColumn>,
    values: Vec<Vec<Option<f64>>>,
    observations: Vec<Vec<usize>>,
}

impl CorrelationMatrix {
    pub(crate) fn new(
        columns: Vec<FeatureColumn>,
        values: Vec<Vec<Option<f64>>>,
        observations: Vec<Vec<usize>>,
    ) -> Self {
        Self {
            columns,
            values,
            observations,
        }
    }

    pub fn columns(&self) -> &[FeatureColumn] {
        &self.columns
    }

    pub fn size(&self) -> usize {
        self.columns.len()
    }

    fn index_of(&self, column: FeatureColumn) -> Option<usize> {
        self.columns.iter().position(|c| *c == column)
    }

    /// Entry for a pair; `None` if either column is absent or the entry is undefined.
    pub fn get(&self, a: FeatureColumn, b: FeatureColumn) -> Option<f64> {
        let (i, j) = (self.index_of(a)?, self.index_of(b)?);
        self.values[i][j]
    }

    /// Pairwise-complete observation count behind an entry.
    pub fn observations(&self, a: FeatureColumn, b: FeatureColumn) -> Option<usize> {
        let (i, j) = (self.index_of(a)?, self.index_of(b)?);
        Some(self.observations[i][j])
    }

    pub fn row(&self, i: usize) -> &[Option<f64>] {
        &self.values[i]
    }

    /// Undefined entries of the upper triangle, diagonal included.
    pub fn undefined_pairs(&self) -> Vec<(FeatureColumn, FeatureColumn)> {
        let mut pairs = Vec::new();
        for i in 0..self.columns.len() {
            for j in i..self.columns.len() {
                if self.values[i][j].is_none() {
                    pairs.push((self.columns[i], self.columns[j]));
                }
            }
        }
        pairs
    }
}
