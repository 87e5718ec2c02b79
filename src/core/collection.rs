use std::collections::HashMap;

use crate::core::workload::Workload;

/// Workloads keyed by name in the first-seen order.
#[must_use]
#[derive(Clone, Debug, Default)]
pub struct WorkloadCollection {
    workloads: Vec<Workload>,
    index: HashMap<String, usize>,
}

impl WorkloadCollection {
    #[must_use]
    pub fn len(&self) -> usize {
        self.workloads.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workloads.is_empty()
    }

    #[cfg(test)]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Workload> {
        self.index.get(name).map(|index| &self.workloads[*index])
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Workload> {
        self.workloads
    }

    /// Add the workload, merging it into an existing one with the same name.
    ///
    /// Merged channel series are concatenated, and the value generated is summed up.
    pub fn push(&mut self, workload: Workload) {
        if let Some(index) = self.index.get(&workload.name) {
            let existing = &mut self.workloads[*index];
            existing.loads.a.extend(workload.loads.a);
            existing.loads.b.extend(workload.loads.b);
            existing.loads.c.extend(workload.loads.c);
            existing.value_generated += workload.value_generated;
        } else {
            self.index.insert(workload.name.clone(), self.workloads.len());
            self.workloads.push(workload);
        }
    }
}

impl Extend<Workload> for WorkloadCollection {
    fn extend<T: IntoIterator<Item = Workload>>(&mut self, iter: T) {
        for workload in iter {
            self.push(workload);
        }
    }
}

impl FromIterator<Workload> for WorkloadCollection {
    fn from_iter<T: IntoIterator<Item = Workload>>(iter: T) -> Self {
        let mut this = Self::default();
        this.extend(iter);
        this
    }
}
