//! Fingering providers — map a pitch name to a diagram.
//!
//! A pitch with no mapping (e.g. below the instrument's range) simply gets
//! no diagram; lookups never fail.

mod chart;

use std::collections::HashMap;

use crate::model::FingeringDiagram;

pub use chart::{Hole, HoleChart, HolePattern};

pub trait FingeringProvider {
    fn lookup(&self, pitch_name: &str) -> Option<FingeringDiagram>;
}

impl<P: FingeringProvider + ?Sized> FingeringProvider for &P {
    fn lookup(&self, pitch_name: &str) -> Option<FingeringDiagram> {
        (**self).lookup(pitch_name)
    }
}

impl<P: FingeringProvider + ?Sized> FingeringProvider for Box<P> {
    fn lookup(&self, pitch_name: &str) -> Option<FingeringDiagram> {
        (**self).lookup(pitch_name)
    }
}

/// Fixed set of prepared diagrams keyed by pitch name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FingeringTable {
    diagrams: HashMap<String, FingeringDiagram>,
}

impl FingeringTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, diagram: FingeringDiagram) {
        self.diagrams.insert(diagram.pitch_name.clone(), diagram);
    }

    pub fn len(&self) -> usize {
        self.diagrams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagrams.is_empty()
    }
}

impl FromIterator<FingeringDiagram> for FingeringTable {
    fn from_iter<I: IntoIterator<Item = FingeringDiagram>>(iter: I) -> Self {
        let mut table = FingeringTable::new();
        for diagram in iter {
            table.insert(diagram);
        }
        table
    }
}

impl FingeringProvider for FingeringTable {
    fn lookup(&self, pitch_name: &str) -> Option<FingeringDiagram> {
        self.diagrams.get(pitch_name).cloned()
    }
}
