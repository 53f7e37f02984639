//! Flattened view of every target and unit across the theme set.

use indexmap::IndexSet;

use crate::{Target, Theme};

/// Address of a unit inside its theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitSlot {
	TopLevel(usize),
	Patch { patch: usize, unit: usize },
}

/// Address of a unit across the theme set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnitRef {
	pub theme: String,
	pub slot: UnitSlot,
}

/// Every target ever referenced and every unit, in theme order.
///
/// Rebuilt whenever the theme set changes; themes are addressed by name so
/// reordering the set does not invalidate it.
#[derive(Debug, Clone, Default)]
pub struct TargetIndex {
	targets: IndexSet<Target>,
	units: Vec<UnitRef>,
}

impl TargetIndex {
	pub fn build(themes: &[Theme]) -> Self {
		let mut index = Self::default();
		for theme in themes {
			for unit in theme.units() {
				index.targets.extend(unit.targets().iter().cloned());
			}
			index.units.extend(theme.unit_slots().into_iter().map(|slot| UnitRef {
				theme: theme.name().to_string(),
				slot,
			}));
		}
		index
	}

	/// Targets in first-seen order.
	pub fn targets(&self) -> impl ExactSizeIterator<Item = &Target> {
		self.targets.iter()
	}

	pub fn contains(&self, target: &Target) -> bool {
		self.targets.contains(target)
	}

	pub fn units(&self) -> &[UnitRef] {
		&self.units
	}
}
