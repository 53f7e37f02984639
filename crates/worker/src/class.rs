/// Execution classes used to tag spawned work in traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// The periodic drift check and repair loop.
	Reconcile,
	/// Catalog fetches that can overlap other startup work.
	Fetch,
}

impl TaskClass {
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Reconcile => "reconcile",
			Self::Fetch => "fetch",
		}
	}
}
