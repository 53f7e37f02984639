//! Dependency scoring between themes.
//!
//! Every theme starts at score 0. Visiting a theme recursively visits its
//! dependencies and lowers each dependency's score by one per visit, so a
//! theme depended upon (directly or transitively) by more themes sorts
//! earlier. Sorting by score, stably, yields an order where every theme
//! comes after everything it depends on, ties keeping declaration order.
//!
//! Dependencies on themes that are not loaded are skipped. An edge that
//! would close a cycle is skipped as well.

use std::collections::HashMap;

use indexmap::IndexMap;

#[cfg(test)]
mod tests;

/// Computes dependency scores for `(theme, dependencies)` pairs in
/// declaration order.
pub fn dependency_scores<'a, I, D>(themes: I) -> IndexMap<String, i64>
where
	I: IntoIterator<Item = (&'a str, D)>,
	D: IntoIterator<Item = &'a str>,
{
	let graph: IndexMap<&str, Vec<&str>> = themes.into_iter().map(|(name, deps)| (name, deps.into_iter().collect())).collect();

	let mut scores: HashMap<&str, i64> = HashMap::new();
	let mut stack = Vec::new();
	for &name in graph.keys() {
		visit(name, &graph, &mut scores, &mut stack);
	}

	graph.keys().map(|&name| (name.to_string(), scores.get(name).copied().unwrap_or(0))).collect()
}

fn visit<'a>(name: &'a str, graph: &IndexMap<&'a str, Vec<&'a str>>, scores: &mut HashMap<&'a str, i64>, stack: &mut Vec<&'a str>) {
	scores.entry(name).or_insert(0);
	let Some(deps) = graph.get(name) else {
		return;
	};

	stack.push(name);
	for &dep in deps {
		if !graph.contains_key(dep) {
			continue;
		}
		if stack.contains(&dep) {
			tracing::warn!(theme = name, dependency = dep, "skipping cyclic theme dependency");
			continue;
		}
		visit(dep, graph, scores, stack);
		*scores.entry(dep).or_insert(0) -= 1;
	}
	stack.pop();
}

/// Theme names ordered for activation: ascending score, ties in
/// declaration order.
pub fn activation_order<'a, I, D>(themes: I) -> Vec<String>
where
	I: IntoIterator<Item = (&'a str, D)>,
	D: IntoIterator<Item = &'a str>,
{
	let mut ordered: Vec<(String, i64)> = dependency_scores(themes).into_iter().collect();
	ordered.sort_by_key(|(_, score)| *score);
	ordered.into_iter().map(|(name, _)| name).collect()
}
