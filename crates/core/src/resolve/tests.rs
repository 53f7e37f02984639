use pretty_assertions::assert_eq;

use super::*;

fn graph<'a>(edges: &'a [(&'a str, &'a [&'a str])]) -> impl Iterator<Item = (&'a str, Vec<&'a str>)> + 'a {
	edges.iter().map(|(name, deps)| (*name, deps.to_vec()))
}

fn position(order: &[String], name: &str) -> usize {
	order.iter().position(|n| n == name).unwrap()
}

#[test]
fn chain_scores_count_dependents() {
	let scores = dependency_scores(graph(&[("A", &["B"]), ("B", &["C"]), ("C", &[])]));
	assert_eq!(scores["A"], 0);
	assert_eq!(scores["B"], -1);
	assert_eq!(scores["C"], -2);
}

#[test]
fn dependencies_activate_first() {
	let edges: &[(&str, &[&str])] = &[("App", &["Base", "Icons"]), ("Icons", &["Base"]), ("Extra", &[]), ("Base", &[])];
	let order = activation_order(graph(edges));

	for (name, deps) in edges {
		for dep in *deps {
			assert!(position(&order, dep) < position(&order, name), "{dep} must precede {name} in {order:?}");
		}
	}
}

#[test]
fn ties_keep_declaration_order() {
	let order = activation_order(graph(&[("Zeta", &[]), ("Alpha", &[]), ("Mid", &[])]));
	assert_eq!(order, ["Zeta", "Alpha", "Mid"]);
}

#[test]
fn missing_dependencies_are_skipped() {
	let scores = dependency_scores(graph(&[("A", &["NotInstalled"])]));
	assert_eq!(scores.len(), 1);
	assert_eq!(scores["A"], 0);
}

#[test]
fn cycles_terminate() {
	let order = activation_order(graph(&[("A", &["B"]), ("B", &["A"])]));
	assert_eq!(order.len(), 2);
}
