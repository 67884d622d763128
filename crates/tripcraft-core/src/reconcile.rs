//! Budget reconciler
//!
//! Combines the generation service's per-category budget estimate with the
//! ledger's actual category sums into a single side-by-side comparison.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{CategoryBudget, CategorySummary, ExpenseCategory};

/// One row of the comparison view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryComparison {
    pub category: String,
    pub estimated: f64,
    pub actual: f64,
}

/// AI-estimated vs. actual spend, per category and in total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetComparison {
    pub per_category: Vec<CategoryComparison>,
    pub total_estimated: f64,
    pub total_actual: f64,
}

/// Reconcile an AI budget estimate against actual category sums
///
/// The category set is the union of both sides; a category present on only
/// one side reports 0 for the other. Ordering is stable for chart coloring:
/// canonical [`ExpenseCategory`] order first, then unrecognized categories
/// in first-seen order (estimate side before actual side). The estimate's
/// English budget keys fold onto the canonical Chinese labels.
///
/// Totals are the estimate's own `total` field and the ledger sum; the
/// model is single-currency, so no conversion or rounding happens here.
pub fn reconcile(budget: &CategoryBudget, actual: &CategorySummary) -> BudgetComparison {
    let estimated = normalize_categories(budget);
    let actuals: Vec<(String, f64)> = actual
        .iter()
        .map(|(name, sum)| (canonical_name(name), sum))
        .collect();

    let mut per_category = Vec::new();

    for category in ExpenseCategory::all() {
        let name = category.as_str();
        let est = lookup(&estimated, name);
        let act = lookup(&actuals, name);
        if est.is_some() || act.is_some() {
            per_category.push(CategoryComparison {
                category: name.to_string(),
                estimated: est.unwrap_or(0.0),
                actual: act.unwrap_or(0.0),
            });
        }
    }

    for (name, _) in estimated.iter().chain(actuals.iter()) {
        if ExpenseCategory::from_str(name).is_ok() {
            continue;
        }
        if per_category.iter().any(|c| &c.category == name) {
            continue;
        }
        per_category.push(CategoryComparison {
            category: name.clone(),
            estimated: lookup(&estimated, name).unwrap_or(0.0),
            actual: lookup(&actuals, name).unwrap_or(0.0),
        });
    }

    BudgetComparison {
        per_category,
        total_estimated: budget.total,
        total_actual: actual.total(),
    }
}

/// Fold the estimate's keys onto canonical labels, keeping wire order
fn normalize_categories(budget: &CategoryBudget) -> Vec<(String, f64)> {
    let mut normalized: Vec<(String, f64)> = Vec::with_capacity(budget.categories().len());
    for (name, amount) in budget.categories() {
        let key = canonical_name(name);
        match normalized.iter_mut().find(|(n, _)| *n == key) {
            Some((_, sum)) => *sum += amount,
            None => normalized.push((key, *amount)),
        }
    }
    normalized
}

fn canonical_name(name: &str) -> String {
    ExpenseCategory::from_str(name)
        .map(|c| c.as_str().to_string())
        .unwrap_or_else(|_| name.to_string())
}

fn lookup(pairs: &[(String, f64)], name: &str) -> Option<f64> {
    pairs.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget(total: f64, categories: &[(&str, f64)]) -> CategoryBudget {
        CategoryBudget::new(
            total,
            categories
                .iter()
                .map(|(name, amount)| (name.to_string(), *amount))
                .collect(),
        )
    }

    fn summary(entries: &[(&str, f64)]) -> CategorySummary {
        let mut s = CategorySummary::new();
        for (name, amount) in entries {
            s.add(name, *amount);
        }
        s
    }

    #[test]
    fn test_reconcile_union_and_order() {
        let comparison = reconcile(
            &budget(500.0, &[("交通", 200.0), ("餐饮", 300.0)]),
            &summary(&[("交通", 150.0), ("购物", 20.0)]),
        );

        let rows: Vec<(&str, f64, f64)> = comparison
            .per_category
            .iter()
            .map(|c| (c.category.as_str(), c.estimated, c.actual))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("交通", 200.0, 150.0),
                ("餐饮", 300.0, 0.0),
                ("购物", 0.0, 20.0),
            ]
        );
        assert_eq!(comparison.total_estimated, 500.0);
        assert_eq!(comparison.total_actual, 170.0);
    }

    #[test]
    fn test_reconcile_folds_english_budget_keys() {
        let comparison = reconcile(
            &budget(
                90000.0,
                &[("transport", 10000.0), ("hotel", 40000.0), ("food", 15000.0)],
            ),
            &summary(&[("交通", 12000.0)]),
        );

        assert_eq!(comparison.per_category[0].category, "交通");
        assert_eq!(comparison.per_category[0].estimated, 10000.0);
        assert_eq!(comparison.per_category[0].actual, 12000.0);
        assert_eq!(comparison.per_category[1].category, "住宿");
        assert_eq!(comparison.per_category[2].category, "餐饮");
    }

    #[test]
    fn test_reconcile_unrecognized_first_seen_order() {
        let comparison = reconcile(
            &budget(100.0, &[("签证", 60.0), ("交通", 40.0)]),
            &summary(&[("小费", 5.0), ("签证", 55.0)]),
        );

        let names: Vec<&str> = comparison
            .per_category
            .iter()
            .map(|c| c.category.as_str())
            .collect();
        // Canonical category first, then estimate-side unknown, then
        // actual-side unknown
        assert_eq!(names, vec!["交通", "签证", "小费"]);
        assert_eq!(comparison.per_category[1].estimated, 60.0);
        assert_eq!(comparison.per_category[1].actual, 55.0);
        assert_eq!(comparison.per_category[2].estimated, 0.0);
        assert_eq!(comparison.per_category[2].actual, 5.0);
    }

    #[test]
    fn test_reconcile_empty_sides() {
        let comparison = reconcile(&CategoryBudget::default(), &CategorySummary::new());
        assert!(comparison.per_category.is_empty());
        assert_eq!(comparison.total_estimated, 0.0);
        assert_eq!(comparison.total_actual, 0.0);
    }

    #[test]
    fn test_reconcile_is_pure() {
        let b = budget(500.0, &[("交通", 200.0)]);
        let s = summary(&[("交通", 150.0)]);
        assert_eq!(reconcile(&b, &s), reconcile(&b, &s));
    }
}
