//! Translation of a [`VisibilityPredicate`] into a parameterised SQL `WHERE`
//! fragment.
//!
//! The fragment uses anonymous `?` placeholders, so it must be bound with its
//! own [`SqlFragment::params`] in order and must not be mixed with numbered
//! placeholders in the same statement.

use muni_core::visibility::{LocationClause, VisibilityPredicate};

/// A boolean SQL expression plus the values for its placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlFragment {
  pub sql:    String,
  pub params: Vec<i64>,
}

/// Render `predicate` against the location columns of table `alias`
/// (`zone_id`, `division_id`, `district_id`, `town_id`).
pub fn predicate_sql(predicate: &VisibilityPredicate, alias: &str) -> SqlFragment {
  let clauses = match predicate {
    VisibilityPredicate::Unrestricted => {
      return SqlFragment { sql: "1 = 1".to_owned(), params: Vec::new() };
    }
    VisibilityPredicate::Restricted { clauses } => clauses,
  };

  let mut params = Vec::new();
  let mut disjuncts = vec![format!(
    "({alias}.zone_id IS NULL AND {alias}.division_id IS NULL \
     AND {alias}.district_id IS NULL AND {alias}.town_id IS NULL)"
  )];

  for clause in clauses {
    match clause {
      // An empty zone set matches nothing.
      LocationClause::Zone(zones) if zones.is_empty() => {}
      LocationClause::Zone(zones) => {
        let marks = vec!["?"; zones.len()].join(", ");
        disjuncts.push(format!("{alias}.zone_id IN ({marks})"));
        params.extend(zones.iter().map(|z| z.get()));
      }
      LocationClause::Division(id) => {
        disjuncts.push(format!("{alias}.division_id = ?"));
        params.push(id.get());
      }
      LocationClause::District(id) => {
        disjuncts.push(format!("{alias}.district_id = ?"));
        params.push(id.get());
      }
      LocationClause::Town(id) => {
        disjuncts.push(format!("{alias}.town_id = ?"));
        params.push(id.get());
      }
    }
  }

  SqlFragment { sql: format!("({})", disjuncts.join(" OR ")), params }
}
