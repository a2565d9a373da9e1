//! Shared repository utilities.

use sqlx::{Postgres, QueryBuilder};

/// Appends WHERE or AND depending on whether a clause was already added.
pub fn push_clause(builder: &mut QueryBuilder<'_, Postgres>, has_clause: &mut bool) {
    if *has_clause {
        builder.push(" AND ");
    } else {
        builder.push(" WHERE ");
        *has_clause = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_clause_switches_between_where_and_and() {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT 1");
        let mut has_clause = false;

        push_clause(&mut builder, &mut has_clause);
        builder.push("a = 1");
        assert!(has_clause);

        push_clause(&mut builder, &mut has_clause);
        builder.push("b = 2");

        assert_eq!(builder.sql(), "SELECT 1 WHERE a = 1 AND b = 2");
    }
}
