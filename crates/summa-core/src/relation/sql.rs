//! SQL text rendering for explain output and plan fingerprints.
//!
//! Rendering is deterministic and dialect-neutral; it is never executed by
//! this crate.

use crate::{
    model::{AssociationKind, EntityModel},
    relation::{
        Join, JoinKind,
        expr::{AggregateExpr, ColumnExpr},
        fetch::{GroupedFetch, SelectExpr, SelectItem},
        predicate::{CompareOp, ComparePredicate, Predicate},
    },
    value::Value,
};
use std::fmt::Write as _;

impl GroupedFetch {
    /// Render this fetch as SQL text.
    #[must_use]
    pub fn to_sql(&self) -> String {
        let table = self.entity.table;
        let mut sql = String::from("SELECT ");

        let projection: Vec<String> = self
            .projection
            .iter()
            .map(|item| render_select_item(table, item))
            .collect();
        sql.push_str(&projection.join(", "));

        let _ = write!(sql, " FROM {table}");
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&render_join(self.entity, join));
        }

        if self.filter != Predicate::True {
            let _ = write!(sql, " WHERE {}", render_predicate(table, &self.filter));
        }

        if !self.group_by.is_empty() {
            let ordinals: Vec<String> = self.group_by.iter().map(ToString::to_string).collect();
            let _ = write!(sql, " GROUP BY {}", ordinals.join(", "));
        }

        sql
    }
}

fn render_select_item(table: &str, item: &SelectItem) -> String {
    let expr = match &item.expr {
        SelectExpr::Column(expr) => render_column(table, expr),
        SelectExpr::Aggregate(agg) => render_aggregate(table, agg),
    };

    match &item.alias {
        Some(alias) => format!("{expr} AS {alias}"),
        None => expr,
    }
}

fn render_join(entity: &EntityModel, join: &Join) -> String {
    let keyword = match join.kind {
        JoinKind::Inner => "INNER JOIN",
        JoinKind::LeftOuter => "LEFT OUTER JOIN",
    };
    let assoc = join.association;
    let target = assoc.target;
    let on = match assoc.kind {
        AssociationKind::BelongsTo { foreign_key } => format!(
            "{}.{} = {}.{foreign_key}",
            assoc.name, target.primary_key, entity.table
        ),
        AssociationKind::HasMany { foreign_key } => format!(
            "{}.{foreign_key} = {}.{}",
            assoc.name, entity.table, entity.primary_key
        ),
    };

    format!("{keyword} {} AS {} ON {on}", target.table, assoc.name)
}

fn render_aggregate(table: &str, agg: &AggregateExpr) -> String {
    format!("{}({})", agg.func.sql(), render_column(table, &agg.arg))
}

fn render_column(table: &str, expr: &ColumnExpr) -> String {
    match expr {
        ColumnExpr::Field(name) if name.contains('.') => name.clone(),
        ColumnExpr::Field(name) => format!("{table}.{name}"),
        ColumnExpr::Literal(value) => render_value(value),
        ColumnExpr::Length(inner) => format!("LENGTH({})", render_column(table, inner)),
        ColumnExpr::Case {
            when,
            then,
            otherwise,
        } => format!(
            "CASE WHEN {} THEN {} ELSE {} END",
            render_predicate(table, when),
            render_column(table, then),
            render_column(table, otherwise)
        ),
    }
}

fn render_predicate(table: &str, predicate: &Predicate) -> String {
    match predicate {
        Predicate::True => "TRUE".to_string(),
        Predicate::False => "FALSE".to_string(),
        Predicate::And(children) => render_junction(table, children, " AND ", "TRUE"),
        Predicate::Or(children) => render_junction(table, children, " OR ", "FALSE"),
        Predicate::Not(inner) => format!("NOT ({})", render_predicate(table, inner)),
        Predicate::Compare(cmp) => render_compare(table, cmp),
        Predicate::IsNull(expr) => format!("{} IS NULL", render_column(table, expr)),
    }
}

fn render_junction(table: &str, children: &[Predicate], sep: &str, empty: &str) -> String {
    if children.is_empty() {
        return empty.to_string();
    }

    let parts: Vec<String> = children
        .iter()
        .map(|child| format!("({})", render_predicate(table, child)))
        .collect();
    parts.join(sep)
}

fn render_compare(table: &str, cmp: &ComparePredicate) -> String {
    let column = render_column(table, &cmp.expr);
    match (cmp.op, &cmp.value) {
        (CompareOp::In | CompareOp::NotIn, Value::List(values)) => {
            let values: Vec<String> = values.iter().map(render_value).collect();
            format!("{column} {} ({})", cmp.op.sql(), values.join(", "))
        }
        (op, value) => format!("{column} {} {}", op.sql(), render_value(value)),
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(v) => if *v { "TRUE" } else { "FALSE" }.to_string(),
        Value::Int(v) => v.to_string(),
        Value::Float64(v) => v.to_string(),
        Value::Text(v) => format!("'{}'", v.replace('\'', "''")),
        Value::List(values) => {
            let values: Vec<String> = values.iter().map(render_value).collect();
            format!("({})", values.join(", "))
        }
        Value::Map(_) => "NULL".to_string(),
    }
}
