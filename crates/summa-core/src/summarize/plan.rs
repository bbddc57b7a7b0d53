use crate::{
    error::SummarizeError,
    obs::trace::PlanFingerprint,
    relation::{ColumnExpr, Filter, GroupColumn, GroupedFetch, Relation, SelectItem},
    summarize::request::AggregationRequest,
};

///
/// BatchPlan
///
/// The single combined fetch answering every registered request, plus the
/// layout needed to split its rows back out.
///
/// Row layout: `[base groups.., request sub-groups.., request values..]`.
///

#[derive(Clone, Debug)]
pub struct BatchPlan {
    fetch: GroupedFetch,
    base_width: usize,
    group_width: usize,
    positions: Vec<Vec<usize>>,
}

impl BatchPlan {
    /// Plan the combined fetch for `requests` over `base`.
    ///
    /// Every request is validated against the base shape before anything
    /// else happens; a mismatch is fatal and names the incompatible parts.
    pub fn build(base: &Relation, requests: &[AggregationRequest]) -> Result<Self, SummarizeError> {
        for request in requests {
            base.check_compatible(request.relation())?;
        }

        // base groups stay verbatim, duplicates included
        let mut groups: Vec<GroupColumn> = base.groups().to_vec();
        let base_width = groups.len();

        let mut extra: Vec<&GroupColumn> = Vec::new();
        for column in requests.iter().flat_map(AggregationRequest::sub_groups) {
            if !extra.iter().any(|seen| seen.expr == column.expr) {
                extra.push(column);
            }
        }
        groups.extend(extra.into_iter().cloned());

        let positions = requests
            .iter()
            .map(|request| {
                request
                    .sub_groups()
                    .iter()
                    .map(|column| position_of(&groups, &column.expr))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let base_filter = base.filter_clauses();
        let filter = if requests.is_empty() {
            base_filter.to_predicate()
        } else {
            Filter::any_of(requests.iter().map(AggregationRequest::filter))
        };

        let mut projection: Vec<SelectItem> = groups
            .iter()
            .map(|column| SelectItem::column(column.expr.clone()))
            .collect();
        for (index, request) in requests.iter().enumerate() {
            projection.push(SelectItem::aggregate(
                request.select_expression(base_filter),
                format!("agg_{index}"),
            ));
        }

        let fetch = GroupedFetch {
            entity: base.entity(),
            joins: base.joins().to_vec(),
            filter,
            projection,
            group_by: (1..=groups.len()).collect(),
        };

        Ok(Self {
            fetch,
            base_width,
            group_width: groups.len(),
            positions,
        })
    }

    #[must_use]
    pub const fn fetch(&self) -> &GroupedFetch {
        &self.fetch
    }

    /// Number of base grouping columns leading each row.
    #[must_use]
    pub const fn base_width(&self) -> usize {
        self.base_width
    }

    /// Number of grouping columns (base and request) leading each row.
    #[must_use]
    pub const fn group_width(&self) -> usize {
        self.group_width
    }

    #[must_use]
    pub fn request_count(&self) -> usize {
        self.positions.len()
    }

    /// Positions of one request's sub-group columns within each row.
    #[must_use]
    pub fn positions(&self, request: usize) -> &[usize] {
        self.positions.get(request).map_or(&[], Vec::as_slice)
    }

    /// True when there is nothing to fetch: no requests and no grouping.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.group_width == 0
    }

    #[must_use]
    pub fn to_sql(&self) -> String {
        self.fetch.to_sql()
    }

    #[must_use]
    pub fn fingerprint(&self) -> PlanFingerprint {
        PlanFingerprint::from_sql(&self.to_sql())
    }
}

// First occurrence within the combined groups; every sub-group column is
// present by construction.
fn position_of(groups: &[GroupColumn], expr: &ColumnExpr) -> Result<usize, SummarizeError> {
    groups
        .iter()
        .position(|column| &column.expr == expr)
        .ok_or_else(|| SummarizeError::invariant("sub-group column missing from combined groups"))
}
