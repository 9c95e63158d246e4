use crate::config::FailurePolicy;
use crate::cycle::errors::CycleError;
use crate::cycle::types::ResultRow;
use crate::fetch::{Character, FetchError};
use crate::roster::RosterMember;

/// Apply the failure policy to one cycle's fetch results.
///
/// `Strict` turns the first failure into a cycle error and yields no rows.
/// `Partial` yields one row per result, marking failures unavailable.
pub fn collect_rows(
    results: Vec<(RosterMember, Result<Character, FetchError>)>,
    policy: FailurePolicy,
) -> Result<Vec<ResultRow>, CycleError> {
    let mut rows = Vec::with_capacity(results.len());

    for (member, result) in results {
        match result {
            Ok(character) => rows.push(ResultRow::from(character)),
            Err(e) => match policy {
                FailurePolicy::Strict => return Err(CycleError::from(e)),
                FailurePolicy::Partial => {
                    rows.push(ResultRow::unavailable(&member.id, &member.name, e.to_string()))
                }
            },
        }
    }

    Ok(rows)
}

/// Sort rows by name, then id, so ties render in a stable order.
pub fn sort_rows(rows: &mut [ResultRow]) {
    rows.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
}
