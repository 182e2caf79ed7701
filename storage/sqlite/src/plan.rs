//! Reading `EXPLAIN QUERY PLAN` output
//!
//! Each plan row carries a `detail` string such as:
//!
//! - `SCAN users`
//! - `SEARCH users USING INDEX idx_users_name (name=?)`
//! - `SEARCH users USING COVERING INDEX idx_users_name_state_id (name=? AND state_id=?)`
//! - `SEARCH users USING INTEGER PRIMARY KEY (rowid=?)`
//!
//! Older SQLite releases print `SCAN TABLE users` / `SEARCH TABLE users`.

use seedbench_core::AccessPath;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessStep {
    pub access_path: AccessPath,
    pub index_name: Option<String>,
}

/// Classifies one detail line if it reads `table`.
pub fn classify_detail(detail: &str, table: &str) -> Option<AccessStep> {
    let mut words = detail.split_whitespace();
    let verb = words.next()?;
    let mut subject = words.next()?;
    if subject == "TABLE" {
        subject = words.next()?;
    }
    if subject != table {
        return None;
    }
    let rest: Vec<&str> = words.collect();

    let index_after = |marker: &[&str]| -> Option<String> {
        rest.windows(marker.len()).position(|w| w == marker).and_then(|at| rest.get(at + marker.len())).map(|name| name.to_string())
    };

    let step = match verb {
        "SCAN" => AccessStep {
            access_path: AccessPath::FullScan,
            index_name: index_after(&["COVERING", "INDEX"]).or_else(|| index_after(&["USING", "INDEX"])),
        },
        "SEARCH" => {
            if let Some(index) = index_after(&["COVERING", "INDEX"]) {
                AccessStep { access_path: AccessPath::CoveringIndexLookup, index_name: Some(index) }
            } else if let Some(index) = index_after(&["USING", "INDEX"]) {
                AccessStep { access_path: AccessPath::NonCoveringIndexLookup, index_name: Some(index) }
            } else if rest.windows(2).any(|w| w == ["PRIMARY", "KEY"]) {
                AccessStep { access_path: AccessPath::NonCoveringIndexLookup, index_name: Some("PRIMARY KEY".to_owned()) }
            } else {
                AccessStep { access_path: AccessPath::Other(detail.to_owned()), index_name: None }
            }
        }
        _ => return None,
    };
    Some(step)
}

/// First plan row that touches `table`.
pub fn access_step<'a>(details: impl IntoIterator<Item = &'a str>, table: &str) -> Option<AccessStep> {
    details.into_iter().find_map(|detail| classify_detail(detail, table))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_scan() {
        let step = classify_detail("SCAN users", "users").unwrap();
        assert_eq!(step.access_path, AccessPath::FullScan);
        assert_eq!(step.index_name, None);

        assert_eq!(classify_detail("SCAN TABLE users", "users").unwrap().access_path, AccessPath::FullScan);
    }

    #[test]
    fn test_index_lookups() {
        let step = classify_detail("SEARCH users USING INDEX idx_users_name (name=?)", "users").unwrap();
        assert_eq!(step.access_path, AccessPath::NonCoveringIndexLookup);
        assert_eq!(step.index_name.as_deref(), Some("idx_users_name"));

        let step = classify_detail("SEARCH users USING COVERING INDEX idx_users_name_state_id (name=? AND state_id=?)", "users").unwrap();
        assert_eq!(step.access_path, AccessPath::CoveringIndexLookup);
        assert_eq!(step.index_name.as_deref(), Some("idx_users_name_state_id"));

        let step = classify_detail("SEARCH TABLE users USING INTEGER PRIMARY KEY (rowid=?)", "users").unwrap();
        assert_eq!(step.access_path, AccessPath::NonCoveringIndexLookup);
    }

    #[test]
    fn test_other_tables_and_rows_are_ignored() {
        assert_eq!(classify_detail("SCAN orders", "users"), None);
        assert_eq!(classify_detail("USE TEMP B-TREE FOR ORDER BY", "users"), None);

        let details = ["USE TEMP B-TREE FOR ORDER BY", "SEARCH users USING INDEX idx_users_state_id (state_id=?)"];
        let step = access_step(details, "users").unwrap();
        assert_eq!(step.index_name.as_deref(), Some("idx_users_state_id"));
    }
}
