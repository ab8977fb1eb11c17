/// Directory that hosts workflow definitions inside a repository.
pub const WORKFLOWS_PATH: &str = ".github/workflows/";

/// Build a code-search query scoped to an organization's workflow files.
///
/// Narrow mode (default) requires the action identifier to appear as
/// literal text in the file, so the search itself prunes most candidates.
/// Broad mode drops the identifier and matches every `.yml`/`.yaml`
/// workflow file instead, a superset search for when the code-search
/// index misses literal matches.
///
/// The result is a raw query string; URL encoding is left to the
/// transport layer.
pub fn build_search_query(org: &str, action: &str, broad_search: bool) -> String {
    if broad_search {
        format!("org:{org} path:{WORKFLOWS_PATH} filename:.yml OR filename:.yaml")
    } else {
        format!("org:{org} path:{WORKFLOWS_PATH} {action}")
    }
}
