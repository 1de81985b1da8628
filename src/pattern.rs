//! Path-template compilation and positional parameter extraction.
//!
//! A template is compiled once, at registration time, into an anchored
//! regular expression plus the list of parameters it declares:
//!
//! | Template            | Pattern               | Params                |
//! |---------------------|-----------------------|-----------------------|
//! | `/users`            | `^/users(/)?$`        | —                     |
//! | `/users/:id`        | `^/users/[^/]+(/)?$`  | `id` at segment 1     |
//! | `/items/:id(\d+)`   | `^/items/(\d+)(/)?$`  | `id` at segment 1     |
//! | `/static` catch-all | `^/static/.*(/)?$`    | —                     |
//!
//! A parameter's `position` is the index of its *segment* in the template
//! (split on `/` after the leading one), not a capture-group index. Values
//! are recovered later by re-splitting the request path and reading the
//! segment at that position — see [`extract`].
//!
//! Literal segments are emitted into the pattern verbatim, without regex
//! escaping. A `.` in a literal therefore matches any character. This
//! matches the declared template syntax, where segment text is trusted
//! configuration, not untrusted input.

use std::collections::HashMap;

use regex::Regex;

use crate::error::Error;

/// A named path parameter recorded when its template was compiled.
///
/// `position` is the zero-based index of the segment at which the parameter
/// occurs, counting segments of the path split on `/` (leading `/` excluded).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Param {
    pub(crate) name: String,
    pub(crate) position: usize,
}

impl Param {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

/// Compiles a path template into its anchored pattern and parameter list.
///
/// Fails with [`Error::MalformedParam`] when a `(` immediately follows a
/// `:` (a custom expression with an empty parameter name), and with
/// [`Error::InvalidExpr`] when a custom sub-expression does not compile.
pub(crate) fn compile(path: &str, catch_all: bool) -> Result<(Regex, Vec<Param>), Error> {
    let mut body = String::new();
    let mut params = Vec::new();

    if path.contains(':') {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        for (position, segment) in trimmed.split('/').enumerate() {
            body.push('/');
            match segment.strip_prefix(':') {
                Some(declared) => push_param(path, declared, position, &mut body, &mut params)?,
                None => body.push_str(segment),
            }
        }
    } else {
        body.push_str(path);
    }

    if body.ends_with('/') {
        body.pop();
    }

    if catch_all {
        if !body.is_empty() {
            body.push('/');
        }
        body.push_str(".*");
    }

    let regex = Regex::new(&format!("^{body}(/)?$")).map_err(|source| Error::InvalidExpr {
        path: path.to_owned(),
        source,
    })?;
    Ok((regex, params))
}

/// Emits one `:`-prefixed segment. `declared` is the segment text after the
/// colon: either `name` or `name(expr)`.
fn push_param(
    path: &str,
    declared: &str,
    position: usize,
    body: &mut String,
    params: &mut Vec<Param>,
) -> Result<(), Error> {
    match declared.find('(') {
        Some(0) => Err(Error::MalformedParam { path: path.to_owned() }),
        Some(open) => {
            params.push(Param { name: declared[..open].to_owned(), position });
            body.push_str(&declared[open..]);
            Ok(())
        }
        None => {
            // One whole segment, nothing beyond it. A bare `.+` would leak
            // across `/` and swallow deeper paths.
            body.push_str("[^/]+");
            params.push(Param { name: declared.to_owned(), position });
            Ok(())
        }
    }
}

/// Recovers parameter values from a matched request path.
///
/// Deliberately recomputed on every call against the path as it is *now*,
/// not as it was at match time. The cost is fragility: the segment lookup
/// assumes the path still has at least `position + 1` segments and that no
/// custom sub-expression matched across a `/`. A violated assumption is a
/// compiler/matcher inconsistency, so the out-of-bounds index is allowed to
/// panic rather than being reported as a request error.
pub(crate) fn extract(path: &str, params: &[Param]) -> HashMap<String, String> {
    let mut values = HashMap::new();
    if params.is_empty() {
        return values;
    }

    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let segments: Vec<&str> = trimmed.split('/').collect();
    for param in params {
        values.insert(param.name.clone(), segments[param.position].to_owned());
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(path: &str, catch_all: bool) -> Regex {
        compile(path, catch_all).expect("template should compile").0
    }

    #[test]
    fn literal_template_matches_exactly() {
        let re = pattern("/users", false);
        assert!(re.is_match("/users"));
        assert!(re.is_match("/users/"));
        assert!(!re.is_match("/users/42"));
        assert!(!re.is_match("/user"));
        assert!(!re.is_match("/api/users"));
    }

    #[test]
    fn literal_template_trailing_slash_is_normalized() {
        let re = pattern("/users/", false);
        assert!(re.is_match("/users"));
        assert!(re.is_match("/users/"));
        assert!(!re.is_match("/users//"));
    }

    #[test]
    fn named_param_records_segment_position() {
        let (re, params) = compile("/users/:id", false).unwrap();
        assert_eq!(params, vec![Param { name: "id".into(), position: 1 }]);
        assert!(re.is_match("/users/42"));
        assert!(re.is_match("/users/anything"));
        assert!(re.is_match("/users/42/"));
        assert!(!re.is_match("/users"));
        assert!(!re.is_match("/users/42/extra"));
    }

    #[test]
    fn multiple_params_keep_ascending_positions() {
        let (_, params) = compile("/orgs/:org/repos/:repo", false).unwrap();
        assert_eq!(
            params,
            vec![
                Param { name: "org".into(), position: 1 },
                Param { name: "repo".into(), position: 3 },
            ]
        );
    }

    #[test]
    fn custom_expression_is_emitted_verbatim() {
        let (re, params) = compile(r"/items/:id(\d+)", false).unwrap();
        assert_eq!(params, vec![Param { name: "id".into(), position: 1 }]);
        assert!(re.is_match("/items/7"));
        assert!(re.is_match("/items/7/"));
        assert!(!re.is_match("/items/abc"));
        assert!(!re.is_match("/items"));
    }

    #[test]
    fn empty_param_name_before_expression_is_malformed() {
        match compile("/files/:(", false) {
            Err(Error::MalformedParam { path }) => assert_eq!(path, "/files/:("),
            other => panic!("expected MalformedParam, got {other:?}"),
        }
    }

    #[test]
    fn invalid_sub_expression_is_rejected() {
        assert!(matches!(
            compile("/items/:id([)", false),
            Err(Error::InvalidExpr { .. })
        ));
    }

    #[test]
    fn catch_all_matches_any_suffix() {
        let re = pattern("/static", true);
        assert!(re.is_match("/static/"));
        assert!(re.is_match("/static/css/app.css"));
        assert!(re.is_match("/static/a/b/c"));
        assert!(!re.is_match("/statics"));
    }

    #[test]
    fn catch_all_with_param_composes_per_segment() {
        // `:dir` becomes `[^/]+`, then the catch-all suffix is appended:
        // `^/static/[^/]+/.*(/)?$`. The parameter still reads segment 1.
        let (re, params) = compile("/static/:dir", true).unwrap();
        assert_eq!(params, vec![Param { name: "dir".into(), position: 1 }]);
        assert!(re.is_match("/static/css/app.css"));
        assert!(re.is_match("/static/css/"));
        assert!(!re.is_match("/static"));
        let values = extract("/static/css/app.css", &params);
        assert_eq!(values["dir"], "css");
    }

    #[test]
    fn extract_reads_segments_at_recorded_positions() {
        let (_, params) = compile("/orgs/:org/repos/:repo", false).unwrap();
        let values = extract("/orgs/acme/repos/vireo", &params);
        assert_eq!(values.len(), 2);
        assert_eq!(values["org"], "acme");
        assert_eq!(values["repo"], "vireo");
    }

    #[test]
    fn extract_with_no_params_is_empty() {
        assert!(extract("/users/42", &[]).is_empty());
    }

    #[test]
    #[should_panic]
    fn extract_past_the_last_segment_panics() {
        let (_, params) = compile("/a/b/:x", false).unwrap();
        extract("/a", &params);
    }
}
