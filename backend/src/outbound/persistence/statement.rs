//! Rendering of Diesel statements into the text reported with store errors.

use std::fmt::Write as _;

use diesel::pg::Pg;
use diesel::query_builder::QueryFragment;

const BINDS_MARKER: &str = " -- binds: ";

/// Render the parameterised SQL of `statement`, without its bind values.
///
/// Bind values are dropped so submitted passwords never appear in error
/// payloads or logs. A statement Diesel cannot render yields whatever text
/// was produced before the failure.
pub(crate) fn statement_text<T>(statement: &T) -> String
where
    T: QueryFragment<Pg>,
{
    let mut rendered = String::new();
    if write!(rendered, "{}", diesel::debug_query::<Pg, _>(statement)).is_err() {
        return rendered;
    }
    match rendered.split_once(BINDS_MARKER) {
        Some((sql, _binds)) => sql.to_owned(),
        None => rendered,
    }
}
