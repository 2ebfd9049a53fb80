pub use pgrepo_core::GENERATED_HEADER;

use crate::{Fn, Param, rust_file::string_literal};

/// Common use statement helpers for generated files.
pub mod uses {
    use crate::Use;

    /// `use super::runtime::{...};`
    pub fn runtime<'a>(symbols: impl IntoIterator<Item = &'a str>) -> Use {
        Use::new("super::runtime").symbols(symbols)
    }
}

mod entity_rs;
mod mod_rs;
mod queries_rs;
mod runtime_rs;

pub use entity_rs::EntityRs;
pub use mod_rs::{ModRs, RetryDefaults};
pub use queries_rs::QueriesRs;
pub use runtime_rs::RuntimeRs;

/// Type of the cancellation argument on retrying methods.
const CANCEL_TYPE: &str = "&tokio_util::sync::CancellationToken";

/// Name used in error values; raw identifier prefix removed.
fn operation_name(method: &str) -> &str {
    method.trim_start_matches("r#")
}

/// `const NAME: &str = "...";`
fn sql_const(name: &str, sql: &str) -> String {
    format!("const {}: &str = {};", name, string_literal(sql))
}

/// `<method>_with_retry`: the same parameters plus a cancellation token.
///
/// `args` are the expressions passed to `method` on every attempt.
fn retry_variant(
    method: &str,
    retry_method: &str,
    params: Vec<Param>,
    args: &[String],
    returns: &str,
) -> Fn {
    Fn::new(retry_method)
        .doc(format!(
            "[`Self::{}`] with retries on transient failures.",
            operation_name(method)
        ))
        .async_()
        .param(Param::self_ref())
        .params(params)
        .param(Param::new("cancel", CANCEL_TYPE))
        .returns(returns)
        .body(format!(
            "with_retry(&self.retry, cancel, \"{}\", ENTITY, || self.{}({}))\n    .await",
            operation_name(method),
            method,
            args.join(", ")
        ))
}
