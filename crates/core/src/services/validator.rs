//! Pagination argument validation.
//!
//! Runs before any data access. Rules are checked in order and the first
//! failing rule wins; each failure emits one warning line through the
//! engine's [`DiagnosticSink`].

use serde_json::Value;

use crate::error::{Argument, PaginationError, PaginationResult, MAX_PAGE_SIZE};
use crate::ports::{DiagnosticSink, Limit, LoadContext, PageRequest, PaginationArgs, Record};

use super::cursor;

/// Validate raw arguments for a connection over `R`.
pub fn validate<R: Record>(
    args: PaginationArgs,
    ctx: &LoadContext,
    sink: &dyn DiagnosticSink,
) -> PaginationResult<PageRequest> {
    let audit = |what: String| {
        sink.warn(&format!(
            "User: {} attempted {} for: {}.",
            ctx.user, what, ctx.caller
        ));
    };

    let (argument, raw) = match (&args.first, &args.last) {
        (None, None) => {
            audit("to paginate without `first` or `last` arguments".to_string());
            return Err(PaginationError::MissingLimit);
        }
        (Some(_), Some(_)) => {
            audit("to have `first` and `last` arguments set".to_string());
            return Err(PaginationError::ConflictingLimits);
        }
        (Some(first), None) => (Argument::First, first),
        (None, Some(last)) => (Argument::Last, last),
    };

    let value = match as_integer(raw) {
        Ok(v) => v,
        Err(found) => {
            audit(format!("to have {argument} set as a {found}"));
            return Err(PaginationError::InvalidLimitType { argument, found });
        }
    };

    if value < 0 {
        audit(format!("to have {argument} set below zero"));
        return Err(PaginationError::NegativeLimit { argument, value });
    }

    if value > i64::from(MAX_PAGE_SIZE) {
        audit(format!("to have {argument} set to {value}"));
        return Err(PaginationError::LimitExceeded {
            argument,
            value,
            max: MAX_PAGE_SIZE,
        });
    }

    // Bounded by MAX_PAGE_SIZE above.
    let n = value as u32;
    let limit = match argument {
        Argument::First => Limit::First(n),
        _ => Limit::Last(n),
    };

    let mut keys = [None, None];
    for (slot, (argument, raw)) in keys
        .iter_mut()
        .zip([(Argument::After, &args.after), (Argument::Before, &args.before)])
    {
        if let Some(raw) = raw {
            match cursor::decode_key(raw, R::TYPE_NAME) {
                Ok(key) => *slot = Some(key),
                Err(source) => {
                    audit(format!("to use a malformed {argument} cursor ({source})"));
                    return Err(PaginationError::MalformedCursor { argument, source });
                }
            }
        }
    }
    let [after, before] = keys;

    if let Some(order) = &args.order_by {
        if !R::ORDER_FIELDS.contains(&order.field.as_str()) {
            audit(format!("to order by unknown field `{}`", order.field));
            return Err(PaginationError::UnknownOrderField {
                field: order.field.clone(),
            });
        }
    }

    Ok(PageRequest {
        limit,
        after,
        before,
        order_by: args.order_by,
    })
}

/// Integer value of a limit, or the runtime type name when it is not one.
///
/// Floats with no fractional part count as integers; out-of-range values
/// saturate so the range rules still reject them.
fn as_integer(value: &Value) -> Result<i64, &'static str> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else if n.is_u64() {
                Ok(i64::MAX)
            } else {
                match n.as_f64() {
                    Some(f) if f.is_finite() && f.fract() == 0.0 => Ok(f as i64),
                    _ => Err("float"),
                }
            }
        }
        Value::Null => Err("null"),
        Value::Bool(_) => Err("boolean"),
        Value::String(_) => Err("string"),
        Value::Array(_) => Err("array"),
        Value::Object(_) => Err("object"),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::CursorError;
    use crate::models::GuidanceTag;
    use crate::ports::testing::RecordingSink;
    use crate::ports::{OrderBy, OrderDirection};
    use crate::services::cursor::encode;

    fn ctx() -> LoadContext {
        LoadContext::new("123", "loadGuidanceTagConnections")
    }

    fn run(args: PaginationArgs) -> (PaginationResult<PageRequest>, RecordingSink) {
        let sink = RecordingSink::default();
        let result = validate::<GuidanceTag>(args, &ctx(), &sink);
        (result, sink)
    }

    fn with_first(v: Value) -> PaginationArgs {
        PaginationArgs {
            first: Some(v),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_limit() {
        let (result, sink) = run(PaginationArgs::default());
        assert!(matches!(result, Err(PaginationError::MissingLimit)));
        assert_eq!(
            sink.warnings(),
            ["User: 123 attempted to paginate without `first` or `last` arguments for: loadGuidanceTagConnections."]
        );
    }

    // Test critique: first + last toujours refusé, même avec des valeurs invalides
    #[test]
    fn test_conflicting_limits_win_over_other_rules() {
        let args = PaginationArgs {
            first: Some(json!("abc")),
            last: Some(json!(-5)),
            after: Some("garbage".into()),
            ..Default::default()
        };
        let (result, sink) = run(args);
        assert!(matches!(result, Err(PaginationError::ConflictingLimits)));
        assert_eq!(sink.warnings().len(), 1);
    }

    #[test]
    fn test_non_integer_limits_report_runtime_type() {
        let cases = [
            (json!("123"), "string"),
            (json!({}), "object"),
            (json!([]), "array"),
            (Value::Null, "null"),
            (json!(true), "boolean"),
            (json!(1.5), "float"),
        ];
        for (value, expected) in cases {
            let (result, sink) = run(with_first(value));
            match result {
                Err(PaginationError::InvalidLimitType { argument, found }) => {
                    assert_eq!(argument, Argument::First);
                    assert_eq!(found, expected);
                }
                other => panic!("expected InvalidLimitType, got {other:?}"),
            }
            assert!(sink.warnings()[0].contains(&format!("set as a {expected}")));
        }
    }

    #[test]
    fn test_limit_boundaries() {
        assert!(matches!(
            run(PaginationArgs::first(-1)).0,
            Err(PaginationError::NegativeLimit { value: -1, .. })
        ));
        assert!(matches!(
            run(PaginationArgs::last(101)).0,
            Err(PaginationError::LimitExceeded {
                argument: Argument::Last,
                value: 101,
                max: 100
            })
        ));
        assert_eq!(run(PaginationArgs::first(0)).0.unwrap().limit, Limit::First(0));
        assert_eq!(run(PaginationArgs::last(100)).0.unwrap().limit, Limit::Last(100));
    }

    #[test]
    fn test_whole_floats_and_huge_values() {
        assert_eq!(run(with_first(json!(10.0))).0.unwrap().limit, Limit::First(10));
        assert!(matches!(
            run(with_first(json!(u64::MAX))).0,
            Err(PaginationError::LimitExceeded { .. })
        ));
    }

    #[test]
    fn test_cursors_are_decoded_to_keys() {
        let args = PaginationArgs::first(5)
            .after(encode("guidanceTag", "dmarc1").value)
            .before(encode("guidanceTag", "dmarc9").value);
        let request = run(args).0.unwrap();
        assert_eq!(request.after.as_deref(), Some("dmarc1"));
        assert_eq!(request.before.as_deref(), Some("dmarc9"));
    }

    #[test]
    fn test_foreign_cursor_is_malformed() {
        let args = PaginationArgs::first(5).before(encode("spf", "x").value);
        let (result, sink) = run(args);
        match result {
            Err(PaginationError::MalformedCursor { argument, source }) => {
                assert_eq!(argument, Argument::Before);
                assert!(matches!(source, CursorError::TypeMismatch { .. }));
            }
            other => panic!("expected MalformedCursor, got {other:?}"),
        }
        assert!(sink.warnings()[0].contains("malformed `before` cursor"));
    }

    #[test]
    fn test_unknown_order_field() {
        let args = PaginationArgs::first(5).order_by(OrderBy::new("password", OrderDirection::Asc));
        let (result, sink) = run(args);
        assert!(matches!(result, Err(PaginationError::UnknownOrderField { .. })));
        assert!(sink.warnings()[0].contains("unknown field `password`"));

        let args = PaginationArgs::first(5).order_by(OrderBy::new("tagName", OrderDirection::Desc));
        assert!(run(args).0.is_ok());
    }

    #[test]
    fn test_success_emits_no_diagnostics() {
        let (result, sink) = run(PaginationArgs::first(20));
        assert!(result.is_ok());
        assert!(sink.warnings().is_empty());
    }
}
