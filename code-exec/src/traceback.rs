use rhai::{EvalAltResult, ParseError, Position};
use std::fmt::Write;

const HEADER: &str = "Traceback (most recent call last):";
const TOP_LEVEL: &str = "<script>";

/// Renders a runtime error as a trace, one frame per nested function call,
/// outermost first, each followed by the offending source line when known.
pub fn format_traceback(err: &EvalAltResult, script: &str) -> String {
    let mut frames = Vec::new();
    let mut scope = TOP_LEVEL.to_string();
    let mut current = err;

    loop {
        match current {
            EvalAltResult::ErrorInFunctionCall(name, _source, inner, pos) => {
                frames.push((scope, *pos));
                scope = format!("function `{}`", name);
                current = inner.as_ref();
            }
            EvalAltResult::ErrorInModule(path, inner, pos) => {
                frames.push((scope, *pos));
                scope = format!("module `{}`", path);
                current = inner.as_ref();
            }
            innermost => {
                // Some native failures carry no position; point at the call site instead.
                let pos = match innermost.position() {
                    pos if pos.is_none() => frames.last().map_or(pos, |(_, outer)| *outer),
                    pos => pos,
                };
                frames.push((scope, pos));
                break;
            }
        }
    }

    render(&frames, script, &current.to_string())
}

/// Renders a compile error as a single-frame trace.
pub(crate) fn format_parse_traceback(err: &ParseError, script: &str) -> String {
    render(&[(TOP_LEVEL.to_string(), err.1)], script, &err.to_string())
}

/// The innermost error of a nested call chain
pub(crate) fn root_cause(err: &EvalAltResult) -> &EvalAltResult {
    match err {
        EvalAltResult::ErrorInFunctionCall(_, _, inner, _) => root_cause(inner),
        EvalAltResult::ErrorInModule(_, inner, _) => root_cause(inner),
        other => other,
    }
}

fn render(frames: &[(String, Position)], script: &str, message: &str) -> String {
    let mut out = String::from(HEADER);

    for (scope, pos) in frames {
        match (pos.line(), pos.position()) {
            (Some(line), Some(column)) => {
                let _ = write!(out, "\n  line {}, column {}, in {}", line, column, scope);
            }
            (Some(line), None) => {
                let _ = write!(out, "\n  line {}, in {}", line, scope);
            }
            _ => {
                let _ = write!(out, "\n  in {}", scope);
                continue;
            }
        }
        if let Some(source) = pos.line().and_then(|line| source_line(script, line)) {
            let _ = write!(out, "\n    {}", source);
        }
    }

    let _ = write!(out, "\n{}", message);
    out
}

// Function-body positions are relative to the same script text.
fn source_line(script: &str, line: usize) -> Option<&str> {
    script
        .lines()
        .nth(line.checked_sub(1)?)
        .map(str::trim)
        .filter(|l| !l.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rhai::Engine;

    // Operator errors only carry a position with fast operators off, as in `create_engine`.
    fn engine() -> Engine {
        let mut engine = Engine::new();
        engine.set_fast_operators(false);
        engine
    }

    #[test]
    fn test_top_level_error_has_single_frame() {
        let script = "let a = 1;\nlet b = a / 0;";
        let err = engine().run(script).unwrap_err();

        let trace = format_traceback(&err, script);
        assert!(trace.starts_with(HEADER));
        assert!(trace.contains("line 2"));
        assert!(trace.contains("let b = a / 0;"));
        assert!(trace.contains("in <script>"));
    }

    #[test]
    fn test_nested_calls_produce_frames() {
        let script = "fn inner(x) {\n    x / 0\n}\nfn outer(x) { inner(x) }\nouter(3);";
        let err = engine().run(script).unwrap_err();

        let trace = format_traceback(&err, script);
        assert!(trace.contains("in function `outer`"));
        assert!(trace.contains("in function `inner`"));
        assert!(trace.contains("x / 0"));

        let cause = root_cause(&err);
        assert!(!matches!(cause, EvalAltResult::ErrorInFunctionCall(..)));
    }

    #[test]
    fn test_missing_position_falls_back_to_call_site() {
        let script = "fn fail() {\n    throw 1;\n}\nfail();";
        let inner = EvalAltResult::ErrorArithmetic("Division by zero".into(), Position::NONE);
        let err = EvalAltResult::ErrorInFunctionCall(
            "fail".into(),
            String::new(),
            inner.into(),
            Position::new(4, 1),
        );

        let trace = format_traceback(&err, script);
        assert!(trace.contains("line 4, column 1, in function `fail`"));
        assert!(trace.ends_with("Division by zero"));
    }

    #[test]
    fn test_parse_error_trace() {
        let script = "let x = ;";
        let err = Engine::new().compile(script).unwrap_err();

        let trace = format_parse_traceback(&err, script);
        assert!(trace.contains("line 1"));
        assert!(trace.contains("let x = ;"));
    }
}
