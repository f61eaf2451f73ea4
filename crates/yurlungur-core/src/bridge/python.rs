//! Renders bridge requests as standalone Python programs and reads their
//! results back from the interpreter's stdout.

use serde_json::Value;

use super::{Arg, NativeCall, Request, Script};
use crate::{Result, YurlungurError};

/// Variable a [`Script`] body must bind its result to.
pub const RESULT_VAR: &str = "_yr_result";

/// Prefix of the stdout line carrying the JSON-encoded result.
pub const SENTINEL: &str = "@@yurlungur@@";

/// Render a JSON value as a Python literal.
pub fn to_literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_owned(),
        Value::Bool(true) => "True".to_owned(),
        Value::Bool(false) => "False".to_owned(),
        Value::Number(n) => n.to_string(),
        // JSON string escapes are a subset of Python's
        Value::String(_) => value.to_string(),
        Value::Array(items) => {
            let items = items.iter().map(to_literal).collect::<Vec<_>>();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => {
            let entries = map
                .iter()
                .map(|(k, v)| format!("{}: {}", Value::String(k.clone()), to_literal(v)))
                .collect::<Vec<_>>();
            format!("{{{}}}", entries.join(", "))
        }
    }
}

fn render_arg(arg: &Arg) -> String {
    match arg {
        Arg::Value(value) => to_literal(value),
        Arg::Expr(expr) => expr.clone(),
    }
}

/// Render the call expression, e.g. `maya.cmds.ls('a*', type='mesh')`.
pub fn render_call(call: &NativeCall) -> String {
    let args = call
        .args
        .iter()
        .map(render_arg)
        .chain(
            call.kwargs
                .iter()
                .map(|(key, value)| format!("{}={}", key, render_arg(value))),
        )
        .collect::<Vec<_>>();
    format!("{}({})", call.callee, args.join(", "))
}

/// Render a request as a program printing its result after [`SENTINEL`].
pub fn render(request: &Request) -> String {
    let (imports, body) = match request {
        Request::Call(call) => (
            &call.imports,
            vec![format!("{RESULT_VAR} = {}", render_call(call))],
        ),
        Request::Script(Script { imports, body }) => (imports, body.clone()),
    };

    let mut lines = vec!["import json".to_owned()];
    let mut seen = Vec::new();
    for module in imports {
        if !seen.contains(&module) {
            lines.push(format!("import {module}"));
            seen.push(module);
        }
    }
    lines.extend(body);
    lines.push(format!(
        "print({:?} + json.dumps({RESULT_VAR}, default=str))",
        SENTINEL
    ));
    lines.join("\n") + "\n"
}

/// Output of a rendered program, split into the result and everything else the
/// interpreter printed.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub result: Value,
    pub log: Vec<String>,
}

/// Extract the result of a rendered program from the interpreter's stdout.
///
/// If the sentinel is printed more than once, the last one wins.
pub fn parse_output(stdout: &str) -> Result<Output> {
    let mut result = None;
    let mut log = Vec::new();
    for line in stdout.lines() {
        match line.trim_end().strip_prefix(SENTINEL) {
            Some(payload) => result = Some(payload.to_owned()),
            None => log.push(line.to_owned()),
        }
    }

    let payload = result.ok_or_else(|| {
        YurlungurError::Bridge("interpreter exited without reporting a result".to_owned())
    })?;
    Ok(Output {
        result: serde_json::from_str(&payload)?,
        log,
    })
}
