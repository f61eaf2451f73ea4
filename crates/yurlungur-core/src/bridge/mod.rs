//! The seam between yurlungur and a host-owned scripting runtime.
//!
//! Adapters never talk to a host directly. They describe what they want as a
//! [`Request`] and hand it to a [`HostBridge`], which is responsible for getting
//! the request evaluated by the host's interpreter, wherever that lives:
//!
//! ```no_run
//! use std::sync::Arc;
//! use yurlungur_core::{Arg, HostBridge, NativeCall, Request};
//!
//! fn list_selection(bridge: Arc<dyn HostBridge>) -> yurlungur_core::Result<()> {
//!     let call = NativeCall::new("maya.cmds", "maya.cmds.ls").kwarg("selection", true);
//!     let value = bridge.eval(&Request::Call(call))?;
//!     println!("{value}");
//!     Ok(())
//! }
//! ```

pub mod python;

use serde_json::Value;

use crate::Result;

/// An argument passed to a native call.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// A plain value, rendered as a literal.
    Value(Value),
    /// A raw expression in the host's language, e.g. an enum token like
    /// `hou.severityType.Error`.
    Expr(String),
}

impl Arg {
    pub fn expr(expr: impl Into<String>) -> Arg {
        Arg::Expr(expr.into())
    }
}

macro_rules! impl_arg_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Arg {
                fn from(value: $ty) -> Self {
                    Arg::Value(value.into())
                }
            }
        )*
    };
}

impl_arg_from!(Value, bool, i32, i64, u32, f64, String, &str, Vec<String>, Vec<Value>);

/// A single call of a native function.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeCall {
    /// Modules that must be imported before the call
    pub imports: Vec<String>,
    /// Fully qualified expression naming the callable
    pub callee: String,
    pub args: Vec<Arg>,
    pub kwargs: Vec<(String, Arg)>,
}

impl NativeCall {
    pub fn new(import: impl Into<String>, callee: impl Into<String>) -> Self {
        Self {
            imports: vec![import.into()],
            callee: callee.into(),
            args: Vec::new(),
            kwargs: Vec::new(),
        }
    }

    pub fn import(mut self, module: impl Into<String>) -> Self {
        self.imports.push(module.into());
        self
    }

    pub fn arg(mut self, arg: impl Into<Arg>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn kwarg(mut self, key: impl Into<String>, value: impl Into<Arg>) -> Self {
        self.kwargs.push((key.into(), value.into()));
        self
    }
}

/// A multi-statement snippet. The body must bind its result to
/// [`python::RESULT_VAR`].
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub imports: Vec<String>,
    pub body: Vec<String>,
}

impl Script {
    pub fn new<I, S>(imports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            imports: imports.into_iter().map(Into::into).collect(),
            body: Vec::new(),
        }
    }

    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.body.push(line.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Call(NativeCall),
    Script(Script),
}

impl Request {
    /// The request as a script binding [`python::RESULT_VAR`], so setup lines
    /// can be placed in front of it.
    pub fn into_script(self) -> Script {
        match self {
            Request::Call(call) => Script {
                body: vec![format!(
                    "{} = {}",
                    python::RESULT_VAR,
                    python::render_call(&call)
                )],
                imports: call.imports,
            },
            Request::Script(script) => script,
        }
    }
}

impl From<NativeCall> for Request {
    fn from(call: NativeCall) -> Self {
        Request::Call(call)
    }
}

impl From<Script> for Request {
    fn from(script: Script) -> Self {
        Request::Script(script)
    }
}

/// Evaluates requests inside a host's scripting runtime.
pub trait HostBridge: Send + Sync {
    /// Evaluate a request and return its result as JSON.
    fn eval(&self, request: &Request) -> Result<Value>;

    /// Run raw source in the host's interpreter, returning its captured output.
    fn shell(&self, source: &str) -> Result<String>;

    /// Whether requests run inside this process's own host runtime. Bridges
    /// that start a host process per request return `false`.
    fn in_process(&self) -> bool {
        false
    }
}
