mod adapter;
pub mod bridge;
mod detect;
mod error;
mod host;
mod hosts;
mod log_bridge;
mod proxy;
mod session;

pub use adapter::{HostAdapter, Options, Severity, Verb};
pub use bridge::{Arg, HostBridge, NativeCall, Request, Script};
pub use detect::{detect, use_host, ModuleLoader, ProcessEnv, MODULES_ENV};
pub use error::{Result, YurlungurError};
pub use host::HostKind;
pub use hosts::Standalone;
pub use log_bridge::HostLogLayer;
pub use proxy::{Command, Direction, File, FileTarget, Format, Logger, Node};
pub use session::HostSession;
