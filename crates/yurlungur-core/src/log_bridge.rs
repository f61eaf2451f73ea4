use std::{cell::Cell, fmt};

use tracing::{
    field::{Field, Visit},
    Event, Subscriber,
};
use tracing_subscriber::{layer::Context, Layer};

use crate::{HostSession, Severity};

const TARGET_PREFIX: &str = "yurlungur";

thread_local! {
    static FORWARDING: Cell<bool> = const { Cell::new(false) };
}

/// A [`Layer`] that mirrors this crate's own log events into the host
/// application's native log (the script editor, the console, the status bar).
///
/// Only events whose target starts with `yurlungur` are forwarded. Events
/// emitted while forwarding are dropped so a host call that logs cannot recurse.
/// Failures of the host log call, including a severity the host has no call
/// for, are ignored.
pub struct HostLogLayer {
    session: HostSession,
}

impl HostLogLayer {
    /// Forward to `session` unconditionally.
    pub fn new(session: HostSession) -> Self {
        Self { session }
    }

    /// A layer for `session` if its host runtime lives in this process.
    /// Standalone and out-of-process sessions get `None`.
    pub fn for_session(session: &HostSession) -> Option<Self> {
        (session.is_in_process() && !session.is_standalone()).then(|| Self::new(session.clone()))
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: Vec<String>,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields.join(" ")
        } else {
            format!("{} {}", self.message, self.fields.join(" "))
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_owned();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }
}

impl<S: Subscriber> Layer<S> for HostLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with(TARGET_PREFIX) || self.session.is_standalone() {
            return;
        }
        if FORWARDING.with(Cell::get) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let severity = Severity::from_level(metadata.level());

        FORWARDING.with(|f| f.set(true));
        let _ = self.session.logger().log(severity, &visitor.finish());
        FORWARDING.with(|f| f.set(false));
    }
}
