use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Progress,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyKind {
    Success,
    Error,
}

/// The surface hosting the picker: a transient status line and a way
/// to ask the host to dismiss the panel.
pub trait Panel {
    fn status(&self, kind: StatusKind, message: &str);
    fn request_close(&self);
}

/// Host notification banner. Fire-and-forget by contract;
/// implementations must swallow their own failures.
pub trait Notifier {
    fn notify(&self, kind: NotifyKind, message: &str);
}

/// Console rendition used by the CLI. Status goes to stderr so stdout
/// stays reserved for the JSON envelope.
pub struct ConsolePanel;

impl Panel for ConsolePanel {
    fn status(&self, kind: StatusKind, message: &str) {
        match kind {
            StatusKind::Progress => eprintln!("… {}", message),
            StatusKind::Success => eprintln!("✓ {}", message),
            StatusKind::Error => eprintln!("✗ {}", message),
        }
    }

    fn request_close(&self) {
        debug!("Panel close requested");
    }
}

pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, kind: NotifyKind, message: &str) {
        match kind {
            NotifyKind::Success => debug!(message, "Notification"),
            NotifyKind::Error => debug!(message, "Error notification"),
        }
    }
}
