//! Terminal implementations used by the command-line tool

use super::{Notifier, PageSignal};

/// Title shown above every notification
pub const NOTIFICATION_TITLE: &str = "CR-Unblocker has encountered an error";

/// Prints notifications to stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str) {
        eprintln!("{}: {}", NOTIFICATION_TITLE, message);
    }
}

/// Prints the reload request as a JSON message on stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSignal;

impl PageSignal for ConsoleSignal {
    fn request_reload(&self) {
        println!("{}", serde_json::json!({ "action": "reload" }));
    }
}
