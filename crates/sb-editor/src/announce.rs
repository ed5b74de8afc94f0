//! Selection announcer sink (accessibility live region).

use std::cell::RefCell;
use std::rc::Rc;

/// Receives a human-readable line whenever the selection changes.
pub trait SelectionAnnouncer {
    fn announce(&mut self, message: &str);
}

/// Default sink: writes announcements to the log.
#[derive(Debug, Default)]
pub struct LogAnnouncer;

impl SelectionAnnouncer for LogAnnouncer {
    fn announce(&mut self, message: &str) {
        log::debug!("announce: {message}");
    }
}

impl SelectionAnnouncer for Vec<String> {
    fn announce(&mut self, message: &str) {
        self.push(message.to_string());
    }
}

/// Shared sink, so a host can keep a handle to what was announced.
impl<T: SelectionAnnouncer> SelectionAnnouncer for Rc<RefCell<T>> {
    fn announce(&mut self, message: &str) {
        self.borrow_mut().announce(message);
    }
}
