//! Event actions: open the calendar link, copy it to the clipboard.

use campfire_core::CalendarLink;
use tracing::info;

use crate::error::{ClientError, ClientResult};

/// Opens the calendar-add link in the default browser.
pub fn open_calendar_link(link: &CalendarLink) -> ClientResult<()> {
    info!(url = %link, "opening calendar link");
    open::that(link.as_str())
        .map_err(|e| ClientError::Action(format!("failed to open URL: {}", e)))?;

    Ok(())
}

/// Copies the calendar-add link to the clipboard.
pub fn copy_calendar_link(link: &CalendarLink) -> ClientResult<()> {
    info!(url = %link, "copying calendar link to clipboard");

    let mut clipboard = arboard::Clipboard::new()
        .map_err(|e| ClientError::Action(format!("failed to access clipboard: {}", e)))?;

    clipboard
        .set_text(link.as_str())
        .map_err(|e| ClientError::Action(format!("failed to copy to clipboard: {}", e)))?;

    Ok(())
}
