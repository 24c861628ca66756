//! Forwarding of Bevy notices to the webview
//!
//! The Bevy thread starts before Tauri has an `AppHandle`, so it only holds
//! the sending half of a channel. Once Tauri is set up, a forwarder thread
//! turns each notice into a frontend event.

use bevy::log::{info, warn};
use crossbeam_channel::Receiver;
use std::thread;
use tauri::{AppHandle, Emitter, Runtime};

use super::shared_state::ViewerNotice;

/// Frontend event name for a notice
pub fn event_name(notice: ViewerNotice) -> &'static str {
    match notice {
        ViewerNotice::ProgressHidden => "progress-hidden",
    }
}

/// Spawn the forwarder; it ends when the Bevy side drops its sender
pub fn spawn_forwarder<R: Runtime>(receiver: Receiver<ViewerNotice>, app: AppHandle<R>) {
    thread::spawn(move || {
        for notice in receiver {
            let event = event_name(notice);
            info!("[Tauri] Emitting `{}`", event);
            if let Err(err) = app.emit(event, ()) {
                warn!("[Tauri] Failed to emit `{}`: {}", event, err);
            }
        }
    });
}
