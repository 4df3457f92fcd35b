//! Spoken narration via speech-dispatcher
//!
//! Fire-and-forget: the label text is handed to `spd-say` and nothing is
//! awaited beyond reaping the child.

use std::process::{Command, Stdio};

/// Whether a speech synthesizer is available on this system
pub fn available() -> bool {
    Command::new("spd-say")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Speak the given text asynchronously
pub fn speak(text: &str) {
    match Command::new("spd-say")
        .arg("--")
        .arg(text)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(mut child) => {
            log::debug!("Narrating: {text}");
            std::thread::spawn(move || {
                let _ = child.wait();
            });
        }
        Err(err) => log::warn!("Failed to start narration: {err}"),
    }
}
