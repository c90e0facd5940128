// Terminal diagnostics: progress lines on stdout, warnings and errors on
// stderr, plus the spinner used around blocking network and git calls.
// While a spinner is showing, every line is printed with the spinner
// suspended so it never ends up interleaved with (or erased by) the bar.

use crossterm::style::Stylize;
use indicatif::{ProgressBar, ProgressStyle};
use std::cell::RefCell;

thread_local! {
    static ACTIVE: RefCell<Option<ProgressBar>> = const { RefCell::new(None) };
}

fn emit(print: impl FnOnce()) {
    let active = ACTIVE.with(|a| a.borrow().clone());
    match active {
        Some(bar) => bar.suspend(print),
        None => print(),
    }
}

pub fn step(msg: &str) {
    emit(|| println!("{}", msg));
}

pub fn warn(msg: &str) {
    emit(|| eprintln!("{} {}", "Warning:".yellow(), msg));
}

pub fn error(msg: &str) {
    emit(|| eprintln!("{} {}", "Error:".red(), msg));
}

pub fn success(msg: &str) {
    emit(|| println!("{}", msg.green()));
}

/// A spinner line that is cleared when dropped.
pub struct Spinner(ProgressBar);

impl Drop for Spinner {
    fn drop(&mut self) {
        self.0.finish_and_clear();
        ACTIVE.with(|a| a.borrow_mut().take());
    }
}

/// Draw a spinner line with `msg`. It is not ticked from a background
/// thread; it stays up until the returned guard is dropped.
pub fn spinner(msg: &str) -> Spinner {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(msg.to_string());
    bar.tick();
    ACTIVE.with(|a| *a.borrow_mut() = Some(bar.clone()));
    Spinner(bar)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active() -> bool {
        ACTIVE.with(|a| a.borrow().is_some())
    }

    #[test]
    fn spinner_is_active_until_dropped() {
        let spinner = spinner("working");
        assert!(active());

        let mut printed = false;
        emit(|| printed = true);
        assert!(printed);

        drop(spinner);
        assert!(!active());
    }
}
