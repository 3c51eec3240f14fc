//! Presentation collaborators: pushed status/verdict updates and a pulled per-band chart buffer.

mod chart;
mod console;

pub use chart::ChannelHistory;
pub use console::ConsolePresenter;

use crate::risk::{Verdict, WindowVerdict};

/// Status line shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Listening,
    Stopped,
    Verdict(Verdict),
}

impl Status {
    pub fn message(self) -> &'static str {
        match self {
            Status::Listening => "Listening for band data...",
            Status::Stopped => "Test stopped",
            Status::Verdict(Verdict::AtRisk) => "Stroke detected!",
            Status::Verdict(Verdict::Safe) => "Normal",
            Status::Verdict(Verdict::Unknown) => "Waiting for a full window",
        }
    }

    /// Display colour as `#rrggbb`.
    pub fn color(self) -> &'static str {
        match self {
            Status::Listening => "#1976D2",
            Status::Stopped | Status::Verdict(Verdict::Unknown) => "#333333",
            Status::Verdict(Verdict::AtRisk) => "#D32F2F",
            Status::Verdict(Verdict::Safe) => "#4CAF50",
        }
    }
}

pub trait Presenter {
    /// Run-state or verdict status changed.
    fn on_status(&mut self, status: Status);

    /// Called once per consumed window.
    fn on_verdict(&mut self, verdict: &WindowVerdict);

    /// Chart redraw tick; reads only the latest published values.
    fn refresh(&mut self, _history: &ChannelHistory) {}
}

impl<P: Presenter + ?Sized> Presenter for Box<P> {
    fn on_status(&mut self, status: Status) {
        (**self).on_status(status)
    }

    fn on_verdict(&mut self, verdict: &WindowVerdict) {
        (**self).on_verdict(verdict)
    }

    fn refresh(&mut self, history: &ChannelHistory) {
        (**self).refresh(history)
    }
}
