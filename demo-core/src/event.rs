// Status events and their on-screen wording.
// Control flow only ever emits an Event; the text lives here.

use core::fmt;

use crate::stack_fmt::StackFmt;

// room for the Debug name of a backend error
pub const CAUSE_CAP: usize = 48;

/// Where in the flow a run stopped.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stage {
    BusInit,
    Mount,
    FileCreate,
    FileWrite,
    ReadBack,
}

/// A fatal failure, tagged with its stage and the underlying error name.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Fault {
    stage: Stage,
    cause: StackFmt<CAUSE_CAP>,
}

impl Fault {
    pub fn new(stage: Stage, cause: &dyn fmt::Debug) -> Self {
        Self {
            stage,
            cause: StackFmt::from_args(format_args!("{:?}", cause)),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn cause(&self) -> &str {
        self.cause.as_str()
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stage {
            Stage::BusInit => f.write_str("SPI bus init failed"),
            Stage::Mount => write!(f, "Mount failed: {}", self.cause()),
            Stage::FileCreate => f.write_str("File create failed"),
            Stage::FileWrite => f.write_str("File write failed"),
            Stage::ReadBack => f.write_str("File read failed"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event<'a> {
    Starting,
    BusReady,
    Mounted,
    FileCreated,
    FileWritten,
    ReadBack(&'a str),
    Finished,
    Failed(&'a Fault),
}

impl fmt::Display for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Starting => f.write_str("SD card init start"),
            Event::BusReady => f.write_str("SPI bus init OK"),
            Event::Mounted => f.write_str("Filesystem mounted"),
            Event::FileCreated => f.write_str("File created"),
            Event::FileWritten => f.write_str("File write done"),
            Event::ReadBack(line) => write!(f, "Read: {}", line),
            Event::Finished => f.write_str("All done"),
            Event::Failed(fault) => fmt::Display::fmt(fault, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    enum CardError {
        CardNotFound,
    }

    #[test]
    fn mount_failure_names_the_cause() {
        let fault = Fault::new(Stage::Mount, &CardError::CardNotFound);
        let msg = StackFmt::<64>::from_args(format_args!("{}", Event::Failed(&fault)));
        assert_eq!(msg.as_str(), "Mount failed: CardNotFound");
    }

    #[test]
    fn other_failures_keep_the_cause_off_screen() {
        let fault = Fault::new(Stage::FileCreate, &CardError::CardNotFound);
        let msg = StackFmt::<64>::from_args(format_args!("{}", fault));
        assert_eq!(msg.as_str(), "File create failed");
        assert_eq!(fault.cause(), "CardNotFound");
    }
}
