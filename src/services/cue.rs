//! Completion cue played when a countdown finishes

use std::io::Write;

use tracing::{info, warn};

/// Called exactly once each time a countdown reaches zero
pub trait CompletionCue {
    fn play(&mut self);
}

impl<F> CompletionCue for F
where
    F: FnMut(),
{
    fn play(&mut self) {
        self()
    }
}

/// A single tone of the completion chime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    pub delay_ms: u64,
    pub length_ms: u64,
    pub frequency_hz: u32,
}

/// Five rising-then-falling sine notes
pub const CHIME: [Note; 5] = [
    Note { delay_ms: 0, length_ms: 150, frequency_hz: 800 },
    Note { delay_ms: 151, length_ms: 150, frequency_hz: 1000 },
    Note { delay_ms: 302, length_ms: 150, frequency_hz: 1200 },
    Note { delay_ms: 453, length_ms: 150, frequency_hz: 1000 },
    Note { delay_ms: 604, length_ms: 150, frequency_hz: 800 },
];

/// Terminal cue: rings the bell and logs the chime it stands in for
#[derive(Debug, Default)]
pub struct TerminalBell {
    rung: u64,
}

impl TerminalBell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times the bell has rung
    pub fn rung(&self) -> u64 {
        self.rung
    }
}

impl CompletionCue for TerminalBell {
    fn play(&mut self) {
        self.rung += 1;
        let frequencies: Vec<u32> = CHIME.iter().map(|note| note.frequency_hz).collect();
        info!("Timer complete, playing chime {:?} Hz", frequencies);

        let mut stdout = std::io::stdout();
        if let Err(e) = stdout.write_all(b"\x07").and_then(|_| stdout.flush()) {
            warn!("Failed to ring terminal bell: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chime_notes_do_not_overlap() {
        for pair in CHIME.windows(2) {
            assert!(pair[0].delay_ms + pair[0].length_ms < pair[1].delay_ms);
        }
    }

    #[test]
    fn test_closure_cue() {
        let mut count = 0;
        {
            let mut cue = || count += 1;
            cue.play();
            cue.play();
        }
        assert_eq!(count, 2);
    }

    #[test]
    fn test_bell_counts() {
        let mut bell = TerminalBell::new();
        bell.play();
        assert_eq!(bell.rung(), 1);
    }
}
