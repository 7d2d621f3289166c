//! Terminal output with the `>>` line marker.

use gistboard_engine::BoardEvent;
use parking_lot::Mutex;
use std::fmt::Display;
use std::io::{self, Write};

/// Marker printed before every line and used as the input prompt.
pub const MARKER: &str = ">>";

/// Serialized writer shared by the input loop and the event printer.
pub struct Console<W: Write> {
    out: Mutex<W>,
    interactive: bool,
}

impl Console<io::Stdout> {
    /// Console on stdout. Interactive consoles redraw the prompt line.
    pub fn stdout(interactive: bool) -> Self {
        Self::new(io::stdout(), interactive)
    }
}

impl<W: Write> Console<W> {
    /// Creates a console over `out`.
    pub fn new(out: W, interactive: bool) -> Self {
        Self {
            out: Mutex::new(out),
            interactive,
        }
    }

    /// Prints one marked line.
    pub fn line(&self, text: impl Display) -> io::Result<()> {
        let mut out = self.out.lock();
        writeln!(out, "{}{}", MARKER, text)?;
        out.flush()
    }

    /// Prints several marked lines without interleaving.
    pub fn lines<I>(&self, texts: I) -> io::Result<()>
    where
        I: IntoIterator,
        I::Item: Display,
    {
        let mut out = self.out.lock();
        for text in texts {
            writeln!(out, "{}{}", MARKER, text)?;
        }
        out.flush()
    }

    /// Prints the input prompt.
    pub fn prompt(&self) -> io::Result<()> {
        let mut out = self.out.lock();
        write!(out, "{}", MARKER)?;
        out.flush()
    }

    /// Wipes the prompt line before output lands on it.
    pub fn clear_input_line(&self) -> io::Result<()> {
        if !self.interactive {
            return Ok(());
        }
        let mut out = self.out.lock();
        write!(out, "\r\x1b[K")?;
        out.flush()
    }

    /// Prints a board event.
    pub fn event(&self, event: &BoardEvent) -> io::Result<()> {
        let mut out = self.out.lock();
        write_event(&mut *out, event)?;
        out.flush()
    }

    /// Prints a board event arriving while the prompt may be showing.
    ///
    /// On an interactive console the prompt line is wiped first and redrawn
    /// afterwards, all under one lock.
    pub fn notify(&self, event: &BoardEvent) -> io::Result<()> {
        if !self.interactive {
            return self.event(event);
        }
        let mut out = self.out.lock();
        write!(out, "\r\x1b[K")?;
        write_event(&mut *out, event)?;
        write!(out, "{}", MARKER)?;
        out.flush()
    }

    /// Returns the writer, consuming the console.
    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

fn write_event(out: &mut impl Write, event: &BoardEvent) -> io::Result<()> {
    match event {
        BoardEvent::Entries { entries, .. } => {
            for entry in entries {
                writeln!(out, "{}{}", MARKER, entry)?;
            }
            Ok(())
        }
        BoardEvent::Offline { .. } => writeln!(
            out,
            "{}Connection failed. Working offline until reconnected.",
            MARKER
        ),
        BoardEvent::Reconnected => writeln!(out, "{}Reconnected!", MARKER),
    }
}
