// Sampling ticks and buffer flushing
use super::*;

use tracing::{trace, warn};

impl<'a> Session<'a> {
    /// Samples every column once, in registration order.
    ///
    /// Call once per tick. All columns advance together, so after any call
    /// every column holds the same number of samples. Once `max_history` rows
    /// are recorded further calls change nothing and return
    /// [`Tick::Saturated`].
    ///
    /// If sampling or flushing fails partway through a row, the columns are
    /// left with unequal counts and every further call is refused until the
    /// session is ended and started again.
    pub fn record_all(&mut self) -> Result<Tick, Vb2Error> {
        if self.state != SessionState::Armed {
            return Err(Vb2Error::PreconditionViolation(format!(
                "record_all requires a started session, session is {:?}",
                self.state
            )));
        }
        if self.poisoned {
            return Err(Vb2Error::PreconditionViolation(
                "a previous tick failed; end the session before recording again".into(),
            ));
        }
        if self.current_row >= self.max_history {
            trace!(max_history = self.max_history, "history full, sample dropped");
            return Ok(Tick::Saturated { max_history: self.max_history });
        }

        let file = self
            .file
            .as_mut()
            .ok_or_else(|| Vb2Error::PreconditionViolation("no file is open".into()))?;
        for column in self.registry.columns_mut() {
            let sampled = match column.sample() {
                Ok(true) => column.buffer.flush(file).map(drop),
                Ok(false) => Ok(()),
                Err(e) => Err(e),
            };
            if let Err(e) = sampled {
                warn!(column = column.name(), error = %e, "tick failed, session poisoned");
                self.poisoned = true;
                return Err(e);
            }
        }

        let row = self.current_row;
        self.current_row += 1;
        Ok(Tick::Recorded(row))
    }

    /// Writes out every column buffer that holds staged samples.
    pub fn flush_all(&mut self) -> Result<(), Vb2Error> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| Vb2Error::PreconditionViolation("no file is open".into()))?;
        for column in self.registry.columns_mut() {
            let written = column.buffer.flush(file)?;
            if written > 0 {
                trace!(column = column.name(), bytes = written, "flushed partial buffer");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::fs::{File, OpenOptions};

    use crate::config::{FlushPolicy, RecorderConfig};
    use crate::error::Vb2Error;
    use crate::writer::session::{Session, Tick};

    #[test]
    fn failed_tick_refuses_further_ticks() -> Result<(), Vb2Error> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("poisoned.vb2");
        let a = Cell::new(1i32);
        let b = Cell::new(2i32);

        let config = RecorderConfig { flush_policy: FlushPolicy::PerSample, ..Default::default() };
        let mut session = Session::with_config(config)?;
        session.open(&path)?;
        session.track_cell("a", "", "", &a)?;
        session.track_cell("b", "", "", &b)?;
        session.start(4)?;

        // swap in a read-only handle so the first flush fails
        session.file = Some(File::open(&path)?);
        assert!(matches!(session.record_all(), Err(Vb2Error::IOError(_))));
        assert_eq!(session.current_row(), 0);
        assert_eq!(session.columns()[0].count(), 1);
        assert_eq!(session.columns()[1].count(), 0);

        assert!(matches!(session.record_all(), Err(Vb2Error::PreconditionViolation(_))));
        assert_eq!(session.columns()[1].count(), 0);

        session.file = Some(OpenOptions::new().write(true).open(&path)?);
        session.end()?;
        session.start(4)?;
        assert_eq!(session.record_all()?, Tick::Recorded(0));
        session.end()?;
        assert_eq!(session.columns()[0].count(), 1);
        assert_eq!(session.columns()[1].count(), 1);
        Ok(())
    }
}
