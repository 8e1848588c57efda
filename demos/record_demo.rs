use std::cell::Cell;

use tracing_subscriber::EnvFilter;
use vb2_rs::{Session, TypeTag, Vb2Error};

const RECORD_LENGTH: u64 = 100;

fn main() -> Result<(), Vb2Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Tracked variables must outlive the session that samples them
    let var1 = Cell::new(42i32);
    let var2 = Cell::new(1.25f32);
    let var3 = Cell::new(0.5f64);

    let mut session = Session::new();
    session.open("test.vb2")?;
    session.register("var1", "units", "description", TypeTag::Int, &var1, 4)?;
    session.track_cell("var2", "units", "description", &var2)?;
    session.track_cell("var3", "units", "description", &var3)?;

    session.start(RECORD_LENGTH)?;
    session.record_all()?;
    for i in 0..RECORD_LENGTH {
        var1.set(var1.get() + i as i32);
        var2.set(var2.get() + 0.1 * i as f32);
        var3.set(var3.get() + 0.01 * i as f64);
        if session.record_all()?.is_saturated() {
            tracing::info!(tick = i, "history full");
        }
    }
    session.end()?;

    // Same columns, second file
    session.open("test2.vb2")?;
    session.start(RECORD_LENGTH)?;
    var1.set(0);
    var2.set(0.0);
    var3.set(0.0);
    for i in 0..RECORD_LENGTH {
        var1.set(var1.get() - i as i32);
        var2.set(var2.get() - 0.1 * i as f32);
        var3.set(var3.get() - 0.01 * i as f64);
        session.record_all()?;
    }
    session.end()?;

    tracing::info!(columns = session.column_count(), "recorded test.vb2 and test2.vb2");
    session.close()
}
