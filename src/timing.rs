use serde::Serialize;
use web_time::Instant;

use crate::types::TimingSample;

/// Solver output together with the wall-clock time it took.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timed<T> {
    pub algorithm: String,
    pub elapsed_ms: f64,
    pub output: T,
}

impl<T> Timed<T> {
    pub fn sample(&self) -> TimingSample {
        TimingSample {
            algorithm: self.algorithm.clone(),
            elapsed_ms: self.elapsed_ms,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Timed<U> {
        Timed {
            algorithm: self.algorithm,
            elapsed_ms: self.elapsed_ms,
            output: f(self.output),
        }
    }
}

impl<T, E> Timed<Result<T, E>> {
    /// Moves the error out so callers can use `?` on a timed run.
    pub fn transpose(self) -> Result<Timed<T>, E> {
        let Timed {
            algorithm,
            elapsed_ms,
            output,
        } = self;
        output.map(|output| Timed {
            algorithm,
            elapsed_ms,
            output,
        })
    }
}

/// Runs `f` and records how long it took.
pub fn timed<T>(algorithm: &str, f: impl FnOnce() -> T) -> Timed<T> {
    let start = Instant::now();
    let output = f();
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    log::debug!("{algorithm} finished in {elapsed_ms:.3}ms");

    Timed {
        algorithm: algorithm.to_string(),
        elapsed_ms,
        output,
    }
}
