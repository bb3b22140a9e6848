//! Common functionality.

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use flate2::bufread::MultiGzDecoder;

/// Commonly used command line arguments.
#[derive(Parser, Debug)]
pub struct Args {
    /// Verbosity of the program
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            verbose: Verbosity::new(0, 0),
        }
    }
}

/// Transparently open a file with gzip decoder.
pub fn open_read_maybe_gz<P>(path: P) -> Result<Box<dyn Read>, std::io::Error>
where
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())?;
    if path.as_ref().extension().map(|s| s.to_str()) == Some(Some("gz")) {
        tracing::trace!("Opening {:?} as gzip for reading", path.as_ref());
        Ok(Box::new(MultiGzDecoder::new(BufReader::new(file))))
    } else {
        tracing::trace!("Opening {:?} as plain text for reading", path.as_ref());
        Ok(Box::new(file))
    }
}

/// Return the version of the crate and `x.y.z` in tests.
pub fn worker_version() -> &'static str {
    if cfg!(test) {
        "x.y.z"
    } else {
        env!("CARGO_PKG_VERSION")
    }
}
