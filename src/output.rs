use std::io::{self, Write};

use serde::Serialize;

use crate::domain::{DecodedResponse, PocketMap};

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_decoded(result: &DecodedResponse) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_pockets(pockets: &PocketMap) -> io::Result<()> {
        Self::print_json(pockets)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout().lock();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}
