use crate::validate::ParameterError;
use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};

/// Ask on stderr and read one line from stdin. Blank answers re-ask; end of
/// input is reported as a missing value for `option`.
pub fn prompt(label: &str, option: &'static str) -> Result<String> {
    let stdin = io::stdin();
    prompt_from(&mut stdin.lock(), &mut io::stderr(), label, option)
}

pub fn prompt_from<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
    option: &'static str,
) -> Result<String> {
    loop {
        write!(output, "{}: ", label).context("writing prompt")?;
        output.flush().context("writing prompt")?;

        let mut line = String::new();
        let read = input.read_line(&mut line).context("reading from stdin")?;
        if read == 0 {
            writeln!(output).ok();
            return Err(ParameterError::MissingValue { option }.into());
        }

        let value = line.trim();
        if !value.is_empty() {
            return Ok(value.to_string());
        }
    }
}
