//! Line-based prompts over any async reader and blocking writer.
//!
//! End of input while a field is being asked surfaces as
//! `io::ErrorKind::UnexpectedEof`; the dispatcher treats it as "stop".

use kimbank_core::{AccountType, CoreError};
use std::fmt::Display;
use std::io::{self, Write};
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R, W> Prompt<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print one line and flush
    pub fn say(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.output, "{}", text)?;
        self.output.flush()
    }

    /// Next input line without its line ending, `None` at end of input.
    ///
    /// Bytes that are not UTF-8 become U+FFFD instead of failing the read.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = Vec::new();
        if self.input.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&buf);
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Ask for a free-text field. Labels that are not questions get a colon.
    pub async fn ask(&mut self, label: &str) -> io::Result<String> {
        if label.ends_with('?') {
            self.say(label)?;
        } else {
            self.say(format!("{}:", label))?;
        }
        match self.read_line().await? {
            Some(line) => Ok(line.trim().to_string()),
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("input closed while asking for {}", label),
            )),
        }
    }

    /// Ask until the answer parses as a number
    pub async fn ask_number<T: FromStr>(&mut self, label: &str) -> io::Result<T> {
        loop {
            let answer = self.ask(label).await?;
            match answer.parse() {
                Ok(value) => return Ok(value),
                Err(_) => self.say(format!("Error: {}", CoreError::InvalidNumber(answer)))?,
            }
        }
    }

    /// Ask until the answer is `client` or `employee`
    pub async fn ask_account_type(&mut self) -> io::Result<AccountType> {
        loop {
            match self.ask("Account type (client/employee)").await?.parse() {
                Ok(account_type) => return Ok(account_type),
                Err(e) => self.say(format!("Error: {}", e))?,
            }
        }
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.output
    }
}
