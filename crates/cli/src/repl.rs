//! Command dispatcher - the interactive menu loop.
//!
//! States: `Menu` prints the menu and reads a line, `Dispatch` runs the
//! selected handler and returns to `Menu`, `Terminal` ends the loop. Quit and
//! end of input (at the menu or inside a handler's prompts) lead to `Terminal`.

use crate::handlers;
use crate::prompt::Prompt;
use kimbank_core::command::MENU;
use kimbank_core::{Command, Session};
use kimbank_persistence::ProcedureExecutor;
use std::io::{self, Write};
use tokio::io::AsyncBufRead;

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Menu,
    Dispatch(Command),
    Terminal,
}

/// Menu loop owning the session for the lifetime of the client.
pub struct Repl<'a, R, W, E: ?Sized> {
    prompt: Prompt<R, W>,
    db: &'a E,
    session: Session,
}

impl<'a, R, W, E> Repl<'a, R, W, E>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    E: ProcedureExecutor + ?Sized,
{
    pub fn new(prompt: Prompt<R, W>, db: &'a E) -> Self {
        Self {
            prompt,
            db,
            session: Session::new(),
        }
    }

    /// Run until the user quits or input ends
    pub async fn run(&mut self) -> io::Result<()> {
        let mut state = State::Menu;
        loop {
            state = match state {
                State::Menu => {
                    self.prompt.say(MENU)?;
                    match self.prompt.read_line().await? {
                        Some(line) => State::Dispatch(Command::parse(&line)),
                        None => State::Terminal,
                    }
                }
                State::Dispatch(command) => self.dispatch(command).await?,
                State::Terminal => break,
            };
        }
        self.prompt.say("👋 Bye!")?;
        Ok(())
    }

    async fn dispatch(&mut self, command: Command) -> io::Result<State> {
        tracing::debug!(
            %command,
            gated = command.requires_login(),
            user = self.session.username(),
            "dispatch"
        );
        let prompt = &mut self.prompt;
        let session = &mut self.session;
        let db = self.db;

        let result = match command {
            Command::Register => handlers::register(prompt, db, session).await,
            Command::Login => handlers::login(prompt, db, session).await,
            Command::Deposit => handlers::deposit(prompt, db, session).await,
            Command::Withdraw => handlers::withdraw(prompt, db, session).await,
            Command::Transfer => handlers::transfer(prompt, db, session).await,
            Command::UpdateBalances => handlers::update_balances(prompt, db, session).await,
            Command::CheckBalance => handlers::check_balance(prompt, db, session).await,
            Command::Quit => return Ok(State::Terminal),
            Command::Unknown(_) => {
                prompt.say("Error: unknown user option!")?;
                return Ok(State::Menu);
            }
        };

        match result {
            Ok(()) => Ok(State::Menu),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(State::Terminal),
            Err(e) => Err(e),
        }
    }

    #[cfg(test)]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[cfg(test)]
    pub fn prompt(&self) -> &Prompt<R, W> {
        &self.prompt
    }
}
