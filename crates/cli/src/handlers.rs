//! Operation handlers - one per menu entry.
//!
//! Each handler prompts for its fields, checks the session when the operation
//! needs a login, and hands a `ProcedureCall` to the executor. A call the
//! server rejects is logged and reported and the session goes on. A fatal
//! error (the connection is gone) is returned and ends the dispatcher.

use crate::prompt::Prompt;
use kimbank_core::{ProcedureCall, Registration, Session};
use kimbank_persistence::ProcedureExecutor;
use std::io::{self, Write};
use tokio::io::AsyncBufRead;

/// Invoke `call`, report the outcome, return whether it succeeded.
/// Fatal persistence errors come back as `Err`.
async fn invoke<R, W, E>(
    prompt: &mut Prompt<R, W>,
    db: &E,
    call: ProcedureCall,
    label: &str,
) -> io::Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    E: ProcedureExecutor + ?Sized,
{
    match db.invoke(&call).await {
        Ok(rows) => {
            tracing::info!(procedure = call.name, rows, "Successful {}", label.to_lowercase());
            prompt.say(format!("✅ {} succeeded", label))?;
            Ok(true)
        }
        Err(e) if e.is_fatal() => Err(io::Error::other(e)),
        Err(e) => {
            tracing::error!(procedure = call.name, "{} error: {}", label, e);
            prompt.say(format!("❌ {} error: {}", label, e))?;
            Ok(false)
        }
    }
}

/// Print the login error when nobody is logged in
fn logged_in<R, W>(prompt: &mut Prompt<R, W>, session: &Session) -> io::Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    match session.require_login() {
        Ok(_) => Ok(true),
        Err(e) => {
            prompt.say(format!("Error: {}", e))?;
            Ok(false)
        }
    }
}

pub async fn register<R, W, E>(
    prompt: &mut Prompt<R, W>,
    db: &E,
    session: &mut Session,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    E: ProcedureExecutor + ?Sized,
{
    let registration = Registration {
        username: prompt.ask("Username").await?,
        password: prompt.ask("Password").await?,
        first_name: prompt.ask("Firstname").await?,
        last_name: prompt.ask("Lastname").await?,
        national_id: prompt.ask("National ID").await?,
        date_of_birth: prompt.ask("Date of birth (yy/mm/dd)").await?,
        account_type: prompt.ask_account_type().await?,
        interest_rate: prompt.ask_number("Interest rate").await?,
    };

    if invoke(prompt, db, ProcedureCall::register(&registration), "Register").await? {
        session.authenticate(registration.username);
    }
    Ok(())
}

pub async fn login<R, W, E>(
    prompt: &mut Prompt<R, W>,
    db: &E,
    session: &mut Session,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    E: ProcedureExecutor + ?Sized,
{
    let username = prompt.ask("Username").await?;
    let password = prompt.ask("Password").await?;

    if invoke(prompt, db, ProcedureCall::login(&username, &password), "Login").await? {
        session.authenticate(username);
    }
    Ok(())
}

pub async fn deposit<R, W, E>(prompt: &mut Prompt<R, W>, db: &E, session: &Session) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    E: ProcedureExecutor + ?Sized,
{
    if !logged_in(prompt, session)? {
        return Ok(());
    }
    let amount: i64 = prompt.ask_number("How much?").await?;
    invoke(prompt, db, ProcedureCall::deposit(amount), "Deposit").await?;
    Ok(())
}

pub async fn withdraw<R, W, E>(prompt: &mut Prompt<R, W>, db: &E, session: &Session) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    E: ProcedureExecutor + ?Sized,
{
    if !logged_in(prompt, session)? {
        return Ok(());
    }
    let amount: i64 = prompt.ask_number("How much?").await?;
    invoke(prompt, db, ProcedureCall::withdraw(amount), "Withdraw").await?;
    Ok(())
}

pub async fn transfer<R, W, E>(prompt: &mut Prompt<R, W>, db: &E, session: &Session) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    E: ProcedureExecutor + ?Sized,
{
    if !logged_in(prompt, session)? {
        return Ok(());
    }
    let amount: i64 = prompt.ask_number("How much?").await?;
    let to_account: i32 = prompt.ask_number("To which account number?").await?;
    invoke(prompt, db, ProcedureCall::transfer(amount, to_account), "Transfer").await?;
    Ok(())
}

/// Interest accrual over all balances, run server-side
pub async fn update_balances<R, W, E>(
    prompt: &mut Prompt<R, W>,
    db: &E,
    session: &Session,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    E: ProcedureExecutor + ?Sized,
{
    if !logged_in(prompt, session)? {
        return Ok(());
    }
    invoke(prompt, db, ProcedureCall::update_balances(), "Update balances").await?;
    Ok(())
}

/// The balance itself arrives as a server notice or notification, not a row
pub async fn check_balance<R, W, E>(
    prompt: &mut Prompt<R, W>,
    db: &E,
    session: &Session,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    E: ProcedureExecutor + ?Sized,
{
    if !logged_in(prompt, session)? {
        return Ok(());
    }
    invoke(prompt, db, ProcedureCall::check_balance(), "Check balance").await?;
    Ok(())
}
