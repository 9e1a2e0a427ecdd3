use std::io::{stdout, Write};
use std::time::Duration;

use crossterm::cursor::MoveTo;
use crossterm::event::{Event, KeyCode, KeyModifiers};
use crossterm::style::Color::{DarkBlue, DarkGreen, Reset, Yellow};
use crossterm::style::{Attribute, Print, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{cursor, event, execute, queue, terminal, ExecutableCommand};

use toolbook_core::error::{Error, Result};
use toolbook_core::store::Catalog;
use toolbook_core::{config, execution};

use super::input;
use super::state::{CycleDirection, Session};

struct RawModeGuard;

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        // Disable raw mode on drop
        let _ = disable_raw_mode();
        let mut stdout = stdout();
        let _ = stdout.execute(LeaveAlternateScreen);
    }
}

/// Runs the interactive session over `catalog` until the user quits.
///
/// # Errors
///
/// Returns an error only for terminal failures; failed catalog actions are
/// reported in the status line and leave the session running.
pub fn run_session(catalog: &Catalog) -> Result<()> {
    let shell = std::env::var("SHELL").unwrap_or_else(|_| config::DEFAULT_SHELL.to_string());

    let mut session = Session::new(catalog)?;
    let mut is_filtering = false;

    let mut stdout = stdout();
    stdout.execute(EnterAlternateScreen)?;
    enable_raw_mode()?;
    let _raw_mode_guard = RawModeGuard; // When this goes out of scope, raw mode is disabled

    let mut needs_redraw = true;

    loop {
        if needs_redraw {
            redraw(&session, is_filtering)?;
            needs_redraw = false;
        }

        if !event::poll(Duration::from_millis(500))? {
            continue;
        }

        let Event::Key(key_event) = event::read()? else {
            needs_redraw = true;
            continue;
        };
        needs_redraw = true;

        if key_event.code == KeyCode::Char('c')
            && key_event.modifiers.contains(KeyModifiers::CONTROL)
        {
            return Ok(());
        }

        if is_filtering {
            match key_event.code {
                KeyCode::Esc => {
                    is_filtering = false;
                    session.set_filter("");
                }
                KeyCode::Enter => is_filtering = false,
                KeyCode::Backspace => session.pop_filter_char(),
                KeyCode::Up => session.cycle_command(CycleDirection::Up),
                KeyCode::Down => session.cycle_command(CycleDirection::Down),
                KeyCode::Char(c) => session.push_filter_char(c),
                _ => {}
            }
            continue;
        }

        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
            KeyCode::Left => report(&mut session, |s| s.cycle_tool(CycleDirection::Up)),
            KeyCode::Right => report(&mut session, |s| s.cycle_tool(CycleDirection::Down)),
            KeyCode::Up => session.cycle_command(CycleDirection::Up),
            KeyCode::Down => session.cycle_command(CycleDirection::Down),
            KeyCode::Char('/') => is_filtering = true,
            KeyCode::Char('g') => report(&mut session, |s| s.reload()),
            KeyCode::Char('t') => report(&mut session, add_tool_action),
            KeyCode::Char('a') => report(&mut session, |s| command_form_action(s, false)),
            KeyCode::Char('e') => report(&mut session, |s| command_form_action(s, true)),
            KeyCode::Char('d') => report(&mut session, delete_command_action),
            KeyCode::Char('y') => report(&mut session, copy_action),
            KeyCode::Char('p') => report(&mut session, print_action),
            KeyCode::Char('x') => report(&mut session, |s| execute_action(s, &shell)),
            _ => {}
        }
    }
}

/// Runs one session action, reporting any failure in the status line. The
/// session stays in its last good state after a failed action.
fn report(session: &mut Session<'_>, action: impl FnOnce(&mut Session<'_>) -> Result<()>) {
    if let Err(e) = action(session) {
        session.status = Some(e.to_string());
    }
}

/// Suspends the alternate screen and raw mode around a blocking modal,
/// restoring both whatever the modal returns. No other state transition can
/// run while the modal is active.
fn with_suspended<T>(modal: impl FnOnce() -> Result<T>) -> Result<T> {
    let mut stdout = stdout();
    disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen)?;

    let result = modal();

    execute!(stdout, EnterAlternateScreen)?;
    enable_raw_mode()?;
    result
}

fn add_tool_action(session: &mut Session<'_>) -> Result<()> {
    let Some(form) = with_suspended(input::tool_form)? else {
        session.status = Some("Cancelled.".to_string());
        return Ok(());
    };

    session.add_tool(&form.name, &form.description, &form.tags)
}

fn command_form_action(session: &mut Session<'_>, edit_selected: bool) -> Result<()> {
    if session.selected_tool.is_none() {
        return Err(Error::Validation("no tool selected".to_string()));
    }
    if edit_selected && session.selected().is_none() {
        return Err(Error::Validation("no command selected".to_string()));
    }

    let existing = if edit_selected {
        session.selected().cloned()
    } else {
        None
    };

    let Some(form) = with_suspended(|| input::command_form(existing.as_ref()))? else {
        session.status = Some("Cancelled.".to_string());
        return Ok(());
    };

    session.upsert_command(&form.name, &form.description, &form.snippet)
}

fn delete_command_action(session: &mut Session<'_>) -> Result<()> {
    let Some(command) = session.selected() else {
        return Err(Error::Validation("no command selected".to_string()));
    };

    let prompt = format!("Delete command '{}'?", command.name);
    if with_suspended(|| input::confirm(&prompt, false))? {
        session.delete_selected_command()
    } else {
        session.status = Some("Cancelled.".to_string());
        Ok(())
    }
}

fn copy_action(session: &mut Session<'_>) -> Result<()> {
    let Some(command) = session.selected() else {
        return Err(Error::Validation("no command selected".to_string()));
    };

    execution::copy_to_clipboard(&command.snippet)?;
    session.status = Some(format!("Copied snippet of '{}'.", command.name));
    Ok(())
}

fn print_action(session: &mut Session<'_>) -> Result<()> {
    let Some(command) = session.selected().cloned() else {
        return Err(Error::Validation("no command selected".to_string()));
    };

    with_suspended(|| {
        println!("{}", command.snippet);
        input::prompt_line("Press enter to continue")?;
        Ok(())
    })
}

fn execute_action(session: &mut Session<'_>, shell: &str) -> Result<()> {
    let Some(command) = session.selected().cloned() else {
        return Err(Error::Validation("no command selected".to_string()));
    };

    let outcome = with_suspended(|| {
        println!("{}", command.snippet);
        if !input::confirm("Run this command?", false)? {
            return Ok(None);
        }

        // The session stalls here until the child completes.
        Ok(Some(execution::run_snippet(shell, &command.snippet)))
    })?;

    session.status = Some(match outcome {
        None => "Cancelled.".to_string(),
        Some(Ok(())) => format!("Ran '{}'.", command.name),
        Some(Err(e)) => e.to_string(),
    });
    Ok(())
}

fn redraw(session: &Session<'_>, is_filtering: bool) -> Result<()> {
    let mut stdout = stdout();
    let (width, height) = terminal::size()?;

    queue!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
    print_header(session, width)?;

    let list_height = height.saturating_sub(8) as usize;
    print_commands(session, list_height)?;
    print_preview(session)?;

    if is_filtering {
        queue!(
            stdout,
            SetAttribute(Attribute::Bold),
            Print(format!("Filter: {}", session.filter_text)),
            SetAttribute(Attribute::Reset),
            cursor::MoveToNextLine(1)
        )?;
    } else if !session.filter_text.is_empty() {
        queue!(
            stdout,
            Print(format!("Filter: {}  (/: edit)", session.filter_text)),
            cursor::MoveToNextLine(1)
        )?;
    }

    if let Some(status) = &session.status {
        queue!(
            stdout,
            SetForegroundColor(Yellow),
            Print(status.clone()),
            SetForegroundColor(Reset),
        )?;
    }

    stdout.flush()?;
    Ok(())
}

fn print_header(session: &Session<'_>, width: u16) -> Result<()> {
    let mut stdout = stdout();

    let tool_label = match session.selected_tool_row() {
        Some(tool) => format!(
            "{} ({}/{})",
            tool,
            session.selected_tool.unwrap_or(0) + 1,
            session.tools.len()
        ),
        None => "No tools yet (press t to add one)".to_string(),
    };

    let instructions =
        "  \u{2190}/\u{2192} tool | \u{2191}/\u{2193} command | / filter | t a e d edit | y p x snippet | g reload | q quit";
    let content = format!(" {tool_label}{instructions}");
    let padding = " ".repeat((width as usize).saturating_sub(content.chars().count()));

    queue!(
        stdout,
        SetBackgroundColor(DarkGreen),
        Print(content),
        Print(padding),
        SetBackgroundColor(Reset),
        cursor::MoveToNextLine(1),
        cursor::MoveToNextLine(1),
    )?;

    Ok(())
}

fn print_commands(session: &Session<'_>, list_height: usize) -> Result<()> {
    let mut stdout = stdout();

    if session.filtered.is_empty() {
        queue!(
            stdout,
            SetForegroundColor(crossterm::style::Color::Red),
            Print("No matching commands!".to_string()),
            SetForegroundColor(Reset),
            cursor::MoveToNextLine(1)
        )?;
        return Ok(());
    }

    for (position, &command_index) in session.filtered.iter().take(list_height).enumerate() {
        let command = &session.commands[command_index];
        let is_selected = session.selected_command == Some(position);

        if is_selected {
            queue!(
                stdout,
                SetAttribute(Attribute::Bold),
                SetBackgroundColor(DarkBlue),
                SetForegroundColor(Yellow),
            )?;
        }

        queue!(stdout, Print(format!("[{}] {}", position + 1, command)))?;

        queue!(
            stdout,
            SetAttribute(Attribute::Reset),
            SetBackgroundColor(Reset),
            SetForegroundColor(Reset),
            cursor::MoveToNextLine(1),
        )?;
    }

    Ok(())
}

fn print_preview(session: &Session<'_>) -> Result<()> {
    let mut stdout = stdout();
    queue!(stdout, cursor::MoveToNextLine(1))?;

    let Some(command) = session.selected() else {
        queue!(stdout, cursor::MoveToNextLine(1))?;
        return Ok(());
    };

    queue!(
        stdout,
        SetAttribute(Attribute::Bold),
        Print(command.name.clone()),
        SetAttribute(Attribute::Reset),
    )?;
    if !command.description.is_empty() {
        queue!(stdout, Print(format!(" ({})", command.description)))?;
    }
    queue!(stdout, cursor::MoveToNextLine(1))?;

    if !command.snippet.is_empty() {
        queue!(
            stdout,
            Print(format!("$ {}", command.snippet)),
            cursor::MoveToNextLine(1)
        )?;
    }
    queue!(stdout, cursor::MoveToNextLine(1))?;

    Ok(())
}
