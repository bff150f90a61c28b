//! Line-oriented driver for the funnel.
//!
//! Reads one command per line, applies it to the [`Funnel`] and writes the
//! rendered update. Delayed funnel events are interleaved with input.

use margin_core::models::{AuditField, ContactField, OpenSchedule, QualificationField};
use margin_core::parse::parse_integer;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::funnel::{Funnel, FunnelEvent, Update};
use crate::logging;
use crate::render::{render_gate, render_qualification, render_update, render_view};

pub const HELP: &str = "\
comandos:
  start                               começa (ou recomeça) a auditoria
  set <campo> <valor>                 fixed_cost, open_hours, procedure_name, procedure_price,
                                      procedure_minutes, taxes_percent, commission_percent,
                                      materials_cost
  schedule <dias> <horas> [sáb] [dom] horário semanal de funcionamento
  next | back                         navega entre etapas
  unlock                              abre o formulário de contato
  contact <name|phone|email> <valor>  preenche o contato
  specialist                          abre o formulário do especialista
  answer <campo> <valor>              challenge, team, uses_system, area, subscriber,
                                      investment, name, phone, email
  submit                              envia o formulário aberto
  esc                                 fecha o formulário aberto
  <enter>                             avança quando a etapa está completa
  show                                mostra o estado atual
  log <nível>                         muda o nível de log
  quit                                sai
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Start,
    SetAudit(AuditField, String),
    Schedule(OpenSchedule),
    Next,
    Back,
    Unlock,
    Contact(ContactField, String),
    Specialist,
    Answer(QualificationField, String),
    Submit,
    Escape,
    Enter,
    Show,
    Log(String),
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}' (try `help`)")]
    Unknown(String),

    #[error("missing {0}")]
    MissingArgument(&'static str),

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("'{0}' is not a whole number")]
    InvalidNumber(String),
}

/// Parses one input line. An empty line is [`Command::Enter`].
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "" | "enter" => Command::Enter,
        "help" | "?" => Command::Help,
        "start" => Command::Start,
        "set" => {
            let (field, value) = field_and_value(rest)?;
            let field = AuditField::parse(field)
                .ok_or_else(|| CommandError::UnknownField(field.to_string()))?;
            Command::SetAudit(field, value)
        }
        "schedule" => Command::Schedule(parse_schedule(rest)?),
        "next" => Command::Next,
        "back" => Command::Back,
        "unlock" => Command::Unlock,
        "contact" => {
            let (field, value) = field_and_value(rest)?;
            let field = match field {
                "name" => ContactField::Name,
                "phone" => ContactField::Phone,
                "email" => ContactField::Email,
                other => return Err(CommandError::UnknownField(other.to_string())),
            };
            Command::Contact(field, value)
        }
        "specialist" => Command::Specialist,
        "answer" => {
            let (field, value) = field_and_value(rest)?;
            let field = QualificationField::parse(field)
                .ok_or_else(|| CommandError::UnknownField(field.to_string()))?;
            Command::Answer(field, value)
        }
        "submit" => Command::Submit,
        "esc" | "escape" => Command::Escape,
        "show" => Command::Show,
        "log" if rest.is_empty() => return Err(CommandError::MissingArgument("log level")),
        "log" => Command::Log(rest.to_string()),
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(command)
}

fn field_and_value(rest: &str) -> Result<(&str, String), CommandError> {
    if rest.is_empty() {
        return Err(CommandError::MissingArgument("field"));
    }
    let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    Ok((field, value.trim().to_string()))
}

fn parse_schedule(rest: &str) -> Result<OpenSchedule, CommandError> {
    let mut parts = rest.split_whitespace();
    let mut number = |name: &'static str, required: bool| -> Result<Option<u32>, CommandError> {
        match parts.next() {
            Some(raw) => parse_integer(raw)
                .map(Some)
                .ok_or_else(|| CommandError::InvalidNumber(raw.to_string())),
            None if required => Err(CommandError::MissingArgument(name)),
            None => Ok(None),
        }
    };

    Ok(OpenSchedule {
        weekdays: number("weekdays", true)?.unwrap_or(0),
        weekday_hours: number("weekday hours", true)?.unwrap_or(0),
        saturday_hours: number("saturday hours", false)?,
        sunday_hours: number("sunday hours", false)?,
    })
}

/// Applies `command`; `None` asks the session to end.
pub async fn execute(
    funnel: &mut Funnel,
    command: Command,
) -> Option<String> {
    let update = match command {
        Command::Quit => return None,
        Command::Help => return Some(HELP.to_string()),
        Command::Show => return Some(render_current(funnel)),
        Command::Log(level) => {
            return Some(match logging::set_log_level(&level) {
                Ok(()) => format!("log level: {level}\n"),
                Err(e) => format!("{e:#}\n"),
            });
        }
        Command::Start => funnel.start_audit(),
        Command::SetAudit(field, value) => funnel.set_audit_field(field, &value),
        Command::Schedule(schedule) => funnel.set_schedule(schedule),
        Command::Next if funnel.is_qualification_open() => funnel.qualification_next().await,
        Command::Next => funnel.audit_next(),
        Command::Back if funnel.is_qualification_open() => funnel.qualification_back(),
        Command::Back => funnel.audit_back(),
        Command::Unlock => funnel.open_gate().await,
        Command::Contact(field, value) => funnel.set_gate_field(field, &value),
        Command::Specialist => funnel.open_qualification().await,
        Command::Answer(field, value) => funnel.set_qualification_field(field, &value),
        Command::Submit if funnel.is_qualification_open() => funnel.submit_qualification().await,
        Command::Submit => funnel.submit_gate().await,
        Command::Escape => funnel.escape(),
        Command::Enter => funnel.enter().await,
    };

    if update == Update::Ignored {
        debug!("command ignored in current state");
    }
    Some(render_update(funnel, &update))
}

/// Renders whatever is on top: an open modal, otherwise the view.
pub fn render_current(funnel: &Funnel) -> String {
    if funnel.is_qualification_open() {
        let wizard = funnel.qualification();
        return render_qualification(&wizard.snapshot(), wizard.input());
    }
    if funnel.gate().is_open() {
        return render_gate(funnel.gate());
    }
    let change = margin_core::models::ViewChange {
        view: funnel.view(),
        scroll_to_top: false,
        indicator: None,
    };
    render_view(funnel, &change)
}

/// Runs the funnel until `quit`, or until input ends and no result is
/// still pending. Input is not read while the await view is showing.
pub async fn run_session<R, W>(
    mut funnel: Funnel,
    mut events: mpsc::UnboundedReceiver<FunnelEvent>,
    input: R,
    mut output: W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut input_open = true;

    write(&mut output, &render_current(&funnel)).await?;

    loop {
        if !input_open && !funnel.is_awaiting() {
            break;
        }

        tokio::select! {
            line = lines.next_line(), if input_open && !funnel.is_awaiting() => {
                let Some(line) = line? else {
                    input_open = false;
                    continue;
                };

                let text = match parse_command(&line) {
                    Ok(command) => match execute(&mut funnel, command).await {
                        Some(text) => text,
                        None => break,
                    },
                    Err(e) => {
                        warn!(line = %line, "bad command");
                        format!("{e}\n")
                    }
                };
                write(&mut output, &text).await?;
            }
            Some(event) = events.recv() => {
                let update = funnel.handle(event);
                write(&mut output, &render_update(&funnel, &update)).await?;
            }
            else => break,
        }
    }

    output.flush().await?;
    Ok(())
}

async fn write<W: AsyncWrite + Unpin>(
    output: &mut W,
    text: &str,
) -> std::io::Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    output.write_all(text.as_bytes()).await?;
    output.flush().await
}
