//! The interactive shell: command parsing, line editing and rendering.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::PathBuf;

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use crate::console::ConsolePicker;
use scribe_application::Workbench;
use scribe_core::ScribeError;
use scribe_core::session::{SaveOutcome, SessionState, SessionView, SkipReason, Status};
use scribe_infrastructure::LocalFileHost;

const COMMANDS: &[(&str, &str)] = &[
    ("open", "open [path]      open a file read-only (asks for a path if omitted)"),
    ("recent", "recent           list recently opened files"),
    ("reopen", "reopen <n>       open the n-th recent file"),
    ("forget", "forget           clear the recent-files list"),
    ("edit", "edit             request write access to the open file"),
    ("show", "show             print the editor text"),
    ("set", "set <text>       replace the editor text"),
    ("append", "append <text>    append a line to the editor text"),
    ("save", "save             save now"),
    ("status", "status           show the session status"),
    ("help", "help             show this help"),
    ("quit", "quit             save pending edits and exit"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(Option<PathBuf>),
    Recent,
    Reopen(usize),
    Forget,
    Edit,
    Show,
    Set(String),
    Append(String),
    Save,
    Status,
    Help,
    Quit,
}

impl Command {
    /// Parses one input line. Numbers given to `reopen` are 1-based.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim_start()),
            None => (line, ""),
        };

        let command = match word {
            "open" if rest.is_empty() => Command::Open(None),
            "open" => Command::Open(Some(PathBuf::from(rest))),
            "recent" => Command::Recent,
            "reopen" => match rest.parse::<usize>() {
                Ok(n) if n >= 1 => Command::Reopen(n - 1),
                _ => return Err("usage: reopen <n> (see 'recent')".to_string()),
            },
            "forget" => Command::Forget,
            "edit" | "unlock" => Command::Edit,
            "show" => Command::Show,
            "set" => Command::Set(rest.to_string()),
            "append" => Command::Append(format!("{}\n", rest)),
            "save" => Command::Save,
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(format!("Unknown command '{}'. Type 'help'.", other)),
        };
        Ok(command)
    }
}

/// rustyline helper completing and hinting command names.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|(name, _)| name.to_string()).collect(),
        }
    }

    fn is_command_word(line: &str) -> bool {
        !line.is_empty() && !line.contains(' ')
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !Self::is_command_word(line) {
            return Ok((0, vec![]));
        }

        let candidates = self
            .commands
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.clone(),
                replacement: format!("{} ", cmd),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let word = line.split_whitespace().next().unwrap_or("");
        if self.commands.iter().any(|cmd| cmd == word) {
            Owned(format!("{}{}", word.bright_cyan(), &line[word.len()..]))
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if !Self::is_command_word(line) {
            return None;
        }
        self.commands
            .iter()
            .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Validator for CliHelper {}

pub struct Shell {
    workbench: Workbench,
    host: LocalFileHost,
    picker: ConsolePicker,
}

impl Shell {
    pub fn new(workbench: Workbench, host: LocalFileHost) -> Self {
        Self {
            workbench,
            picker: ConsolePicker::new(host.clone()),
            host,
        }
    }

    /// Runs the REPL until `quit` or end of input, then flushes pending edits.
    pub async fn run(&self) -> anyhow::Result<()> {
        let mut rl = Editor::new()?;
        rl.set_helper(Some(CliHelper::new()));

        println!("{}", "=== Scribe ===".bright_magenta().bold());
        println!("{}", "Type 'open <path>' to start, 'help' for commands.".bright_black());
        println!();

        loop {
            match rl.readline(&self.prompt().await) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(trimmed);

                    match Command::parse(trimmed) {
                        Ok(Command::Quit) => break,
                        Ok(command) => self.execute(command).await,
                        Err(message) => println!("{}", message.yellow()),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("{}", format!("Error: {:?}", err).red());
                    break;
                }
            }
        }

        match self.workbench.shutdown().await {
            Ok(SaveOutcome::Saved) => println!("{}", "Saved pending edits.".green()),
            Ok(_) => {}
            Err(e) => eprintln!("{}", e.status_text().red()),
        }
        println!("{}", "Goodbye!".bright_green());
        Ok(())
    }

    async fn prompt(&self) -> String {
        let view = self.workbench.view().await;
        let marker = if view.dirty { "*" } else { "" };
        match (&view.name, view.state) {
            (Some(name), SessionState::Editable) => format!("{}{} [edit]> ", name, marker),
            (Some(name), _) => format!("{}{}> ", name, marker),
            (None, _) => "scribe> ".to_string(),
        }
    }

    /// Opens `path` as if typed with `open`.
    pub async fn open_path(&self, path: PathBuf) {
        self.execute(Command::Open(Some(path))).await;
    }

    async fn execute(&self, command: Command) {
        match command {
            Command::Open(Some(path)) => {
                let resolved = self.host.reference_for(&path).await;
                let result = self.workbench.open_resolved(resolved).await;
                self.report_view(result).await;
            }
            Command::Open(None) => match self.workbench.pick_and_open(&self.picker).await {
                Ok(Some(view)) => print_status(&view),
                Ok(None) => {}
                Err(e) => self.report_view(Err(e)).await,
            },
            Command::Recent => self.print_recent().await,
            Command::Reopen(index) => {
                let result = self.workbench.reopen_recent(index).await;
                self.report_view(result).await;
            }
            Command::Forget => {
                self.workbench.clear_recent().await;
                println!("{}", "Recent files cleared.".bright_black());
            }
            Command::Edit => {
                let result = self.workbench.unlock().await;
                self.report_view(result).await;
            }
            Command::Show => print_text(&self.workbench.view().await),
            Command::Set(text) => {
                if let Err(e) = self.workbench.edit(text).await {
                    report_error(&e);
                }
            }
            Command::Append(text) => {
                if let Err(e) = self.workbench.append(&text).await {
                    report_error(&e);
                }
            }
            Command::Save => match self.workbench.save().await {
                Ok(SaveOutcome::Saved) => print_status(&self.workbench.view().await),
                Ok(SaveOutcome::Skipped(reason)) => println!("{}", skip_text(reason).bright_black()),
                Err(e) => report_error(&e),
            },
            Command::Status => {
                let view = self.workbench.view().await;
                print_status(&view);
                println!(
                    "{}",
                    format!(
                        "state: {}  dirty: {}  autosave pending: {}",
                        view.state,
                        view.dirty,
                        self.workbench.autosave_pending()
                    )
                    .bright_black()
                );
            }
            Command::Help => print_help(),
            Command::Quit => {}
        }
    }

    /// Prints the resulting status; failures are already reflected in it.
    async fn report_view(&self, result: scribe_core::Result<SessionView>) {
        match result {
            Ok(view) => print_status(&view),
            Err(e) if matches!(e, ScribeError::NotFound { .. }) => report_error(&e),
            Err(_) => print_status(&self.workbench.view().await),
        }
    }

    async fn print_recent(&self) {
        let list = self.workbench.recent_files().await;
        if list.is_empty() {
            println!("{}", "No recent files.".bright_black());
            return;
        }
        for (i, entry) in list.entries().iter().enumerate() {
            let opened = entry
                .opened_at
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M");
            println!(
                "{:>3}  {}  {}",
                (i + 1).to_string().bright_cyan(),
                entry.reference.display_name().bold(),
                format!("{}  {}", opened, entry.reference.location().display()).bright_black()
            );
        }
    }
}

fn print_status(view: &SessionView) {
    let line = view.status.to_string();
    let colored = match &view.status {
        Status::NoFile => line.bright_black(),
        Status::Opened { editable: false, .. } => line.normal(),
        Status::Opened { editable: true, .. } => line.bright_blue(),
        Status::Saved { .. } => line.green(),
        Status::Error(_) => line.red(),
    };
    println!("{}", colored);
}

fn print_text(view: &SessionView) {
    if view.name.is_none() {
        println!("{}", "No file open.".bright_black());
        return;
    }
    for (i, line) in view.text.lines().enumerate() {
        println!("{} {}", format!("{:>4}", i + 1).bright_black(), line);
    }
}

fn report_error(error: &ScribeError) {
    println!("{}", error.status_text().red());
}

fn skip_text(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::NotEditable => "Nothing to save: file is not editable (try 'edit').",
        SkipReason::Clean => "Nothing to save.",
        SkipReason::InFlight => "A save is already in progress.",
    }
}

fn print_help() {
    for (_, usage) in COMMANDS {
        println!("  {}", usage);
    }
}
