//! Picker and permission prompt answered on the console.

use std::io::{self, Write};
use std::path::PathBuf;

use async_trait::async_trait;
use colored::Colorize;

use scribe_core::Result;
use scribe_core::file::{AccessMode, FilePicker, FileReference};
use scribe_infrastructure::{LocalFileHost, PermissionPrompt};

/// Reads one trimmed line from stdin. `None` on EOF or a read error.
async fn ask(question: String) -> Option<String> {
    tokio::task::spawn_blocking(move || {
        print!("{}", question);
        io::stdout().flush().ok()?;
        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    })
    .await
    .ok()
    .flatten()
}

/// Asks before granting access to a file.
pub struct ConsolePrompt;

#[async_trait]
impl PermissionPrompt for ConsolePrompt {
    async fn confirm(&self, reference: &FileReference, mode: AccessMode) -> bool {
        let question = format!(
            "{} ",
            format!("Allow {} access to {}? [y/N]", mode, reference.display_name()).bright_yellow()
        );
        matches!(
            ask(question).await.as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("y") | Some("yes")
        )
    }
}

/// Asks for a path; an empty answer cancels.
pub struct ConsolePicker {
    host: LocalFileHost,
}

impl ConsolePicker {
    pub fn new(host: LocalFileHost) -> Self {
        Self { host }
    }
}

#[async_trait]
impl FilePicker for ConsolePicker {
    async fn pick(&self) -> Result<Option<FileReference>> {
        let question = format!("{} ", "File to open (empty to cancel):".bright_yellow());
        match ask(question).await {
            Some(answer) if !answer.is_empty() => {
                let reference = self.host.reference_for(&PathBuf::from(answer)).await?;
                Ok(Some(reference))
            }
            _ => Ok(None),
        }
    }
}
