//! Interactive converter.
//!
//! Reads commands from stdin on a tokio runtime. Exports run as spawned tasks
//! and report back over a channel, so the prompt stays responsive while a
//! large image is being rasterized.
//!
//! ```text
//! stdin lines ──┐
//!               ├──► select! ──► Session (&mut, single owner)
//! job outcomes ─┘                    │
//!       ▲                            │ begin_export()
//!       └──── tokio::spawn(job.run()) ◄┘
//! ```

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use super::{build_runtime, read_input};
use crate::config::AppConfig;
use crate::image::export::ExportEmitter;
use crate::logger::{self, banner};
use crate::session::{Axis, JobOutcome, Session, SessionOptions};
use crate::status::{BannerReporter, StatusKind};
use crate::theme::ThemeStore;
use crate::{debug, log};

/// Line that ends paste mode.
const PASTE_END: &str = ".";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Paste,
    Open(PathBuf),
    Render,
    Width(i64),
    Height(i64),
    Scale(i64),
    Lock,
    Download,
    Clear,
    Theme,
    Status,
    Help,
    Quit,
}

/// Parse a command line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = parts.collect();

    let command = match head.to_ascii_lowercase().as_str() {
        "paste" | "p" => Command::Paste,
        "open" | "o" => match rest.as_slice() {
            [] => return Err("usage: open <path>".to_string()),
            _ => Command::Open(PathBuf::from(rest.join(" "))),
        },
        "render" | "r" => Command::Render,
        "width" | "w" => Command::Width(integer_arg("width", &rest)?),
        "height" | "h" => Command::Height(integer_arg("height", &rest)?),
        "scale" | "s" => Command::Scale(integer_arg("scale", &rest)?),
        "lock" | "l" => Command::Lock,
        "download" | "d" => Command::Download,
        "clear" | "c" => Command::Clear,
        "theme" | "t" => Command::Theme,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => return Err(format!("unknown command `{other}`, type `help`")),
    };
    Ok(Some(command))
}

fn integer_arg(name: &str, rest: &[&str]) -> Result<i64, String> {
    match rest {
        [value] => value
            .parse()
            .map_err(|_| format!("{name}: expected an integer, got `{value}`")),
        _ => Err(format!("usage: {name} <n>")),
    }
}

// ============================================================================
// Event loop
// ============================================================================

/// Run the interactive session until `quit` or end of input.
pub fn run_session(input: Option<&Path>, config: &AppConfig, store: &ThemeStore) -> Result<()> {
    let rt = build_runtime()?;
    rt.block_on(async {
        let (jobs, mut outcomes) = mpsc::channel(16);
        let mut repl = Repl {
            session: Session::new(BannerReporter, SessionOptions::from(&config.export)),
            emitter: ExportEmitter::from_config(&config.export),
            store,
            jobs,
            pending: 0,
            paste: None,
        };
        repl.run(input, &mut outcomes).await
    })
}

struct Repl<'a> {
    session: Session<BannerReporter>,
    emitter: ExportEmitter,
    store: &'a ThemeStore,
    jobs: mpsc::Sender<JobOutcome>,
    pending: usize,
    paste: Option<String>,
}

impl Repl<'_> {
    async fn run(
        &mut self,
        input: Option<&Path>,
        outcomes: &mut mpsc::Receiver<JobOutcome>,
    ) -> Result<()> {
        log!("session"; "writing to {}, type `help` for commands", self.emitter.output_dir().display());
        if let Some(path) = input {
            self.open(path);
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        self.prompt();

        loop {
            tokio::select! {
                Some(outcome) = outcomes.recv() => {
                    self.finish(outcome);
                    self.prompt();
                }
                line = lines.next_line() => {
                    let Some(line) = line.context("Failed to read stdin")? else {
                        break;
                    };
                    if !self.handle_line(&line) {
                        break;
                    }
                    self.prompt();
                }
            }
        }

        while self.pending > 0 {
            match outcomes.recv().await {
                Some(outcome) => self.finish(outcome),
                None => break,
            }
        }
        Ok(())
    }

    /// Returns `false` when the session should end.
    fn handle_line(&mut self, line: &str) -> bool {
        if let Some(buffer) = self.paste.as_mut() {
            if line.trim() == PASTE_END {
                let text = std::mem::take(buffer);
                self.paste = None;
                self.session.load(text).ok();
            } else {
                buffer.push_str(line);
                buffer.push('\n');
            }
            return true;
        }

        match parse_command(line) {
            Ok(Some(Command::Quit)) => return false,
            Ok(Some(command)) => self.execute(command),
            Ok(None) => {}
            Err(message) => banner(StatusKind::Error, &message),
        }
        true
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::Paste => {
                self.paste = Some(String::new());
                println!("Paste SVG markup, end with a line containing only `{PASTE_END}`");
            }
            Command::Open(path) => self.open(&path),
            Command::Render => {
                self.session.render().ok();
            }
            Command::Width(value) => self.edit(Axis::Width, value),
            Command::Height(value) => self.edit(Axis::Height, value),
            Command::Scale(value) => {
                self.session.set_scale(value).ok();
            }
            Command::Lock => {
                self.session.toggle_constraint();
            }
            Command::Download => self.download(),
            Command::Clear => self.session.clear(),
            Command::Theme => match self.store.toggle() {
                Ok(theme) => {
                    logger::set_theme(theme);
                    banner(StatusKind::Info, &format!("Theme set to {theme}"));
                }
                Err(e) => banner(StatusKind::Error, &format!("{e:#}")),
            },
            Command::Status => println!("{}", self.session.summary()),
            Command::Help => self.help(),
            Command::Quit => {}
        }
    }

    fn open(&mut self, path: &Path) {
        match read_input(path) {
            Ok(text) => {
                self.session.load(text).ok();
            }
            Err(e) => banner(StatusKind::Error, &e.to_string()),
        }
    }

    fn edit(&mut self, axis: Axis, value: i64) {
        if let Ok(resized) = self.session.edit_dimension(axis, value) {
            let fields = self.session.fields();
            let suffix = if resized.is_some() { "" } else { " (no SVG loaded)" };
            banner(
                StatusKind::Info,
                &format!("Size {}x{}{suffix}", fields.width, fields.height),
            );
        }
    }

    fn download(&mut self) {
        if !self.session.can_export() {
            banner(StatusKind::Info, "Download is disabled until an SVG is rendered");
            return;
        }
        let Ok(job) = self.session.begin_export() else {
            return;
        };

        self.pending += 1;
        let jobs = self.jobs.clone();
        tokio::spawn(async move {
            let outcome = job.run().await;
            if jobs.send(outcome).await.is_err() {
                debug!("export"; "session closed before the result arrived");
            }
        });
    }

    fn finish(&mut self, outcome: JobOutcome) {
        self.pending = self.pending.saturating_sub(1);
        self.session.finish_export(outcome, &self.emitter).ok();
    }

    fn prompt(&self) {
        let prompt = if self.paste.is_some() { "... " } else { "svgpng> " };
        let mut stdout = std::io::stdout().lock();
        write!(stdout, "{prompt}").ok();
        stdout.flush().ok();
    }

    fn help(&self) {
        let max = self.session.max_scale();
        println!(
            "\
Commands:
  paste          (p)  enter SVG markup, end with `{PASTE_END}`
  open <path>    (o)  load an SVG file
  render         (r)  render the pasted markup
  width <n>      (w)  set width
  height <n>     (h)  set height
  scale <n>      (s)  export multiplier, 1..={max}
  lock           (l)  toggle aspect ratio lock
  download       (d)  export the current SVG
  clear          (c)  drop the current SVG
  theme          (t)  toggle light/dark
  status              show the current state
  help           (?)  show this help
  quit           (q)  leave"
        );
    }
}
