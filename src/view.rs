// Console view: parses commands, drives the store, renders its state

use crate::config::Config;
use crate::filter::TaskFilter;
use crate::models::{Priority, Task, TaskId};
use crate::store::TaskStore;
use chrono::Local;
use colored::{ColoredString, Colorize};
use eyre::{Context, Result, eyre};
use std::fmt::Write;
use std::io::{BufRead, Write as IoWrite};
use std::str::FromStr;
use tracing::{debug, info, warn};

pub const HELP: &str = "\
Commands:
  add [low|medium|high] <text>      add a task (default: selected priority)
  add -- <text>                     add text that starts with a priority word
  compose <text>                    stage text for submit
  priority <low|medium|high>        select the default priority
  submit                            add the staged text
  toggle <id>                       mark a task done / not done
  delete <id>                       remove a task (alias: rm)
  filter <all|active|completed>     switch the filter tab
  list                              show the filtered tasks
  stats                             show total / completed / pending
  json                              dump the filtered tasks and counts as JSON
  help                              show this help
  quit                              leave (alias: exit)";

/// One line of console input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add { priority: Option<Priority>, text: String },
    Compose(String),
    Priority(Priority),
    Submit,
    Toggle(TaskId),
    Delete(TaskId),
    Filter(TaskFilter),
    List,
    Stats,
    Json,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = eyre::Report;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let command = match verb.to_ascii_lowercase().as_str() {
            "add" => parse_add(rest)?,
            "compose" => Command::Compose(rest.to_string()),
            "priority" => Command::Priority(rest.parse().map_err(|e: String| eyre!(e))?),
            "submit" => Command::Submit,
            "toggle" => Command::Toggle(parse_id(rest)?),
            "delete" | "rm" => Command::Delete(parse_id(rest)?),
            "filter" => Command::Filter(rest.parse().map_err(|e: String| eyre!(e))?),
            "list" | "ls" => Command::List,
            "stats" => Command::Stats,
            "json" => Command::Json,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            "" => return Err(eyre!("Empty command")),
            other => return Err(eyre!("Unknown command: {} (try `help`)", other)),
        };

        Ok(command)
    }
}

fn parse_add(rest: &str) -> Result<Command> {
    if let Some(literal) = rest.strip_prefix("--") {
        return Ok(Command::Add {
            priority: None,
            text: literal.trim().to_string(),
        });
    }

    if let Some(tagged) = rest.strip_prefix('!') {
        let (tag, text) = tagged.split_once(char::is_whitespace).unwrap_or((tagged, ""));
        let priority: Priority = tag.parse().map_err(|e: String| eyre!(e))?;
        return Ok(Command::Add {
            priority: Some(priority),
            text: text.to_string(),
        });
    }

    // Only full priority names count as a leading word; "m&ms" stays text
    if let Some((word, text)) = rest.split_once(char::is_whitespace) {
        let priority = Priority::ALL
            .into_iter()
            .find(|p| word.eq_ignore_ascii_case(p.as_str()));
        if let Some(priority) = priority {
            return Ok(Command::Add {
                priority: Some(priority),
                text: text.trim().to_string(),
            });
        }
    }

    Ok(Command::Add {
        priority: None,
        text: rest.to_string(),
    })
}

fn parse_id(rest: &str) -> Result<TaskId> {
    if rest.is_empty() {
        return Err(eyre!("Missing task id"));
    }
    rest.parse::<TaskId>().with_context(|| format!("Invalid task id: {}", rest))
}

/// What the session loop should do after a command
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Continue(String),
    Quit,
}

/// Renders store state as text; holds presentation settings only
#[derive(Debug, Clone)]
pub struct View {
    color: bool,
    date_format: String,
}

impl View {
    pub fn new(color: bool, date_format: impl Into<String>) -> Self {
        Self {
            color,
            date_format: date_format.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.color, config.date_format.clone())
    }

    /// Apply a command to the store and return what to print
    pub fn execute(&self, store: &mut TaskStore, command: Command) -> Result<Step> {
        debug!(?command, "execute: called");

        let output = match command {
            Command::Add { priority, text } => {
                let priority = priority.unwrap_or_else(|| store.selected_priority());
                let message = match store.add(&text, priority) {
                    Some(id) => format!("Added #{}", id),
                    None => "Nothing to add".to_string(),
                };
                self.after_mutation(store, &message)
            }
            Command::Compose(text) => {
                store.set_compose(text);
                format!("Composing: {}", store.compose())
            }
            Command::Priority(priority) => {
                store.select_priority(priority);
                format!("Priority: {}", self.badge(priority))
            }
            Command::Submit => {
                let message = match store.submit() {
                    Some(id) => format!("Added #{}", id),
                    None => "Nothing to add".to_string(),
                };
                self.after_mutation(store, &message)
            }
            Command::Toggle(id) => {
                let message = if store.toggle_completed(id) {
                    match store.get(id) {
                        Some(task) if task.completed => format!("Completed #{}", id),
                        _ => format!("Reopened #{}", id),
                    }
                } else {
                    format!("No task #{}", id)
                };
                self.after_mutation(store, &message)
            }
            Command::Delete(id) => {
                let message = if store.delete(id) {
                    format!("Deleted #{}", id)
                } else {
                    format!("No task #{}", id)
                };
                self.after_mutation(store, &message)
            }
            Command::Filter(filter) => {
                store.set_filter(filter);
                self.render_tasks(store)
            }
            Command::List => self.render_tasks(store),
            Command::Stats => self.render_stats(store),
            Command::Json => self.render_json(store)?,
            Command::Help => HELP.to_string(),
            Command::Quit => return Ok(Step::Quit),
        };

        Ok(Step::Continue(output))
    }

    fn after_mutation(&self, store: &TaskStore, message: &str) -> String {
        format!("{}\n{}\n{}", message, self.render_tasks(store), self.render_stats(store))
    }

    /// Tab bar followed by the filtered tasks, or the empty state
    pub fn render_tasks(&self, store: &TaskStore) -> String {
        let mut out = self.render_tabs(store.filter());
        out.push('\n');

        let tasks = store.filtered_tasks();
        if tasks.is_empty() {
            out.push_str(&self.paint("  No tasks found", |s| s.italic()));
            out.push('\n');
            out.push_str(&self.paint("  Add a new task to get started", |s| s.dimmed()));
            return out;
        }

        let lines: Vec<String> = tasks.iter().map(|task| self.render_task(task)).collect();
        out.push_str(&lines.join("\n"));
        out
    }

    pub fn render_tabs(&self, active: TaskFilter) -> String {
        TaskFilter::ALL
            .iter()
            .map(|&filter| {
                if filter == active {
                    self.paint(&format!("[{}]", filter.label()), |s| s.bold().underline())
                } else {
                    format!(" {} ", filter.label())
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn render_task(&self, task: &Task) -> String {
        let check = if task.completed { "[x]" } else { "[ ]" };
        let description = if task.completed {
            self.paint(&task.description, |s| s.dimmed().strikethrough())
        } else {
            task.description.clone()
        };

        format!(
            "  {} #{:<3} {}  {}  {}",
            check,
            task.id,
            description,
            self.paint(&self.format_date(task), |s| s.dimmed()),
            self.badge(task.priority)
        )
    }

    pub fn render_stats(&self, store: &TaskStore) -> String {
        let counts = store.counts();
        format!(
            "Total: {}  Completed: {}  Pending: {}",
            self.paint(&counts.total.to_string(), |s| s.bold()),
            self.paint(&counts.completed.to_string(), |s| s.bold()),
            self.paint(&counts.pending.to_string(), |s| s.bold())
        )
    }

    fn render_json(&self, store: &TaskStore) -> Result<String> {
        let snapshot = serde_json::json!({
            "filter": store.filter(),
            "tasks": store.filtered_tasks(),
            "counts": store.counts(),
        });
        serde_json::to_string_pretty(&snapshot).context("Failed to serialize tasks")
    }

    fn badge(&self, priority: Priority) -> String {
        let label = priority.as_str();
        match priority {
            Priority::High => self.paint(label, |s| s.red().bold()),
            Priority::Medium => self.paint(label, |s| s.yellow()),
            Priority::Low => self.paint(label, |s| s.green()),
        }
    }

    fn format_date(&self, task: &Task) -> String {
        let local = task.created_at.with_timezone(&Local);
        let mut out = String::new();
        if write!(out, "{}", local.format(&self.date_format)).is_err() {
            // Unparseable format string
            out = local.to_rfc3339();
        }
        out
    }

    fn paint(&self, text: &str, style: impl Fn(&str) -> ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }
}

/// Drive a fresh store through a stream of console commands
///
/// Blank lines and `#` comments are skipped. Script mode (`interactive` false)
/// echoes each command as `> cmd`; interactive mode prints a `> ` prompt
/// instead. A rejected command prints an error and the session goes on.
/// Returns the store as it was when input ended or `quit` was read.
pub fn run_session(
    config: &Config,
    mut input: impl BufRead,
    out: &mut impl IoWrite,
    interactive: bool,
) -> Result<TaskStore> {
    let mut store = TaskStore::with_defaults(config.default_priority, config.default_filter);
    let view = View::from_config(config);
    info!(priority = %store.selected_priority(), filter = %store.filter(), "Session started");

    if interactive {
        writeln!(out, "{}", view.render_tasks(&store))?;
        writeln!(out, "Type `help` for commands.")?;
    }

    let mut line = String::new();
    let mut line_num = 0;
    loop {
        if interactive {
            write!(out, "> ")?;
            out.flush()?;
        }

        line.clear();
        if input.read_line(&mut line).context("Failed to read input")? == 0 {
            break;
        }
        line_num += 1;

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if !interactive {
            writeln!(out, "> {}", trimmed)?;
        }

        let command: Command = match trimmed.parse() {
            Ok(command) => command,
            Err(e) => {
                warn!(line = line_num, error = %e, "Rejected command");
                writeln!(out, "{} {}", view.paint("error:", |s| s.red().bold()), e)?;
                continue;
            }
        };

        match view.execute(&mut store, command)? {
            Step::Continue(output) => writeln!(out, "{}", output)?,
            Step::Quit => break,
        }
        out.flush()?;
    }

    info!(total = store.total(), "Session ended");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_DATE_FORMAT;

    fn plain_view() -> View {
        View::new(false, DEFAULT_DATE_FORMAT)
    }

    fn run(view: &View, store: &mut TaskStore, line: &str) -> String {
        let command: Command = line.parse().unwrap();
        match view.execute(store, command).unwrap() {
            Step::Continue(output) => output,
            Step::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn test_parse_add() {
        assert_eq!(
            "add Buy milk".parse::<Command>().unwrap(),
            Command::Add {
                priority: None,
                text: "Buy milk".to_string()
            }
        );
        assert_eq!(
            "add !high Ship release".parse::<Command>().unwrap(),
            Command::Add {
                priority: Some(Priority::High),
                text: "Ship release".to_string()
            }
        );
        assert!("add !urgent Fix it".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_add_leading_priority_word() {
        assert_eq!(
            "add high Ship release".parse::<Command>().unwrap(),
            Command::Add {
                priority: Some(Priority::High),
                text: "Ship release".to_string()
            }
        );
        assert_eq!(
            "add LOW   Buy milk".parse::<Command>().unwrap(),
            Command::Add {
                priority: Some(Priority::Low),
                text: "Buy milk".to_string()
            }
        );
        // A lone priority word is the description
        assert_eq!(
            "add high".parse::<Command>().unwrap(),
            Command::Add {
                priority: None,
                text: "high".to_string()
            }
        );
        // Abbreviations are not taken as a priority here
        assert_eq!(
            "add m and ms".parse::<Command>().unwrap(),
            Command::Add {
                priority: None,
                text: "m and ms".to_string()
            }
        );
        assert_eq!(
            "add -- low battery warning".parse::<Command>().unwrap(),
            Command::Add {
                priority: None,
                text: "low battery warning".to_string()
            }
        );
    }

    #[test]
    fn test_add_with_priority_word_sets_priority() {
        let view = plain_view();
        let mut store = TaskStore::new();

        run(&view, &mut store, "add high Ship release");
        let task = &store.tasks()[0];
        assert_eq!(task.description, "Ship release");
        assert_eq!(task.priority, Priority::High);
    }

    #[test]
    fn test_parse_ids_and_filters() {
        assert_eq!("toggle 3".parse::<Command>().unwrap(), Command::Toggle(TaskId(3)));
        assert_eq!("rm #4".parse::<Command>().unwrap(), Command::Delete(TaskId(4)));
        assert_eq!(
            "filter completed".parse::<Command>().unwrap(),
            Command::Filter(TaskFilter::Completed)
        );
        assert_eq!("EXIT".parse::<Command>().unwrap(), Command::Quit);

        assert!("toggle".parse::<Command>().is_err());
        assert!("delete abc".parse::<Command>().is_err());
        assert!("filter archived".parse::<Command>().is_err());
        assert!("frobnicate".parse::<Command>().is_err());
        assert!("".parse::<Command>().is_err());
    }

    #[test]
    fn test_add_renders_list_and_stats() {
        let view = plain_view();
        let mut store = TaskStore::new();

        let output = run(&view, &mut store, "add !low Buy milk");
        assert!(output.starts_with("Added #1"));
        assert!(output.contains("[ ] #1   Buy milk"));
        assert!(output.contains("low"));
        assert!(output.contains("Total: 1  Completed: 0  Pending: 1"));
    }

    #[test]
    fn test_add_uses_selected_priority() {
        let view = plain_view();
        let mut store = TaskStore::new();

        run(&view, &mut store, "priority high");
        run(&view, &mut store, "add Ship release");
        assert_eq!(store.tasks()[0].priority, Priority::High);
    }

    #[test]
    fn test_add_blank_reports_nothing() {
        let view = plain_view();
        let mut store = TaskStore::new();

        let output = run(&view, &mut store, "add    ");
        assert!(output.starts_with("Nothing to add"));
        assert_eq!(store.total(), 0);
    }

    #[test]
    fn test_compose_and_submit() {
        let view = plain_view();
        let mut store = TaskStore::new();

        run(&view, &mut store, "compose Water plants");
        assert_eq!(store.compose(), "Water plants");

        let output = run(&view, &mut store, "submit");
        assert!(output.starts_with("Added #1"));
        assert_eq!(store.compose(), "");

        let output = run(&view, &mut store, "submit");
        assert!(output.starts_with("Nothing to add"));
    }

    #[test]
    fn test_toggle_and_delete_messages() {
        let view = plain_view();
        let mut store = TaskStore::new();
        run(&view, &mut store, "add Task");

        assert!(run(&view, &mut store, "toggle 1").starts_with("Completed #1"));
        assert!(run(&view, &mut store, "toggle 1").starts_with("Reopened #1"));
        assert!(run(&view, &mut store, "toggle 9").starts_with("No task #9"));
        assert!(run(&view, &mut store, "delete 9").starts_with("No task #9"));
        assert_eq!(store.total(), 1);

        let output = run(&view, &mut store, "delete 1");
        assert!(output.starts_with("Deleted #1"));
        assert!(output.contains("No tasks found"));
        assert!(output.contains("Total: 0  Completed: 0  Pending: 0"));
    }

    #[test]
    fn test_filter_renders_list_only() {
        let view = plain_view();
        let mut store = TaskStore::new();
        run(&view, &mut store, "add !low Buy milk");
        run(&view, &mut store, "add !high Ship release");
        run(&view, &mut store, "toggle 1");

        let output = run(&view, &mut store, "filter completed");
        assert!(output.starts_with(" All   Active  [Completed]"));
        assert!(output.contains("[x] #1   Buy milk"));
        assert!(!output.contains("Ship release"));
        assert!(!output.contains("Total:"));
        assert_eq!(store.filter(), TaskFilter::Completed);
    }

    #[test]
    fn test_render_tabs_marks_active() {
        let view = plain_view();
        assert_eq!(view.render_tabs(TaskFilter::All), "[All]  Active   Completed ");
    }

    #[test]
    fn test_json_snapshot() {
        let view = plain_view();
        let mut store = TaskStore::new();
        run(&view, &mut store, "add !medium Read book");

        let output = run(&view, &mut store, "json");
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["filter"], "all");
        assert_eq!(value["tasks"][0]["description"], "Read book");
        assert_eq!(value["tasks"][0]["priority"], "medium");
        assert_eq!(value["counts"]["total"], 1);
        assert_eq!(value["counts"]["pending"], 1);
    }

    #[test]
    fn test_quit() {
        let view = plain_view();
        let mut store = TaskStore::new();
        assert_eq!(view.execute(&mut store, Command::Quit).unwrap(), Step::Quit);
    }

    #[test]
    fn test_custom_date_format() {
        let view = View::new(false, "%Y");
        let mut store = TaskStore::new();
        store.add("Task", Priority::Low);

        let year = Local::now().format("%Y").to_string();
        assert!(view.render_task(&store.tasks()[0]).contains(&year));
    }

    fn plain_config() -> Config {
        Config {
            color: false,
            ..Config::default()
        }
    }

    #[test]
    fn test_run_session_script() {
        let script = "\
# weekly chores

add low Buy milk
add high Ship release
frobnicate 3
toggle 1
   # indented comment
stats
quit
add Should not run
";
        let mut out = Vec::new();
        let store = run_session(&plain_config(), script.as_bytes(), &mut out, false).unwrap();
        let output = String::from_utf8(out).unwrap();

        assert!(output.contains("> add low Buy milk"));
        assert!(output.contains("> toggle 1"));
        assert!(!output.contains("weekly chores"));
        assert!(!output.contains("indented comment"));
        assert!(output.contains("error: Unknown command: frobnicate"));
        assert!(output.contains("Total: 2  Completed: 1  Pending: 1"));
        assert!(output.contains("> quit"));
        assert!(!output.contains("Should not run"));

        assert_eq!(store.total(), 2);
        assert_eq!(store.completed_count(), 1);
        assert_eq!(store.tasks()[1].priority, Priority::High);
    }

    #[test]
    fn test_run_session_rejected_command_leaves_store_untouched() {
        let mut out = Vec::new();
        let store = run_session(&plain_config(), "add Keep me\ndelete abc\n".as_bytes(), &mut out, false).unwrap();
        let output = String::from_utf8(out).unwrap();

        assert!(output.contains("error: Invalid task id: abc"));
        assert_eq!(store.total(), 1);
        assert_eq!(store.tasks()[0].description, "Keep me");
    }

    #[test]
    fn test_run_session_interactive_prompts() {
        let mut out = Vec::new();
        let store = run_session(&plain_config(), "add Task\n".as_bytes(), &mut out, true).unwrap();
        let output = String::from_utf8(out).unwrap();

        assert!(output.contains("Type `help` for commands."));
        // One prompt per read, including the one that hits end of input
        assert_eq!(output.matches("> ").count(), 2);
        assert!(!output.contains("> add Task"));
        assert_eq!(store.total(), 1);
    }

    #[test]
    fn test_run_session_applies_config_defaults() {
        let config = Config {
            default_priority: Priority::Low,
            default_filter: TaskFilter::Completed,
            ..plain_config()
        };
        let mut out = Vec::new();
        let store = run_session(&config, "add Task\n".as_bytes(), &mut out, false).unwrap();

        assert_eq!(store.filter(), TaskFilter::Completed);
        assert_eq!(store.tasks()[0].priority, Priority::Low);
    }
}
