use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;

use crate::clock::Clock;
use crate::models::{TaskId, DATE_FORMAT};
use crate::store::{Reminder, SearchResults, TaskError, TaskList, TaskStore};

const MENU: &str = "===== SMART TASK MANAGER =====
1. Add Task
2. View Tasks
3. Mark Task as Completed
4. Delete Task
5. Undo Delete
6. Sort Tasks by Due Date
7. Sort Tasks by Priority
8. Search Tasks
9. Next Reminder
10. Exit";

#[derive(Parser, Debug)]
#[command(name = "smart-tasks", version, about = "Local task list with reminders and undo")]
pub struct Cli {
    /// Directory holding tasks.json, settings.json and the log files.
    #[arg(long, env = "SMART_TASKS_HOME")]
    pub data_dir: Option<PathBuf>,
}

#[cfg(not(test))]
pub fn run() -> anyhow::Result<()> {
    use anyhow::Context;

    use crate::models::Settings;
    use crate::storage::Storage;

    let cli = Cli::parse();
    let root = cli.data_dir.unwrap_or_else(|| PathBuf::from("."));
    let storage = Storage::new(root.clone());
    storage
        .ensure_dirs()
        .with_context(|| format!("cannot create data directory {}", root.display()))?;
    let _logger = crate::logging::init_logging(&root).context("failed to start logging")?;

    let settings = storage.load_settings().unwrap_or_else(|err| {
        log::warn!("settings: using defaults, failed to load: {err}");
        Settings::default()
    });
    let mut store = TaskStore::open(storage, settings);

    let stdin = io::stdin();
    let stdout = io::stdout();
    run_menu(&mut store, stdin.lock(), stdout.lock())?;
    Ok(())
}

/// Reads menu choices from `input` until `Exit` or end of input.
pub fn run_menu<C, R, W>(store: &mut TaskStore<C>, mut input: R, mut out: W) -> io::Result<()>
where
    C: Clock,
    R: BufRead,
    W: Write,
{
    loop {
        writeln!(out, "{MENU}")?;
        let Some(choice) = prompt(&mut input, &mut out, "Enter your choice: ")? else {
            return Ok(());
        };
        match choice.as_str() {
            "1" => {
                let Some(fields) = read_new_task(&mut input, &mut out)? else {
                    return Ok(());
                };
                let [title, description, priority, due_date] = fields;
                match store.add_task(&title, &description, &priority, &due_date) {
                    Ok(_) => writeln!(out, "Task added successfully!\n")?,
                    Err(err) => report(&mut out, &err)?,
                }
            }
            "2" => match store.view_tasks() {
                TaskList::Empty => writeln!(out, "No tasks available.\n")?,
                TaskList::Tasks(tasks) => {
                    for task in tasks {
                        writeln!(out, "{task}")?;
                    }
                    writeln!(out)?;
                }
            },
            "3" => {
                let Some(id) = read_task_id(&mut input, &mut out, "Enter task ID to mark complete: ")?
                else {
                    return Ok(());
                };
                if let Some(id) = id {
                    match store.mark_complete(id) {
                        Ok(()) => writeln!(out, "Task marked as completed!\n")?,
                        Err(err) => report(&mut out, &err)?,
                    }
                }
            }
            "4" => {
                let Some(id) = read_task_id(&mut input, &mut out, "Enter task ID to delete: ")?
                else {
                    return Ok(());
                };
                if let Some(id) = id {
                    match store.delete(id) {
                        Ok(_) => writeln!(out, "Task deleted successfully!\n")?,
                        Err(err) => report(&mut out, &err)?,
                    }
                }
            }
            "5" => match store.undo_delete() {
                Ok(task) => writeln!(out, "Restored: {task}\n")?,
                Err(err) => report(&mut out, &err)?,
            },
            "6" => {
                store.sort_by_due_date();
                save_sorted(store, &mut out)?;
                writeln!(out, "Tasks sorted by due date.\n")?;
            }
            "7" => {
                store.sort_by_priority();
                save_sorted(store, &mut out)?;
                writeln!(out, "Tasks sorted by priority.\n")?;
            }
            "8" => {
                let Some(keyword) = prompt(&mut input, &mut out, "Enter keyword: ")? else {
                    return Ok(());
                };
                match store.search(&keyword) {
                    SearchResults::NoResults => writeln!(out, "No matching tasks found.\n")?,
                    SearchResults::Matches(tasks) => {
                        for task in tasks {
                            writeln!(out, "{task}")?;
                        }
                        writeln!(out)?;
                    }
                }
            }
            "9" => match store.next_reminder() {
                Reminder::NoReminders => writeln!(out, "No upcoming reminders.\n")?,
                Reminder::Due(task) => writeln!(
                    out,
                    "Reminder: '{}' is due on {}\n",
                    task.title,
                    task.due_date.format(DATE_FORMAT)
                )?,
            },
            "10" => {
                writeln!(out, "Exiting Task Manager. Goodbye!")?;
                return Ok(());
            }
            _ => writeln!(out, "Invalid choice. Try again!\n")?,
        }
    }
}

fn save_sorted<C: Clock, W: Write>(store: &TaskStore<C>, out: &mut W) -> io::Result<()> {
    if !store.settings().autosave_sorted_order {
        return Ok(());
    }
    if let Err(err) = store.flush() {
        report(out, &err)?;
    }
    Ok(())
}

fn report<W: Write>(out: &mut W, err: &TaskError) -> io::Result<()> {
    if let TaskError::Storage(inner) = err {
        log::error!("store: write failed: {inner}");
    }
    let message = match err {
        TaskError::InvalidDateFormat(_) => "Invalid date format! Use YYYY-MM-DD.".to_string(),
        TaskError::NotFound(_) => "Task not found!".to_string(),
        TaskError::NothingToUndo => "Nothing to undo.".to_string(),
        TaskError::IdsExhausted => "No task ids left.".to_string(),
        TaskError::Storage(inner) => format!("Failed to save tasks: {inner}"),
    };
    writeln!(out, "{message}\n")
}

/// `None` at end of input.
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    message: &str,
) -> io::Result<Option<String>> {
    write!(out, "{message}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn read_new_task<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
) -> io::Result<Option<[String; 4]>> {
    let questions = [
        "Enter task title: ",
        "Enter task description: ",
        "Enter priority (High/Medium/Low): ",
        "Enter due date (YYYY-MM-DD): ",
    ];
    let mut answers: [String; 4] = Default::default();
    for (answer, question) in answers.iter_mut().zip(questions) {
        match prompt(input, out, question)? {
            Some(value) => *answer = value,
            None => return Ok(None),
        }
    }
    Ok(Some(answers))
}

/// Outer `None` at end of input, inner `None` when the id is not a number.
fn read_task_id<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    message: &str,
) -> io::Result<Option<Option<TaskId>>> {
    let Some(raw) = prompt(input, out, message)? else {
        return Ok(None);
    };
    match raw.trim().parse::<TaskId>() {
        Ok(id) => Ok(Some(Some(id))),
        Err(_) => {
            writeln!(out, "Invalid input! Enter a number.\n")?;
            Ok(Some(None))
        }
    }
}
