//! Shell command parsing

use anyhow::{anyhow, bail, Result};

pub const HELP: &str = "\
Commands:
  signup <email> <password> [name]   create an account and sign in
  signin <email> <password>          sign in
  signout                            sign out
  whoami                             show the signed-in user
  list                               reload and show your tasks
  add <title> [| description]        create a task
  edit <id> <title>                  rename a task
  done <id>                          mark a task complete
  rm <id>                            delete a task
  clear                              dismiss the current error
  help                               show this help
  quit                               leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SignUp {
        email: String,
        password: String,
        name: Option<String>,
    },
    SignIn {
        email: String,
        password: String,
    },
    SignOut,
    WhoAmI,
    List,
    Add {
        title: String,
        description: Option<String>,
    },
    Edit {
        id: String,
        title: String,
    },
    Done {
        id: String,
    },
    Remove {
        id: String,
    },
    Clear,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line; `Ok(None)` for a blank line
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        let Some((verb, rest)) = split_word(line) else {
            return Ok(None);
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "signup" => {
                let (email, rest) = split_word(rest).ok_or_else(|| usage("signup"))?;
                let (password, name) = split_word(rest).ok_or_else(|| usage("signup"))?;
                Self::SignUp {
                    email: email.to_string(),
                    password: password.to_string(),
                    name: non_empty(name),
                }
            }
            "signin" | "login" => {
                let (email, rest) = split_word(rest).ok_or_else(|| usage("signin"))?;
                let (password, extra) = split_word(rest).ok_or_else(|| usage("signin"))?;
                if !extra.is_empty() {
                    return Err(usage("signin"));
                }
                Self::SignIn {
                    email: email.to_string(),
                    password: password.to_string(),
                }
            }
            "signout" | "logout" => Self::SignOut,
            "whoami" => Self::WhoAmI,
            "list" | "ls" => Self::List,
            "add" => {
                let (title, description) = match rest.split_once('|') {
                    Some((title, description)) => (title, non_empty(description)),
                    None => (rest, None),
                };
                let title = title.trim();
                if title.is_empty() {
                    return Err(usage("add"));
                }
                Self::Add {
                    title: title.to_string(),
                    description,
                }
            }
            "edit" => {
                let (id, title) = split_word(rest).ok_or_else(|| usage("edit"))?;
                if title.is_empty() {
                    return Err(usage("edit"));
                }
                Self::Edit {
                    id: id.to_string(),
                    title: title.to_string(),
                }
            }
            "done" => Self::Done {
                id: single_id(rest, "done")?,
            },
            "rm" | "delete" => Self::Remove {
                id: single_id(rest, "rm")?,
            },
            "clear" => Self::Clear,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => bail!("Unknown command '{}'. Type 'help' for a list.", other),
        };

        Ok(Some(command))
    }
}

/// First whitespace-delimited word and the trimmed remainder
fn split_word(input: &str) -> Option<(&str, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => Some((word, rest.trim())),
        None => Some((input, "")),
    }
}

fn single_id(rest: &str, verb: &str) -> Result<String> {
    match split_word(rest) {
        Some((id, "")) => Ok(id.to_string()),
        _ => Err(usage(verb)),
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn usage(verb: &str) -> anyhow::Error {
    let line = HELP
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with(verb))
        .unwrap_or(verb);
    anyhow!("Usage: {}", line)
}
