use anyhow::{Context, Result};
use colored::*;
use std::io::{self, Write};
use std::sync::Arc;

use jot_core::client::ApiClient;
use jot_core::errors::ApiError;
use jot_core::notify::{Notice, Notifier};
use jot_core::router::{self, Route};
use jot_core::stores::{NoteStore, UserStore};
use jot_core::types::{CreateUserRequest, NoteRequest};
use jot_session::SessionStore;

use crate::logging::{log_error, log_info};
use crate::output::{self, TerminalNotifier};

/// The interactive screen loop. Each route is a screen; every transition
/// goes through the navigation guard, so protected screens are never
/// entered without the session to back them.
pub struct App {
    session: SessionStore,
    notes: NoteStore,
    users: UserStore,
    notifier: TerminalNotifier,
    route: Route,
    refresh: bool,
}

impl App {
    pub fn new(client: ApiClient, session: SessionStore) -> Self {
        let notes = NoteStore::new(client.clone());
        let users = UserStore::new(client);

        // Forced invalidation tears the screens' data down with the
        // session.
        {
            let notes = notes.clone();
            let users = users.clone();
            session.on_session_cleared(Arc::new(move || {
                notes.reset();
                users.reset();
            }));
        }

        Self {
            session,
            notes,
            users,
            notifier: TerminalNotifier,
            route: Route::Login,
            refresh: true,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        // Land wherever the restored session allows.
        self.navigate(Route::Notes);

        loop {
            // A rejected credential clears the session between commands;
            // fall back to the login screen before prompting again.
            if self.route != Route::Login && !self.session.is_authenticated() {
                self.navigate(Route::Login);
            }

            let keep_going = match self.route {
                Route::Login => self.login_screen().await?,
                Route::Notes => self.notes_screen().await?,
                Route::Users => self.users_screen().await?,
            };
            if !keep_going {
                break;
            }
        }

        println!("bye");
        Ok(())
    }

    fn navigate(&mut self, target: Route) {
        let resolved = router::resolve(target, &self.session.session());
        if resolved != target {
            log_info(&format!(
                "redirected from {} to {}",
                target.name(),
                resolved.name()
            ));
        }
        if resolved != self.route {
            self.refresh = true;
        }
        self.route = resolved;
    }

    async fn login_screen(&mut self) -> Result<bool> {
        if self.refresh {
            self.refresh = false;
            println!();
            println!("{}", "Sign in (or 'quit')".bold());
        }

        let Some(username) = prompt("username")? else {
            return Ok(false);
        };
        if username.eq_ignore_ascii_case("quit") || username.eq_ignore_ascii_case("exit") {
            return Ok(false);
        }
        if username.is_empty() {
            return Ok(true);
        }
        let Some(password) = prompt("password")? else {
            return Ok(false);
        };

        match self.session.login(&username, &password).await {
            Ok(session) => {
                let name = session
                    .identity()
                    .map(|i| i.username.clone())
                    .unwrap_or_default();
                self.notifier
                    .notify(Notice::success(format!("signed in as {name}")));
                self.navigate(Route::Notes);
            }
            Err(err) => {
                log_error(&format!("login failed: {err}"));
                self.notifier.notify(Notice::error(err.to_string()));
            }
        }
        Ok(true)
    }

    async fn notes_screen(&mut self) -> Result<bool> {
        if self.refresh {
            self.refresh = false;
            match self.notes.fetch_all().await {
                Ok(notes) => output::print_notes(&notes),
                Err(err) => {
                    self.report(err, self.notes.error());
                    return Ok(true);
                }
            }
        }

        let Some(input) = read_command("notes")? else {
            return Ok(false);
        };
        let mut parts = input.split_whitespace();
        match parts.next().unwrap_or("") {
            "" => {}
            "list" => self.refresh = true,
            "view" => {
                if let Some(id) = parse_id(parts.next()) {
                    match self.notes.fetch_by_id(id).await {
                        Ok(note) => output::print_note(&note),
                        Err(err) => self.report(err, self.notes.error()),
                    }
                }
            }
            "new" => {
                let Some(request) = prompt_note(None)? else {
                    return Ok(false);
                };
                match self.notes.create(&request).await {
                    Ok(created) => {
                        self.notifier
                            .notify(Notice::success(format!("note #{} created", created.id)));
                        self.refresh = true;
                    }
                    Err(err) => self.report(err, self.notes.error()),
                }
            }
            "edit" => {
                if let Some(id) = parse_id(parts.next()) {
                    let current = self.notes.notes().into_iter().find(|n| n.id == id);
                    let Some(request) = prompt_note(current.as_ref().map(|n| n.title.as_str()))?
                    else {
                        return Ok(false);
                    };
                    match self.notes.update(id, &request).await {
                        Ok(updated) => {
                            self.notifier
                                .notify(Notice::success(format!("note #{} updated", updated.id)));
                            self.refresh = true;
                        }
                        Err(err) => self.report(err, self.notes.error()),
                    }
                }
            }
            "del" => {
                if let Some(id) = parse_id(parts.next()) {
                    match self.notes.remove(id).await {
                        Ok(()) => self
                            .notifier
                            .notify(Notice::success(format!("note #{id} deleted"))),
                        Err(err) => self.report(err, self.notes.error()),
                    }
                }
            }
            "users" => self.navigate(Route::Users),
            "help" => output::print_notes_help(self.session.is_admin()),
            "logout" => {
                self.session.logout();
                self.notifier.notify(Notice::info("signed out"));
                self.navigate(Route::Login);
            }
            "quit" | "exit" => return Ok(false),
            other => println!("unknown command '{other}', try 'help'"),
        }
        Ok(true)
    }

    async fn users_screen(&mut self) -> Result<bool> {
        if self.refresh {
            self.refresh = false;
            match self.users.fetch_all().await {
                Ok(users) => output::print_users(&users),
                Err(err) => {
                    self.report(err, self.users.error());
                    return Ok(true);
                }
            }
        }

        let Some(input) = read_command("users")? else {
            return Ok(false);
        };
        let mut parts = input.split_whitespace();
        match parts.next().unwrap_or("") {
            "" => {}
            "list" => self.refresh = true,
            "add" => {
                let Some(username) = prompt("username")? else {
                    return Ok(false);
                };
                let Some(password) = prompt("password")? else {
                    return Ok(false);
                };
                let Some(roles) = prompt("roles (comma separated, empty for default)")? else {
                    return Ok(false);
                };
                let request = CreateUserRequest {
                    username,
                    password,
                    roles: roles
                        .split(',')
                        .map(str::trim)
                        .filter(|r| !r.is_empty())
                        .map(str::to_string)
                        .collect(),
                };
                match self.users.create(&request).await {
                    Ok(created) => {
                        self.notifier.notify(Notice::success(format!(
                            "user '{}' created",
                            created.username
                        )));
                        self.refresh = true;
                    }
                    Err(err) => self.report(err, self.users.error()),
                }
            }
            "del" => {
                if let Some(id) = parse_id(parts.next()) {
                    match self.users.remove(id).await {
                        Ok(()) => self
                            .notifier
                            .notify(Notice::success(format!("user #{id} deleted"))),
                        Err(err) => self.report(err, self.users.error()),
                    }
                }
            }
            "back" => self.navigate(Route::Notes),
            "help" => output::print_users_help(),
            "logout" => {
                self.session.logout();
                self.notifier.notify(Notice::info("signed out"));
                self.navigate(Route::Login);
            }
            "quit" | "exit" => return Ok(false),
            other => println!("unknown command '{other}', try 'help'"),
        }
        Ok(true)
    }

    /// Surface a failed operation: prefer the message the store captured,
    /// which carries the server's wording when there was one.
    fn report(&self, err: ApiError, captured: Option<String>) {
        log_error(&format!("request failed: {err}"));
        self.notifier
            .notify(Notice::error(captured.unwrap_or_else(|| err.to_string())));
    }
}

/// Prompt for the two note fields; `current_title` is shown as a hint when
/// editing.
fn prompt_note(current_title: Option<&str>) -> Result<Option<NoteRequest>> {
    let label = match current_title {
        Some(title) => format!("title [{title}]"),
        None => "title".to_string(),
    };
    let Some(title) = prompt(&label)? else {
        return Ok(None);
    };
    let Some(content) = prompt("content")? else {
        return Ok(None);
    };
    Ok(Some(NoteRequest { title, content }))
}

fn prompt(label: &str) -> Result<Option<String>> {
    print!("{label}: ");
    io::stdout().flush().context("Failed to flush stdout")?;
    read_trimmed()
}

fn read_command(screen: &str) -> Result<Option<String>> {
    print!("{} ", format!("{screen}>").blue().bold());
    io::stdout().flush().context("Failed to flush stdout")?;
    read_trimmed()
}

/// `None` means stdin hit end-of-file and the loop should wind down.
fn read_trimmed() -> Result<Option<String>> {
    let mut input = String::new();
    let bytes = io::stdin()
        .read_line(&mut input)
        .context("Failed to read input")?;
    if bytes == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

fn parse_id(arg: Option<&str>) -> Option<i64> {
    match arg.and_then(|a| a.parse::<i64>().ok()) {
        Some(id) => Some(id),
        None => {
            println!("expected a numeric id");
            None
        }
    }
}
