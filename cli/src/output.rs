use colored::*;

use jot_core::notify::{Notice, NoticeKind, Notifier};
use jot_core::types::{Note, User};

/// Renders notices to the terminal; the `Notifier` implementation handed
/// to every screen that wants to toast.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notice: Notice) {
        let line = match notice.kind {
            NoticeKind::Success => format!("{} {}", "ok".green().bold(), notice.message),
            NoticeKind::Error => format!("{} {}", "error".red().bold(), notice.message),
            NoticeKind::Warning => format!("{} {}", "warning".yellow().bold(), notice.message),
            NoticeKind::Info => format!("{} {}", "info".cyan(), notice.message),
        };
        println!("{line}");
    }
}

/// Print the notes list as a compact table.
pub fn print_notes(notes: &[Note]) {
    if notes.is_empty() {
        println!("{}", "No notes yet. Use 'new' to create one.".dimmed());
        return;
    }
    println!("{}", format!("{:>5}  {:<32}  {}", "ID", "TITLE", "UPDATED").bold());
    for note in notes {
        println!(
            "{:>5}  {:<32}  {}",
            note.id,
            truncate(&note.title, 32),
            note.updated_at.as_deref().unwrap_or("-").dimmed(),
        );
    }
}

/// Print a single note in full.
pub fn print_note(note: &Note) {
    println!("{} {}", format!("#{}", note.id).dimmed(), note.title.bold());
    if let Some(updated) = note.updated_at.as_deref() {
        println!("{}", format!("updated {updated}").dimmed());
    }
    println!();
    println!("{}", note.content);
}

/// Print the user accounts as a compact table.
pub fn print_users(users: &[User]) {
    if users.is_empty() {
        println!("{}", "No users.".dimmed());
        return;
    }
    println!("{}", format!("{:>5}  {:<20}  {}", "ID", "USERNAME", "ROLES").bold());
    for user in users {
        println!(
            "{:>5}  {:<20}  {}",
            user.id,
            user.username,
            user.roles.join(", ")
        );
    }
}

/// Show the commands available on the notes screen.
pub fn print_notes_help(is_admin: bool) {
    println!("{}", "Commands:".yellow().bold());
    println!("  {:<18} refresh the notes list", "list".green());
    println!("  {:<18} show one note in full", "view <id>".green());
    println!("  {:<18} create a note", "new".green());
    println!("  {:<18} edit a note", "edit <id>".green());
    println!("  {:<18} delete a note", "del <id>".green());
    if is_admin {
        println!("  {:<18} manage user accounts", "users".green());
    }
    println!("  {:<18} sign out", "logout".green());
    println!("  {:<18} leave", "quit".green());
}

/// Show the commands available on the users screen.
pub fn print_users_help() {
    println!("{}", "Commands:".yellow().bold());
    println!("  {:<18} refresh the user list", "list".green());
    println!("  {:<18} create a user account", "add".green());
    println!("  {:<18} delete a user account", "del <id>".green());
    println!("  {:<18} back to the notes screen", "back".green());
    println!("  {:<18} sign out", "logout".green());
    println!("  {:<18} leave", "quit".green());
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
