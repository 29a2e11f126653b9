//! Login, logout and whoami.

use beachstall_core::Email;
use secrecy::SecretString;

use super::{App, CommandResult};

/// Log in and report the loaded cart.
#[allow(clippy::print_stdout)]
pub async fn login(app: &mut App, email: &str, password: String) -> CommandResult {
    let email = Email::parse(email)?;

    let name = app
        .login(&email, SecretString::from(password))
        .await?
        .user()
        .map(|user| user.name.clone())
        .unwrap_or_default();

    println!("Logged in as {name}");
    match app.cart().item_count() {
        0 => {}
        count => println!("{count} item(s) waiting in your cart"),
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
pub fn logout(app: &mut App) -> CommandResult {
    app.logout()?;
    println!("Logged out");
    Ok(())
}

#[allow(clippy::print_stdout)]
pub fn whoami(app: &App) {
    match app.session().user() {
        Some(user) => {
            println!("{} ({})", user.name, user.role);
            if let Some(email) = &user.email {
                println!("{email}");
            }
        }
        None => println!("Not logged in"),
    }
}
