//! # Account Commands
//!
//! `login` and `register` go through [`Session`](pageturner_sync::Session),
//! which stores the credential and prints the landing route via the
//! terminal navigator.

use clap::Args;

use pageturner_sync::HomeView;

use super::print_json;
use crate::error::CliResult;
use crate::state::AppState;

#[derive(Debug, Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
}

pub async fn login(state: &AppState, args: LoginArgs) -> CliResult<()> {
    state.session.login(&args.email, &args.password).await?;
    let role = if state.session.is_admin() { "admin" } else { "customer" };
    println!("Signed in as {} ({role})", args.email);
    Ok(())
}

pub async fn register(state: &AppState, args: RegisterArgs) -> CliResult<()> {
    state
        .session
        .register(&args.name, &args.email, &args.password)
        .await?;
    println!("Welcome, {}", args.name);
    Ok(())
}

pub async fn logout(state: &AppState) -> CliResult<()> {
    state.session.logout().await;
    println!("Signed out");
    Ok(())
}

pub async fn whoami(state: &AppState, json: bool) -> CliResult<()> {
    let profile = state.session.client().me().await?;
    if json {
        print_json(&profile);
        return Ok(());
    }

    let HomeView { is_admin, .. } = state.session.home_view();
    println!(
        "{} <{}>{}",
        profile.name.as_deref().unwrap_or("(no name)"),
        profile.email.as_deref().unwrap_or("?"),
        if is_admin { "  admin" } else { "" }
    );
    Ok(())
}
