// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `medrent login|logout|whoami|register|passwd|profile`.

use clap::Args;
use medrent_auth::{PasswordChange, ProfileUpdate, RegistrationRequest};
use medrent_core::{MedrentError, Role};
use secrecy::ExposeSecret;

use crate::app::App;
use crate::output::Output;
use crate::prompt;

#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Email address of the new account.
    pub email: String,
    #[arg(long, default_value_t = Role::Client)]
    pub role: Role,
    #[arg(long, default_value = "")]
    pub first_name: String,
    #[arg(long, default_value = "")]
    pub last_name: String,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    /// Create the account for someone else (admins only). The current
    /// session is kept.
    #[arg(long)]
    pub provision: bool,
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
}

impl ProfileArgs {
    fn to_update(&self) -> ProfileUpdate {
        ProfileUpdate {
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            phone_number: self.phone.clone(),
            address: self.address.clone(),
        }
    }
}

pub async fn login(app: &App, email: &str, out: &Output) -> Result<(), MedrentError> {
    let password = prompt::password("Password: ")?;
    let user = app.auth.login(email, &password).await?;
    if out.is_json() {
        out.user(&user);
    } else {
        out.done(&format!("logged in as {} ({})", user.email, user.role));
    }
    Ok(())
}

pub async fn logout(app: &App, out: &Output) -> Result<(), MedrentError> {
    if !app.auth.is_authenticated() {
        out.done("not logged in");
        return Ok(());
    }
    app.auth.logout().await?;
    out.done("logged out");
    Ok(())
}

pub fn whoami(app: &App, out: &Output) -> Result<(), MedrentError> {
    let user = app.require_user()?;
    out.user(&user);
    Ok(())
}

pub async fn register(app: &App, args: &RegisterArgs, out: &Output) -> Result<(), MedrentError> {
    let (password, confirm) = prompt::new_password("Password for the new account: ")?;
    let mut request = RegistrationRequest::new(
        args.email.clone(),
        password.expose_secret(),
        confirm.expose_secret(),
        args.role,
    )
    .with_name(args.first_name.clone(), args.last_name.clone());
    request.phone_number = args.phone.clone();
    request.address = args.address.clone();

    let user = if args.provision {
        app.auth.provision_user(&request).await?
    } else {
        app.auth.register(&request).await?
    };
    if out.is_json() {
        out.user(&user);
    } else if args.provision {
        out.done(&format!("created {} ({})", user.email, user.role));
    } else {
        out.done(&format!("registered and logged in as {}", user.email));
    }
    Ok(())
}

pub async fn passwd(app: &App, out: &Output) -> Result<(), MedrentError> {
    app.require_user()?;
    let old = prompt::password("Current password: ")?;
    let (new, confirm) = prompt::new_password("New password: ")?;
    let change = PasswordChange::new(
        old.expose_secret(),
        new.expose_secret(),
        confirm.expose_secret(),
    );
    app.auth.change_password(&change).await?;
    out.done("password changed");
    Ok(())
}

/// Shows the profile, or updates it when any field is given.
pub async fn profile(app: &App, args: &ProfileArgs, out: &Output) -> Result<(), MedrentError> {
    let update = args.to_update();
    let user = if update.is_empty() {
        app.require_user()?
    } else {
        app.auth.update_profile(&update).await?
    };
    out.user(&user);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_args_map_to_update() {
        let args = ProfileArgs {
            email: None,
            first_name: Some("Ada".into()),
            last_name: None,
            phone: Some("555-0101".into()),
            address: None,
        };
        let update = args.to_update();
        assert_eq!(update.first_name.as_deref(), Some("Ada"));
        assert_eq!(update.phone_number.as_deref(), Some("555-0101"));
        assert!(!update.is_empty());
    }
}
