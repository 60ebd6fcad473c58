use folio_core::auth::{
    OAuthProvider, SignUpOutcome, CONFIRMATION_REQUIRED_MESSAGE, SIGNED_IN_MESSAGE,
};

use crate::auth::{clear_stored_session, load_stored_session, AuthSession};
use crate::cli::{AuthCommands, OAuthProviderArg};
use crate::commands::common::ProfileContext;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

impl From<OAuthProviderArg> for OAuthProvider {
    fn from(provider: OAuthProviderArg) -> Self {
        match provider {
            OAuthProviderArg::Google => Self::Google,
            OAuthProviderArg::Github => Self::Github,
        }
    }
}

pub async fn run_auth(command: AuthCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        AuthCommands::Signup { email, password } => {
            let context = ProfileContext::load(global_profile)?;
            match context.auth_client()?.sign_up(&email, &password).await? {
                SignUpOutcome::SignedIn(session) => print_signed_in(&context.name, &session),
                SignUpOutcome::ConfirmationRequired => println!("{CONFIRMATION_REQUIRED_MESSAGE}"),
            }
            Ok(())
        }
        AuthCommands::Login { email, password } => {
            let context = ProfileContext::load(global_profile)?;
            let session = context.auth_client()?.sign_in(&email, &password).await?;
            print_signed_in(&context.name, &session);
            Ok(())
        }
        AuthCommands::OauthUrl {
            provider,
            redirect_to,
        } => {
            let context = ProfileContext::load(global_profile)?;
            let url = context
                .auth_client()?
                .oauth_authorize_url(provider.into(), &redirect_to)?;
            println!("{url}");
            Ok(())
        }
        AuthCommands::OauthComplete { redirect_url } => {
            let context = ProfileContext::load(global_profile)?;
            let session = context.auth_client()?.complete_oauth(&redirect_url).await?;
            print_signed_in(&context.name, &session);
            Ok(())
        }
        AuthCommands::Status => {
            let config = CliProfilesConfig::load()?;
            let profile_name = config.resolve_profile_name(global_profile);
            let session = match ProfileContext::load(global_profile) {
                Ok(context) => context.auth_client()?.restore_session().await?,
                Err(CliError::Config(_)) => load_stored_session(&profile_name)?,
                Err(error) => return Err(error),
            };

            if let Some(session) = session {
                let email_label = session.user.email.as_deref().unwrap_or("(no email)");
                println!(
                    "Profile '{}' is signed in as {} (expires_at={})",
                    profile_name, email_label, session.expires_at
                );
            } else {
                println!("Profile '{profile_name}' is not signed in.");
            }
            Ok(())
        }
        AuthCommands::Logout => {
            let config = CliProfilesConfig::load()?;
            let profile_name = config.resolve_profile_name(global_profile);
            let stored_session = load_stored_session(&profile_name)?;

            match (ProfileContext::load(global_profile), stored_session) {
                (Ok(context), Some(session)) => {
                    context.auth_client()?.sign_out(&session.access_token).await?;
                }
                _ => clear_stored_session(&profile_name)?,
            }

            println!("Signed out profile '{profile_name}'");
            Ok(())
        }
    }
}

fn print_signed_in(profile_name: &str, session: &AuthSession) {
    let email_label = session.user.email.as_deref().unwrap_or("(no email)");
    println!("{SIGNED_IN_MESSAGE}");
    println!("Signed in profile '{profile_name}' as {email_label}");
}
