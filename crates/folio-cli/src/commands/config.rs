use folio_core::config::{SITE_URL_ENV, SUPABASE_ANON_KEY_ENV, SUPABASE_URL_ENV};
use folio_core::util::{is_http_url, normalize_text_option};
use serde::Serialize;

use crate::cli::ConfigCommands;
use crate::config_profiles::{process_env, CliProfile, CliProfilesConfig};
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            supabase_url,
            supabase_anon_key,
            site_url,
            no_activate,
        } => run_config_init(
            global_profile,
            ProfileValues {
                supabase_url,
                supabase_anon_key,
                site_url,
            },
            no_activate,
        ),
        ConfigCommands::Show { json } => run_config_show(global_profile, json),
    }
}

/// Values given on the command line for `config init`
#[derive(Debug, Default, Clone)]
pub struct ProfileValues {
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub site_url: Option<String>,
}

pub fn run_config_init(
    profile_name: Option<&str>,
    values: ProfileValues,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load()?;
    let profile_name = config.resolve_profile_name(profile_name);
    let existing = config.profile(&profile_name).cloned().unwrap_or_default();

    let merged = merge_profile(&existing, values, process_env);
    validate_profile_urls(&merged)?;

    *config.profile_mut_or_default(&profile_name) = merged;
    if !no_activate {
        config.active_profile = Some(profile_name.clone());
    }

    let path = config.save()?;
    println!("Profile '{}' initialized at {}", profile_name, path.display());

    let missing = missing_fields(config.profile(&profile_name).unwrap_or(&CliProfile::default()));
    if missing.is_empty() {
        println!(
            "Profile '{profile_name}' is ready. Run `folio auth login --email <email> --password <password>`."
        );
    } else {
        println!("Profile '{}' is missing: {}", profile_name, missing.join(", "));
    }
    Ok(())
}

/// Explicit values win, then the environment, then what the profile
/// already had.
pub fn merge_profile<F>(existing: &CliProfile, values: ProfileValues, env: F) -> CliProfile
where
    F: Fn(&str) -> Option<String>,
{
    CliProfile {
        supabase_url: normalize_text_option(values.supabase_url)
            .or_else(|| normalize_text_option(env(SUPABASE_URL_ENV)))
            .or_else(|| existing.supabase_url()),
        supabase_anon_key: normalize_text_option(values.supabase_anon_key)
            .or_else(|| normalize_text_option(env(SUPABASE_ANON_KEY_ENV)))
            .or_else(|| existing.supabase_anon_key()),
        site_url: normalize_text_option(values.site_url)
            .or_else(|| normalize_text_option(env(SITE_URL_ENV)))
            .or_else(|| existing.site_url()),
    }
}

fn validate_profile_urls(profile: &CliProfile) -> Result<(), CliError> {
    for (label, value) in [
        ("supabase_url", profile.supabase_url()),
        ("site_url", profile.site_url()),
    ] {
        if let Some(url) = value {
            if !is_http_url(&url) {
                return Err(CliError::Config(format!(
                    "{label} must include http:// or https://"
                )));
            }
        }
    }
    Ok(())
}

pub fn missing_fields(profile: &CliProfile) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if profile.supabase_url().is_none() {
        missing.push("supabase_url");
    }
    if profile.supabase_anon_key().is_none() {
        missing.push("supabase_anon_key");
    }
    if profile.site_url().is_none() {
        missing.push("site_url");
    }
    missing
}

#[derive(Debug, Serialize)]
struct ProfileView<'a> {
    profile: &'a str,
    active: bool,
    supabase_url: Option<String>,
    supabase_anon_key: Option<&'static str>,
    site_url: Option<String>,
    missing: Vec<&'static str>,
}

fn run_config_show(global_profile: Option<&str>, json: bool) -> Result<(), CliError> {
    let config = CliProfilesConfig::load()?;
    let profile_name = config.resolve_profile_name(global_profile);
    let profile = config.profile(&profile_name).cloned().unwrap_or_default();

    let view = ProfileView {
        profile: &profile_name,
        active: config.active_profile.as_deref() == Some(profile_name.as_str()),
        supabase_url: profile.supabase_url(),
        supabase_anon_key: profile.supabase_anon_key().map(|_| "[REDACTED]"),
        site_url: profile.site_url(),
        missing: missing_fields(&profile),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    let unset = "(not set)";
    println!(
        "Profile:           {}{}",
        view.profile,
        if view.active { " (active)" } else { "" }
    );
    println!("Supabase URL:      {}", view.supabase_url.as_deref().unwrap_or(unset));
    println!("Supabase anon key: {}", view.supabase_anon_key.unwrap_or(unset));
    println!("Site URL:          {}", view.site_url.as_deref().unwrap_or(unset));
    Ok(())
}
