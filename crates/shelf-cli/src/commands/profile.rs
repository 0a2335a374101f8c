//! Profile command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

use shelf_core::{FetchState, ProfileUpdate};

use crate::output::Output;
use crate::Profile;

/// Show the profile document
pub fn show(profile: &Profile, output: &Output) -> Result<()> {
    profile.load_profile();

    let state = profile.subscribe_profile().borrow().clone();
    match state {
        FetchState::Success(document) => output.print_profile(&document),
        FetchState::Empty => output.message("No profile yet."),
        FetchState::Error(message) => bail!("Could not load profile: {}", message),
        FetchState::Initial | FetchState::Loading => unreachable!(),
    }

    Ok(())
}

/// Update the profile document, optionally uploading a new picture
pub fn update(
    profile: &Profile,
    first_name: String,
    last_name: String,
    second_last_name: String,
    birth_date: Option<String>,
    image: Option<PathBuf>,
    output: &Output,
) -> Result<()> {
    let birth_date = birth_date
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .with_context(|| format!("Invalid birth date {:?} (expected YYYY-MM-DD)", raw))
        })
        .transpose()?;

    if let Some(path) = image {
        let bytes = std::fs::read(&path)
            .with_context(|| format!("Failed to read image {:?}", path))?;
        profile.select_image(bytes);
    }

    let update = ProfileUpdate {
        first_name,
        last_name,
        second_last_name,
        birth_date,
    };

    let update_state = profile.subscribe_update();
    if !profile.update_profile(&update) {
        let message = update_state
            .borrow()
            .error_message()
            .unwrap_or("could not update profile")
            .to_string();
        bail!("{}", message);
    }

    output.success("Profile updated");
    show(profile, output)
}
