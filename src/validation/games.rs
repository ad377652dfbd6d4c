use crate::error::{AppError, Result};

/// Validates a game name.
///
/// # Arguments
///
/// * `name` - The name to validate.
///
/// # Returns
///
/// A `Result<()>` indicating whether the name is valid.
pub fn validate_game_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AppError::Validation(
            "Game name cannot be empty".to_string(),
        ));
    }

    if name.len() > 100 {
        return Err(AppError::Validation(
            "Game name must be at most 100 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validates a game description.
pub fn validate_description(description: &str) -> Result<()> {
    if description.len() > 500 {
        return Err(AppError::Validation(
            "Description must be at most 500 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validates a game-chosen player identifier.
///
/// # Arguments
///
/// * `player_id` - The player identifier to validate.
///
/// # Returns
///
/// A `Result<()>` indicating whether the identifier is valid.
pub fn validate_player_id(player_id: &str) -> Result<()> {
    if player_id.is_empty() {
        return Err(AppError::Validation(
            "playerId is required".to_string(),
        ));
    }

    if player_id.len() > 128 {
        return Err(AppError::Validation(
            "playerId must be at most 128 characters".to_string(),
        ));
    }

    if !player_id
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err(AppError::Validation(
            "playerId can only contain letters, numbers, underscores, hyphens, and dots".to_string(),
        ));
    }

    Ok(())
}
